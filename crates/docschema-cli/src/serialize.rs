//! # Serialize Subcommand
//!
//! Renders a stored document the way it is sent back to clients.

use std::path::PathBuf;

use clap::Args;
use docschema_core::Map;

use crate::input::{load_schema, read_document};

/// Arguments for the serialize subcommand.
#[derive(Args, Debug)]
pub struct SerializeArgs {
    /// Schema descriptor (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// Document to serialize (JSON, or YAML by extension).
    #[arg(long)]
    pub payload: PathBuf,
}

/// Returns the serialized document.
pub fn run(args: &SerializeArgs) -> anyhow::Result<Map> {
    let schema = load_schema(&args.schema)?;
    let mut doc = read_document(&args.payload)?;
    schema.serialize(&mut doc)?;
    Ok(doc)
}
