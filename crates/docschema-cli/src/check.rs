//! # Check Subcommand
//!
//! Compiles a schema descriptor and lists every dotted field path.

use std::path::PathBuf;

use clap::Args;

use crate::input::load_schema;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema descriptor (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,
}

/// Returns the dotted path of every field once the schema compiles.
pub fn run(args: &CheckArgs) -> anyhow::Result<Vec<String>> {
    Ok(load_schema(&args.schema)?.field_paths())
}
