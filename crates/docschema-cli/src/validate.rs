//! # Validate Subcommand
//!
//! Runs a payload through prepare and validate, as a document store would
//! on a write:
//!
//! | Flags | Mode |
//! |-------|------|
//! | none | create |
//! | `--original` | update |
//! | `--original --replace` | replace |

use std::path::PathBuf;

use clap::Args;
use docschema_core::{Context, ErrorReport, Map};
use docschema_engine::Mode;

use crate::input::{load_schema, read_document};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema descriptor (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// Incoming payload (JSON, or YAML by extension).
    #[arg(long)]
    pub payload: PathBuf,

    /// Stored document the payload applies to.
    #[arg(long)]
    pub original: Option<PathBuf>,

    /// Replace the original instead of patching it.
    #[arg(long)]
    pub replace: bool,
}

/// Result of a validate run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The resolved document, serialized for output.
    Valid(Map),
    /// Every error found.
    Invalid(ErrorReport),
}

/// Prepare and validate the payload.
///
/// # Errors
///
/// Fails on unreadable inputs, on `--replace` without `--original`, and on
/// serializer errors. Validation errors are an [`Outcome::Invalid`], not an
/// error.
pub fn run(args: &ValidateArgs) -> anyhow::Result<Outcome> {
    let schema = load_schema(&args.schema)?;
    let payload = read_document(&args.payload)?;
    let original = args.original.as_deref().map(read_document).transpose()?;
    let mode = Mode::new(original.as_ref(), args.replace)?;

    let ctx = Context::new();
    let prepared = schema.prepare(&ctx, &payload, mode);
    let validated = schema.validate(&prepared.changes, &prepared.base);
    tracing::info!(
        request_id = %ctx.request_id(),
        valid = validated.is_valid(),
        "payload validated"
    );

    match validated.into_result() {
        Ok(mut doc) => {
            schema.serialize(&mut doc)?;
            Ok(Outcome::Valid(doc))
        }
        Err(errors) => Ok(Outcome::Invalid(errors)),
    }
}
