//! # Field Subcommand
//!
//! Resolves a possibly dotted field name and describes the field.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Args;
use docschema_core::Value;
use docschema_engine::Field;
use serde::Serialize;

use crate::input::load_schema;

/// Arguments for the field subcommand.
#[derive(Args, Debug)]
pub struct FieldArgs {
    /// Schema descriptor (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// Field name, dotted for nested fields (`address.city`).
    pub path: String,
}

/// Printable description of a field.
#[derive(Debug, Serialize, PartialEq)]
pub struct FieldSummary {
    pub path: String,
    pub description: String,
    pub required: bool,
    pub read_only: bool,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    pub on_init: bool,
    pub on_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
}

impl FieldSummary {
    fn new(path: &str, field: &Field) -> Self {
        Self {
            path: path.to_string(),
            description: field.description.clone(),
            required: field.required,
            read_only: field.read_only,
            hidden: field.hidden,
            default: field.default.clone(),
            validator: field.validator.as_ref().map(|v| format!("{v:?}")),
            fields: field
                .schema
                .as_deref()
                .map(|schema| schema.fields.keys().cloned().collect())
                .unwrap_or_default(),
            on_init: field.on_init.is_some(),
            on_update: field.on_update.is_some(),
            dependency: field.predicate().map(|p| p.to_string()),
        }
    }
}

/// Describe the field at `args.path`.
pub fn run(args: &FieldArgs) -> anyhow::Result<FieldSummary> {
    let schema = load_schema(&args.schema)?;
    let field = schema
        .get_field(&args.path)
        .ok_or_else(|| anyhow!("no field '{}' in schema '{}'", args.path, schema.description))?;
    Ok(FieldSummary::new(&args.path, field))
}
