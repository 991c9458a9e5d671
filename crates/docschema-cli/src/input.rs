//! # Input Files
//!
//! Loading of schema descriptors and documents shared by every subcommand.

use std::path::Path;

use anyhow::{bail, Context as _};
use docschema_core::{Map, Value};
use docschema_engine::{Schema, SchemaDescriptor};

/// Load and compile a schema descriptor.
pub fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    let descriptor = SchemaDescriptor::load(path)?;
    let schema = descriptor
        .into_schema()
        .with_context(|| format!("schema descriptor '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), fields = schema.fields.len(), "schema loaded");
    Ok(schema)
}

/// Read a document. `.yaml` and `.yml` files are parsed as YAML, anything
/// else as JSON. The top level must be a mapping.
pub fn read_document(path: &Path) -> anyhow::Result<Map> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read document '{}'", path.display()))?;
    let is_yaml = path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    let value: Value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML document '{}'", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON document '{}'", path.display()))?
    };
    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "document '{}' must be a mapping, found {}",
            path.display(),
            other.type_name()
        ),
    }
}
