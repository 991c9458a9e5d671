//! # Error Types — Configuration, Serialization and Usage Errors
//!
//! Structural, value and dependency errors found while validating a
//! document are recoverable and are collected into an
//! [`ErrorReport`](docschema_core::ErrorReport). The types here cover the
//! remaining classes, each of which aborts the call that raised it:
//!
//! - [`CompileError`]: A schema is misconfigured and cannot be used.
//! - [`SerializeError`]: A payload failed a field serializer.
//! - [`PrepareError`]: The caller asked for something contradictory.
//! - [`ValueError`]: A value validator or serializer rejected a value.
//!   Validation turns it into a per-field report entry.

use thiserror::Error;

/// A value validator or field serializer rejected a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValueError(String);

impl ValueError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Error raised while compiling a schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A field's configuration is invalid. Nested fields chain into a
    /// dotted path: `address.city: invalid default: not a string`.
    #[error("{field}{}", separator(.source))]
    Field {
        /// Name of the offending field.
        field: String,
        /// The underlying error.
        #[source]
        source: Box<CompileError>,
    },

    /// A field default is rejected by the field's own validator.
    #[error("invalid default: {0}")]
    InvalidDefault(String),

    /// A validator's own parameters are inconsistent.
    #[error("invalid validator configuration: {0}")]
    Validator(String),

    /// A dependency references a field path the schema does not declare.
    #[error("dependency references unknown field '{0}'")]
    UnknownDependencyField(String),

    /// A dependency declaration cannot be compiled.
    #[error("invalid dependency: {0}")]
    Dependency(String),
}

impl CompileError {
    /// Wrap an error with the name of the field it was raised for.
    pub fn field(field: impl Into<String>, source: CompileError) -> Self {
        CompileError::Field {
            field: field.into(),
            source: Box::new(source),
        }
    }
}

fn separator(source: &CompileError) -> String {
    match source {
        CompileError::Field { .. } => format!(".{source}"),
        other => format!(": {other}"),
    }
}

/// A field serializer rejected a payload value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct SerializeError {
    /// Dotted path of the offending field.
    pub path: String,
    /// The serializer's message.
    pub message: String,
}

impl SerializeError {
    pub fn new(field: impl Into<String>, error: ValueError) -> Self {
        Self {
            path: field.into(),
            message: error.0,
        }
    }

    /// Prefix the path with the parent field name.
    pub fn within(mut self, parent: &str) -> Self {
        self.path = format!("{parent}.{}", self.path);
        self
    }
}

/// Misuse of the prepare contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    /// Replace mode needs the document being replaced.
    #[error("replace requires an original document")]
    ReplaceWithoutOriginal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_field_path() {
        let err = CompileError::field(
            "address",
            CompileError::field("city", CompileError::InvalidDefault("not a string".into())),
        );
        assert_eq!(err.to_string(), "address.city: invalid default: not a string");
    }

    #[test]
    fn test_serialize_error_within() {
        let err = SerializeError::new("when", ValueError::new("not a time")).within("meta");
        assert_eq!(err.path, "meta.when");
        assert_eq!(err.to_string(), "meta.when: not a time");
    }

    #[test]
    fn test_prepare_error_display() {
        assert_eq!(
            PrepareError::ReplaceWithoutOriginal.to_string(),
            "replace requires an original document"
        );
    }
}
