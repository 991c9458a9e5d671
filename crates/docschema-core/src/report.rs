//! # Field Error Reports
//!
//! Structured, recoverable validation errors keyed by field name.
//!
//! ## Design
//!
//! - Errors accumulate: every structural, value and dependency error for a
//!   field is appended in the order it was found. Nothing short-circuits.
//! - Sub-documents report through a single [`FieldError::Nested`] entry
//!   under the parent field name, holding the sub-document's own report.
//! - Each validation level returns an owned [`ErrorReport`]; callers combine
//!   reports with [`ErrorReport::merge`]. No report is shared across levels.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// A single error attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A read-only field appeared in the change-set.
    ReadOnly,
    /// A required field is absent, or was explicitly set to null.
    Required,
    /// The document carries a key the schema does not declare.
    InvalidField,
    /// A sub-schema field holds something other than a mapping.
    NotADict,
    /// The field's value validator rejected the value.
    Invalid(String),
    /// The field's dependency condition does not hold on the merged document.
    Dependency(String),
    /// Errors reported by a nested schema.
    Nested(ErrorReport),
}

impl FieldError {
    /// Returns the nested report if this is a [`FieldError::Nested`] entry.
    pub fn as_nested(&self) -> Option<&ErrorReport> {
        match self {
            FieldError::Nested(report) => Some(report),
            _ => None,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::ReadOnly => write!(f, "read-only"),
            FieldError::Required => write!(f, "required"),
            FieldError::InvalidField => write!(f, "invalid field"),
            FieldError::NotADict => write!(f, "not a dict"),
            FieldError::Invalid(message) => write!(f, "{message}"),
            FieldError::Dependency(condition) => {
                write!(f, "does not match dependency: {condition}")
            }
            FieldError::Nested(report) => write!(f, "{{{report}}}"),
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldError::Nested(report) => report.serialize(serializer),
            other => serializer.collect_str(other),
        }
    }
}

/// Errors collected during validation, keyed by field name.
///
/// Dependency errors on nested fields use a dotted path (`outer.inner`) as
/// their key at the root level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    fields: BTreeMap<String, Vec<FieldError>>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error to a field.
    pub fn add(&mut self, field: impl Into<String>, error: FieldError) {
        self.fields.entry(field.into()).or_default().push(error);
    }

    /// Append every error of `other`, preserving order per field.
    pub fn merge(&mut self, other: ErrorReport) {
        for (field, errors) in other.fields {
            self.fields.entry(field).or_default().extend(errors);
        }
    }

    /// Returns the number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field has an error.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the errors recorded for a field.
    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns true if `field` carries `error`.
    pub fn contains(&self, field: &str, error: &FieldError) -> bool {
        self.get(field).is_some_and(|errors| errors.contains(error))
    }

    /// Returns the first nested report recorded for a field.
    pub fn nested(&self, field: &str) -> Option<&ErrorReport> {
        self.get(field)?.iter().find_map(FieldError::as_nested)
    }

    /// Iterate over fields and their errors in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.fields
            .iter()
            .map(|(field, errors)| (field.as_str(), errors.as_slice()))
    }

    /// Consumes self and returns the inner map.
    pub fn into_inner(self) -> BTreeMap<String, Vec<FieldError>> {
        self.fields
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, errors)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{field}: ")?;
            for (j, error) in errors.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{error}")?;
            }
        }
        Ok(())
    }
}
