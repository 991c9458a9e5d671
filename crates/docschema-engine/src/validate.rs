//! # Validate — Merge and Check
//!
//! `validate` merges a change-set onto its base and checks the result
//! against the schema, producing the resolved document and an
//! [`ErrorReport`]. It never aborts: every recoverable error is collected
//! and a best-effort document is always returned. Callers reject the
//! operation when the report is non-empty.
//!
//! ## Order of checks, per level
//!
//! 1. `read_only` fields present in the change-set → `read-only`.
//! 2. `required` fields explicitly null in the change-set, or absent/null in
//!    both maps → `required`. A tombstone is neither.
//! 3. Sub-schema fields absent from both maps are validated as an empty
//!    document so nested `required` violations surface.
//! 4. The document is built: base overlaid with changes, tombstones delete.
//! 5. Root level only: dependency predicates run on the deeply merged
//!    document, where sub-document changes overlay their base and nested
//!    tombstones are already gone.
//! 6. Every document key is checked: undeclared keys → `invalid field`;
//!    sub-documents are validated recursively and replaced by their
//!    resolved form; other fields run their validator and store the
//!    normalized value.

use docschema_core::{ErrorReport, FieldError, Map, Value};

use crate::schema::{Schema, EMPTY};

/// Output of [`Schema::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    /// The resolved document.
    pub doc: Map,
    /// Every error found. Empty when the document is valid.
    pub errors: ErrorReport,
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the document, or the report if any error was found.
    pub fn into_result(self) -> Result<Map, ErrorReport> {
        if self.errors.is_empty() {
            Ok(self.doc)
        } else {
            Err(self.errors)
        }
    }
}

impl Schema {
    /// Merge `changes` onto `base` and validate the resulting document.
    pub fn validate(&self, changes: &Map, base: &Map) -> Validated {
        let validated = self.validate_level(changes, base, true);
        tracing::debug!(
            schema = %self.description,
            fields = validated.doc.len(),
            errors = validated.errors.len(),
            "document validated"
        );
        validated
    }

    fn validate_level(&self, changes: &Map, base: &Map, is_root: bool) -> Validated {
        let mut errors = ErrorReport::new();

        for (name, field) in &self.fields {
            if field.read_only && changes.contains_key(name) {
                errors.add(name.as_str(), FieldError::ReadOnly);
            }
            if field.required {
                let missing = match changes.get(name) {
                    Some(Value::Null) => true,
                    Some(_) => false,
                    None => base.get(name).map_or(true, Value::is_null),
                };
                if missing {
                    errors.add(name.as_str(), FieldError::Required);
                }
            }
            if let Some(schema) = &field.schema {
                if !changes.contains_key(name) && !base.contains_key(name) {
                    let sub = schema.validate_level(&EMPTY, &EMPTY, false);
                    if !sub.errors.is_empty() {
                        errors.add(name.as_str(), FieldError::Nested(sub.errors));
                    }
                }
            }
        }

        let mut doc = base.clone();
        for (name, value) in changes {
            if value.is_tombstone() {
                doc.remove(name);
            } else {
                doc.insert(name.clone(), value.clone());
            }
        }

        // Dependencies may reference parent fields, so they are evaluated
        // once, from the root, on the fully merged document.
        if is_root {
            let merged = deep_merge(Some(self), changes, base);
            errors.merge(self.validate_dependencies(changes, &merged, ""));
        }

        for (name, value) in doc.iter_mut() {
            let Some(field) = self.fields.get(name) else {
                errors.add(name.as_str(), FieldError::InvalidField);
                continue;
            };
            if let Some(schema) = &field.schema {
                let sub_changes = sub_document(changes, name, &mut errors);
                let sub_base = sub_document(base, name, &mut errors);
                let sub = schema.validate_level(sub_changes, sub_base, false);
                if sub.errors.is_empty() {
                    *value = Value::Object(sub.doc);
                } else {
                    errors.add(name.as_str(), FieldError::Nested(sub.errors));
                }
            } else if let Some(validator) = &field.validator {
                match validator.validate(value) {
                    Ok(normalized) => *value = normalized,
                    Err(e) => errors.add(name.as_str(), FieldError::Invalid(e.to_string())),
                }
            }
        }

        Validated { doc, errors }
    }

    fn validate_dependencies(&self, changes: &Map, doc: &Map, prefix: &str) -> ErrorReport {
        let mut errors = ErrorReport::new();
        for (name, value) in changes {
            let Some(field) = self.fields.get(name) else {
                continue;
            };
            if value.is_tombstone() {
                continue;
            }
            let path = format!("{prefix}{name}");
            match (&field.dependency, &field.predicate) {
                (Some(_), Some(predicate)) => {
                    if !predicate.matches(doc) {
                        errors.add(path.as_str(), FieldError::Dependency(predicate.to_string()));
                    }
                }
                (Some(dependency), None) => {
                    tracing::warn!(
                        field = %path,
                        dependency = ?dependency,
                        "dependency was never compiled; skipping"
                    );
                }
                _ => {}
            }
            if let (Some(schema), Value::Object(sub_changes)) = (&field.schema, value) {
                errors.merge(schema.validate_dependencies(sub_changes, doc, &format!("{path}.")));
            }
        }
        errors
    }
}

/// Overlay `changes` onto `base` at every depth. Sub-document changes of
/// fields with a nested schema merge into the base sub-document, and
/// tombstones delete their key wherever they appear.
fn deep_merge(schema: Option<&Schema>, changes: &Map, base: &Map) -> Map {
    let mut doc = base.clone();
    for (name, change) in changes {
        match change {
            Value::Tombstone => {
                doc.remove(name);
            }
            Value::Object(sub_changes) => {
                let sub_schema = schema
                    .and_then(|schema| schema.fields.get(name))
                    .and_then(|field| field.schema.as_deref());
                let sub_base = match (sub_schema, base.get(name)) {
                    (Some(_), Some(Value::Object(sub_base))) => sub_base,
                    _ => &EMPTY,
                };
                let merged = deep_merge(sub_schema, sub_changes, sub_base);
                doc.insert(name.clone(), Value::Object(merged));
            }
            other => {
                doc.insert(name.clone(), other.clone());
            }
        }
    }
    doc
}

/// Returns the sub-document stored under `name`, or an empty map. A value
/// that is not a mapping is reported as `not a dict`.
fn sub_document<'a>(map: &'a Map, name: &str, errors: &mut ErrorReport) -> &'a Map {
    match map.get(name) {
        None => &EMPTY,
        Some(Value::Object(sub)) => sub,
        Some(_) => {
            errors.add(name, FieldError::NotADict);
            &EMPTY
        }
    }
}
