//! # Schema — Compile, Serialize and Field Lookup
//!
//! A [`Schema`] is a closed, ordered set of named [`Field`]s. Sub-documents
//! are described by fields carrying their own nested schema, to any depth.
//!
//! ## Lifecycle
//!
//! 1. Build the schema with [`Schema::with_field`].
//! 2. Call [`Schema::compile`] exactly once. It compiles every dependency
//!    declaration against the root and checks each field's configuration.
//! 3. Use the schema, immutably and from any number of threads, for
//!    [`serialize`](Schema::serialize), [`prepare`](Schema::prepare) and
//!    [`validate`](Schema::validate).
//!
//! Prepare and validate live in their own modules.

use std::collections::BTreeMap;

use docschema_core::{Map, Value};

use crate::error::{CompileError, SerializeError};
use crate::field::Field;

/// Shared empty mapping standing in for absent sub-documents.
pub(crate) static EMPTY: Map = Map::new();

/// Ordered collection of named field descriptors.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Description of the object described by this schema.
    pub description: String,
    /// The schema's allowed fields.
    pub fields: BTreeMap<String, Field>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add or replace a field.
    pub fn with_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Compile the schema tree.
    ///
    /// Dependencies are compiled first, against this schema as root, then
    /// every field's own configuration is checked. Fails on the first error,
    /// wrapped with the dotted path of the offending field.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if a dependency cannot be compiled, a
    /// validator's parameters are inconsistent, or a default is rejected by
    /// its field's validator.
    pub fn compile(&mut self) -> Result<(), CompileError> {
        let root = self.clone();
        self.compile_dependencies(&root)?;
        self.compile_fields()?;
        tracing::debug!(
            schema = %self.description,
            fields = self.fields.len(),
            "schema compiled"
        );
        Ok(())
    }

    fn compile_dependencies(&mut self, root: &Schema) -> Result<(), CompileError> {
        for (name, field) in self.fields.iter_mut() {
            if let Some(dependency) = &field.dependency {
                let predicate = dependency
                    .compile(root)
                    .map_err(|e| CompileError::field(name.as_str(), e))?;
                field.predicate = Some(predicate);
            }
            if let Some(schema) = field.schema.as_mut() {
                schema
                    .compile_dependencies(root)
                    .map_err(|e| CompileError::field(name.as_str(), e))?;
            }
        }
        Ok(())
    }

    pub(crate) fn compile_fields(&mut self) -> Result<(), CompileError> {
        for (name, field) in self.fields.iter_mut() {
            if field.schema.is_some() && field.validator.is_some() {
                tracing::warn!(
                    field = %name,
                    "field declares both a sub-schema and a validator; the validator is ignored"
                );
            }
            field
                .compile()
                .map_err(|e| CompileError::field(name.as_str(), e))?;
        }
        Ok(())
    }

    /// Returns the field for a possibly dotted name (`address.city`).
    ///
    /// Returns `None` if a segment is not declared, or if an intermediate
    /// segment names a field without a nested schema.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        match name.split_once('.') {
            Some((head, rest)) => self.fields.get(head)?.schema.as_deref()?.get_field(rest),
            None => self.fields.get(name),
        }
    }

    /// Returns the dotted path of every field in the tree, depth first.
    pub fn field_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, field) in &self.fields {
            paths.push(name.clone());
            if let Some(schema) = &field.schema {
                paths.extend(
                    schema
                        .field_paths()
                        .into_iter()
                        .map(|sub| format!("{name}.{sub}")),
                );
            }
        }
        paths
    }

    /// Prepare a payload to be sent back to a client, in place.
    ///
    /// Hidden fields are removed. Fields whose validator exposes a
    /// serializer have their value replaced with the serializer output.
    /// Sub-documents are serialized recursively. Keys the schema does not
    /// declare are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] naming the dotted field path on the first
    /// serializer failure. The payload may be partially serialized.
    pub fn serialize(&self, payload: &mut Map) -> Result<(), SerializeError> {
        payload.retain(|name, _| !self.fields.get(name).is_some_and(|field| field.hidden));
        for (name, value) in payload.iter_mut() {
            let Some(field) = self.fields.get(name) else {
                continue;
            };
            if let Some(serializer) = field.validator.as_ref().and_then(|v| v.serializer()) {
                *value = serializer
                    .serialize(value)
                    .map_err(|e| SerializeError::new(name.as_str(), e))?;
            }
            if let (Some(schema), Value::Object(sub)) = (&field.schema, value) {
                schema.serialize(sub).map_err(|e| e.within(name))?;
            }
        }
        Ok(())
    }
}
