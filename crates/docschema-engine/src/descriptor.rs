//! # Schema Descriptors — Declarative Configuration
//!
//! Schemas can be declared in YAML or JSON instead of code. A descriptor
//! names built-in validators, hooks and dependencies; custom capabilities
//! still require building the [`Schema`] in code.
//!
//! ```yaml
//! description: user
//! fields:
//!   id:      { read_only: true, on_init: new_id }
//!   name:    { required: true, validator: { type: string, max_len: 64 } }
//!   age:     { default: 0, validator: { type: integer, min: 0 } }
//!   address:
//!     schema:
//!       fields:
//!         city: { required: true, validator: { type: string } }
//!   nickname: { dependency: { requires: [name] } }
//! ```
//!
//! Unknown keys are rejected at every level so a typo cannot silently
//! drop a constraint.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use docschema_core::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dependency::{Equals, Requires};
use crate::error::CompileError;
use crate::field::{Field, FieldValidator};
use crate::hooks::{NewId, Now};
use crate::schema::Schema;
use crate::validators::{
    ArrayValidator, BoolValidator, FloatValidator, IntegerValidator, ObjectValidator,
    StringValidator, TimestampValidator,
};

/// Error loading a schema descriptor.
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The descriptor file could not be read.
    #[error("cannot read schema descriptor '{path}': {source}")]
    Io {
        /// Path of the descriptor.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The descriptor is not valid YAML or does not match the format.
    #[error("invalid YAML schema descriptor: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The descriptor is not valid JSON or does not match the format.
    #[error("invalid JSON schema descriptor: {0}")]
    Json(#[from] serde_json::Error),

    /// The described schema does not compile.
    #[error("schema does not compile: {0}")]
    Compile(#[from] CompileError),
}

/// Declarative form of a [`Schema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDescriptor {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDescriptor>,
}

/// Declarative form of a [`Field`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDescriptor {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub validator: Option<ValidatorDescriptor>,
    #[serde(default)]
    pub schema: Option<SchemaDescriptor>,
    #[serde(default)]
    pub on_init: Option<HookDescriptor>,
    #[serde(default)]
    pub on_update: Option<HookDescriptor>,
    #[serde(default)]
    pub dependency: Option<DependencyDescriptor>,
}

/// A built-in validator and its parameters, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ValidatorDescriptor {
    String {
        #[serde(default)]
        min_len: Option<usize>,
        #[serde(default)]
        max_len: Option<usize>,
        #[serde(default)]
        allowed: Vec<String>,
    },
    Integer {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
        #[serde(default)]
        allowed: Vec<i64>,
    },
    Float {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Bool,
    Object,
    Array {
        #[serde(default)]
        items: Option<Box<ValidatorDescriptor>>,
        #[serde(default)]
        min_len: Option<usize>,
        #[serde(default)]
        max_len: Option<usize>,
    },
    Timestamp,
}

/// A built-in hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookDescriptor {
    /// [`Now`]
    Now,
    /// [`NewId`]
    NewId,
}

/// A built-in dependency declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum DependencyDescriptor {
    /// [`Requires`]: `{ requires: [a, b.c] }`
    Requires(Vec<String>),
    /// [`Equals`]: `{ equals: { field: kind, value: video } }`
    Equals { field: String, value: Value },
}

impl SchemaDescriptor {
    /// Parse a YAML descriptor.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DescriptorError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON descriptor.
    pub fn from_json_str(json: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a descriptor file. `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DescriptorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Build the schema without compiling it.
    pub fn build(self) -> Schema {
        let mut schema = Schema::new(self.description);
        for (name, field) in self.fields {
            schema = schema.with_field(name, field.build());
        }
        schema
    }

    /// Build and compile the schema.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Compile`] if the described schema does
    /// not compile.
    pub fn into_schema(self) -> Result<Schema, DescriptorError> {
        let mut schema = self.build();
        schema.compile()?;
        Ok(schema)
    }
}

impl FieldDescriptor {
    fn build(self) -> Field {
        let mut field = Field::new()
            .description(self.description)
            .required(self.required)
            .read_only(self.read_only)
            .hidden(self.hidden);
        field.default = self.default;
        field.validator = self.validator.map(ValidatorDescriptor::build);
        field.schema = self.schema.map(|schema| Box::new(schema.build()));
        if let Some(hook) = self.on_init {
            field = hook.attach_on_init(field);
        }
        if let Some(hook) = self.on_update {
            field = hook.attach_on_update(field);
        }
        match self.dependency {
            Some(DependencyDescriptor::Requires(paths)) => field.dependency(Requires::new(paths)),
            Some(DependencyDescriptor::Equals { field: path, value }) => {
                field.dependency(Equals::new(path, value))
            }
            None => field,
        }
    }
}

impl ValidatorDescriptor {
    fn build(self) -> Arc<dyn FieldValidator> {
        match self {
            ValidatorDescriptor::String {
                min_len,
                max_len,
                allowed,
            } => {
                let mut validator = StringValidator::new().allowed(allowed);
                if let Some(min_len) = min_len {
                    validator = validator.min_len(min_len);
                }
                if let Some(max_len) = max_len {
                    validator = validator.max_len(max_len);
                }
                Arc::new(validator)
            }
            ValidatorDescriptor::Integer { min, max, allowed } => {
                let mut validator = IntegerValidator::new().allowed(allowed);
                if let Some(min) = min {
                    validator = validator.min(min);
                }
                if let Some(max) = max {
                    validator = validator.max(max);
                }
                Arc::new(validator)
            }
            ValidatorDescriptor::Float { min, max } => {
                let mut validator = FloatValidator::new();
                if let Some(min) = min {
                    validator = validator.min(min);
                }
                if let Some(max) = max {
                    validator = validator.max(max);
                }
                Arc::new(validator)
            }
            ValidatorDescriptor::Bool => Arc::new(BoolValidator),
            ValidatorDescriptor::Object => Arc::new(ObjectValidator),
            ValidatorDescriptor::Array {
                items,
                min_len,
                max_len,
            } => {
                let mut validator = ArrayValidator::new();
                if let Some(items) = items {
                    validator = validator.items_arc(items.build());
                }
                if let Some(min_len) = min_len {
                    validator = validator.min_len(min_len);
                }
                if let Some(max_len) = max_len {
                    validator = validator.max_len(max_len);
                }
                Arc::new(validator)
            }
            ValidatorDescriptor::Timestamp => Arc::new(TimestampValidator),
        }
    }
}

impl HookDescriptor {
    fn attach_on_init(self, field: Field) -> Field {
        match self {
            HookDescriptor::Now => field.on_init(Now),
            HookDescriptor::NewId => field.on_init(NewId),
        }
    }

    fn attach_on_update(self, field: Field) -> Field {
        match self {
            HookDescriptor::Now => field.on_update(Now),
            HookDescriptor::NewId => field.on_update(NewId),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = r#"
description: user
fields:
  id: { read_only: true, on_init: new_id }
  name:
    required: true
    validator: { type: string, max_len: 8 }
  age:
    default: 0
    validator: { type: integer, min: 0 }
  tags:
    validator: { type: array, items: { type: string }, max_len: 3 }
  address:
    schema:
      fields:
        city: { required: true, validator: { type: string } }
  nickname:
    dependency: { requires: [name] }
  kind:
    validator: { type: string, allowed: [video, image] }
  duration:
    dependency: { equals: { field: kind, value: video } }
"#;

    #[test]
    fn test_parse_yaml_descriptor() {
        let descriptor = SchemaDescriptor::from_yaml_str(USER).unwrap();
        assert_eq!(descriptor.description, "user");
        assert_eq!(descriptor.fields.len(), 8);
        assert_eq!(descriptor.fields["age"].default, Some(Value::Integer(0)));
        assert_eq!(descriptor.fields["id"].on_init, Some(HookDescriptor::NewId));
        assert_eq!(
            descriptor.fields["nickname"].dependency,
            Some(DependencyDescriptor::Requires(vec!["name".into()]))
        );
    }

    #[test]
    fn test_into_schema_compiles() {
        let schema = SchemaDescriptor::from_yaml_str(USER).unwrap().into_schema().unwrap();
        assert!(schema.get_field("address.city").unwrap().required);
        assert!(schema.get_field("id").unwrap().on_init.is_some());
        assert!(schema.get_field("duration").unwrap().predicate().is_some());
        assert!(schema.get_field("tags").unwrap().validator.is_some());
    }

    #[test]
    fn test_parse_json_descriptor() {
        let json = r#"{"fields": {"flag": {"validator": {"type": "bool"}, "hidden": true}}}"#;
        let schema = SchemaDescriptor::from_json_str(json).unwrap().into_schema().unwrap();
        assert!(schema.get_field("flag").unwrap().hidden);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let yaml = "fields:\n  name: { requird: true }\n";
        assert!(matches!(
            SchemaDescriptor::from_yaml_str(yaml),
            Err(DescriptorError::Yaml(_))
        ));
    }

    #[test]
    fn test_unknown_validator_type_rejected() {
        let yaml = "fields:\n  name: { validator: { type: uuid } }\n";
        assert!(SchemaDescriptor::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_compile_errors_surface() {
        let yaml = "fields:\n  age: { default: old, validator: { type: integer } }\n";
        let err = SchemaDescriptor::from_yaml_str(yaml)
            .unwrap()
            .into_schema()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema does not compile: age: invalid default: not an integer"
        );
    }

    #[test]
    fn test_unknown_dependency_field_surfaces() {
        let yaml = "fields:\n  note: { dependency: { requires: [ghost] } }\n";
        let err = SchemaDescriptor::from_yaml_str(yaml)
            .unwrap()
            .into_schema()
            .unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::Compile(CompileError::Field { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SchemaDescriptor::load("/nonexistent/schema.yaml").unwrap_err();
        assert!(matches!(err, DescriptorError::Io { .. }));
    }
}
