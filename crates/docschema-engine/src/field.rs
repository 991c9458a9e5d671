//! # Field Descriptors and Field Capabilities
//!
//! A [`Field`] is the static configuration of one named schema entry. Its
//! behaviour is supplied by pluggable capabilities:
//!
//! - [`FieldValidator`]: Checks and normalizes a value at validation time.
//! - [`FieldSerializer`]: Transforms a value before it is echoed back,
//!   exposed through [`FieldValidator::serializer`].
//! - [`Hook`]: `on_init` / `on_update` lifecycle callbacks run by `prepare`.
//! - [`Dependency`]: A condition on the merged document, compiled once.
//!
//! A field with a nested `schema` delegates validation to that schema; its
//! `validator`, if any, is ignored.

use std::fmt;
use std::sync::Arc;

use docschema_core::{Context, Value};

use crate::dependency::{Dependency, Predicate};
use crate::error::{CompileError, ValueError};
use crate::schema::Schema;

/// Checks a field value and returns its normalized form.
pub trait FieldValidator: Send + Sync + fmt::Debug {
    /// Validate `value`, returning the value to store in the resolved document.
    fn validate(&self, value: &Value) -> Result<Value, ValueError>;

    /// Check the validator's own configuration. Called once by `Schema::compile`.
    fn compile(&self) -> Result<(), CompileError> {
        Ok(())
    }

    /// Returns the serializer this validator provides, if any.
    fn serializer(&self) -> Option<&dyn FieldSerializer> {
        None
    }
}

/// Transforms a stored value into its outgoing representation.
pub trait FieldSerializer: Send + Sync {
    fn serialize(&self, value: &Value) -> Result<Value, ValueError>;
}

/// Lifecycle callback run by `prepare` on a field's current value.
///
/// `value` is `None` when the field has no current value. Returning `None`
/// removes the key from the map that would have received the result.
/// Hooks have no error channel; they must handle their own failures.
pub trait Hook: Send + Sync {
    fn call(&self, ctx: &Context, value: Option<Value>) -> Option<Value>;
}

impl<F> Hook for F
where
    F: Fn(&Context, Option<Value>) -> Option<Value> + Send + Sync,
{
    fn call(&self, ctx: &Context, value: Option<Value>) -> Option<Value> {
        self(ctx, value)
    }
}

/// Configuration of a single schema field.
#[derive(Clone, Default)]
pub struct Field {
    /// Free-form description.
    pub description: String,
    /// The field must resolve to a non-null value.
    pub required: bool,
    /// The field may not appear in a change-set.
    pub read_only: bool,
    /// The field is never echoed back by `Schema::serialize`.
    pub hidden: bool,
    /// Value placed in the base of a new document when the payload omits it.
    pub default: Option<Value>,
    /// Value checker, ignored when `schema` is set.
    pub validator: Option<Arc<dyn FieldValidator>>,
    /// Nested schema for sub-document fields.
    pub schema: Option<Box<Schema>>,
    /// Hook run when creating or replacing a document.
    pub on_init: Option<Arc<dyn Hook>>,
    /// Hook run when updating a document.
    pub on_update: Option<Arc<dyn Hook>>,
    /// Condition evaluated on the merged root document when the field changes.
    pub dependency: Option<Arc<dyn Dependency>>,
    pub(crate) predicate: Option<Arc<dyn Predicate>>,
}

impl Field {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validator(mut self, validator: impl FieldValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(Box::new(schema));
        self
    }

    pub fn on_init(mut self, hook: impl Hook + 'static) -> Self {
        self.on_init = Some(Arc::new(hook));
        self
    }

    pub fn on_update(mut self, hook: impl Hook + 'static) -> Self {
        self.on_update = Some(Arc::new(hook));
        self
    }

    pub fn dependency(mut self, dependency: impl Dependency + 'static) -> Self {
        self.dependency = Some(Arc::new(dependency));
        self.predicate = None;
        self
    }

    /// Returns the compiled dependency predicate, once `Schema::compile` ran.
    pub fn predicate(&self) -> Option<&Arc<dyn Predicate>> {
        self.predicate.as_ref()
    }

    /// Check the field's configuration and compile its nested schema.
    pub(crate) fn compile(&mut self) -> Result<(), CompileError> {
        if let Some(schema) = self.schema.as_mut() {
            return schema.compile_fields();
        }
        if let Some(validator) = &self.validator {
            validator.compile()?;
            if let Some(default) = &self.default {
                validator
                    .validate(default)
                    .map_err(|e| CompileError::InvalidDefault(e.to_string()))?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("description", &self.description)
            .field("required", &self.required)
            .field("read_only", &self.read_only)
            .field("hidden", &self.hidden)
            .field("default", &self.default)
            .field("validator", &self.validator)
            .field("schema", &self.schema)
            .field("on_init", &self.on_init.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("dependency", &self.dependency)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{IntegerValidator, StringValidator};

    #[test]
    fn test_builder_sets_flags() {
        let field = Field::new()
            .description("display name")
            .required(true)
            .read_only(true)
            .hidden(true)
            .default_value("anon");
        assert!(field.required && field.read_only && field.hidden);
        assert_eq!(field.default, Some(Value::from("anon")));
        assert_eq!(field.description, "display name");
    }

    #[test]
    fn test_closure_is_a_hook() {
        let field = Field::new().on_init(|_: &Context, _: Option<Value>| Some(Value::from(1)));
        let hook = field.on_init.unwrap();
        assert_eq!(hook.call(&Context::new(), None), Some(Value::Integer(1)));
    }

    #[test]
    fn test_compile_rejects_invalid_default() {
        let mut field = Field::new().default_value("zero").validator(IntegerValidator::new());
        let err = field.compile().unwrap_err();
        assert!(matches!(err, CompileError::InvalidDefault(_)));
    }

    #[test]
    fn test_compile_accepts_valid_default() {
        let mut field = Field::new().default_value(0).validator(IntegerValidator::new());
        assert!(field.compile().is_ok());
    }

    #[test]
    fn test_compile_propagates_validator_configuration() {
        let mut field = Field::new().validator(StringValidator::new().min_len(5).max_len(2));
        assert!(matches!(field.compile(), Err(CompileError::Validator(_))));
    }

    #[test]
    fn test_debug_hides_hook_internals() {
        let field = Field::new().on_update(|_: &Context, v: Option<Value>| v);
        let rendered = format!("{field:?}");
        assert!(rendered.contains("on_update: true"));
        assert!(rendered.contains("on_init: false"));
    }
}
