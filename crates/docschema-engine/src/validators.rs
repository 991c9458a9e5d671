//! # Built-in Value Validators
//!
//! A reference set of [`FieldValidator`]s. The engine does not depend on
//! any of them; they exist so schemas can be declared without writing
//! validators for common scalar types, and so descriptors can name them.
//!
//! Validators normalize as well as check: an integral float passed to
//! [`IntegerValidator`] comes back as an integer, an integer passed to
//! [`FloatValidator`] comes back as a float, and [`TimestampValidator`]
//! rewrites every accepted instant as `YYYY-MM-DDTHH:MM:SSZ`.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use docschema_core::Value;

use crate::error::{CompileError, ValueError};
use crate::field::{FieldSerializer, FieldValidator};

fn check_bounds<T: PartialOrd + std::fmt::Display>(
    min: Option<T>,
    max: Option<T>,
) -> Result<(), CompileError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(CompileError::Validator(format!(
            "minimum {min} is greater than maximum {max}"
        ))),
        _ => Ok(()),
    }
}

fn one_of<T: std::fmt::Display>(allowed: &[T]) -> ValueError {
    let items: Vec<String> = allowed.iter().map(ToString::to_string).collect();
    ValueError::new(format!("not one of [{}]", items.join(", ")))
}

// ─── String ─────────────────────────────────────────────────────────

/// Accepts strings, optionally bounded in length (in characters) or
/// restricted to a set of allowed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringValidator {
    min_len: Option<usize>,
    max_len: Option<usize>,
    allowed: Vec<String>,
}

impl StringValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_len(mut self, min_len: usize) -> Self {
        self.min_len = Some(min_len);
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn allowed<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = allowed.into_iter().map(Into::into).collect();
        self
    }
}

impl FieldValidator for StringValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValueError> {
        let s = value.as_str().ok_or_else(|| ValueError::new("not a string"))?;
        let len = s.chars().count();
        if let Some(min) = self.min_len {
            if len < min {
                return Err(ValueError::new(format!("is shorter than {min}")));
            }
        }
        if let Some(max) = self.max_len {
            if len > max {
                return Err(ValueError::new(format!("is longer than {max}")));
            }
        }
        if !self.allowed.is_empty() && !self.allowed.iter().any(|a| a == s) {
            return Err(one_of(&self.allowed));
        }
        Ok(value.clone())
    }

    fn compile(&self) -> Result<(), CompileError> {
        check_bounds(self.min_len, self.max_len)
    }
}

// ─── Integer ────────────────────────────────────────────────────────

/// Accepts integers, and floats with no fractional part (normalized to
/// integers).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerValidator {
    min: Option<i64>,
    max: Option<i64>,
    allowed: Vec<i64>,
}

impl IntegerValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn allowed(mut self, allowed: impl IntoIterator<Item = i64>) -> Self {
        self.allowed = allowed.into_iter().collect();
        self
    }
}

impl FieldValidator for IntegerValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValueError> {
        let n = match value {
            Value::Integer(n) => *n,
            Value::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
                *f as i64
            }
            _ => return Err(ValueError::new("not an integer")),
        };
        if let Some(min) = self.min {
            if n < min {
                return Err(ValueError::new(format!("is lower than {min}")));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                return Err(ValueError::new(format!("is greater than {max}")));
            }
        }
        if !self.allowed.is_empty() && !self.allowed.contains(&n) {
            return Err(one_of(&self.allowed));
        }
        Ok(Value::Integer(n))
    }

    fn compile(&self) -> Result<(), CompileError> {
        check_bounds(self.min, self.max)
    }
}

// ─── Float ──────────────────────────────────────────────────────────

/// Accepts finite floats and integers (widened to floats).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatValidator {
    min: Option<f64>,
    max: Option<f64>,
}

impl FloatValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

impl FieldValidator for FloatValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValueError> {
        let f = value
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| ValueError::new("not a float"))?;
        if let Some(min) = self.min {
            if f < min {
                return Err(ValueError::new(format!("is lower than {min}")));
            }
        }
        if let Some(max) = self.max {
            if f > max {
                return Err(ValueError::new(format!("is greater than {max}")));
            }
        }
        Ok(Value::Float(f))
    }

    fn compile(&self) -> Result<(), CompileError> {
        check_bounds(self.min, self.max)
    }
}

// ─── Bool ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolValidator;

impl FieldValidator for BoolValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValueError> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(ValueError::new("not a Boolean")),
        }
    }
}

// ─── Object ─────────────────────────────────────────────────────────

/// Accepts any mapping without looking inside. Use a nested schema to
/// constrain its keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectValidator;

impl FieldValidator for ObjectValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValueError> {
        match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(ValueError::new("not a dict")),
        }
    }
}

// ─── Array ──────────────────────────────────────────────────────────

/// Accepts sequences, optionally bounded in length, validating every item
/// with an item validator.
#[derive(Debug, Clone, Default)]
pub struct ArrayValidator {
    items: Option<Arc<dyn FieldValidator>>,
    min_len: Option<usize>,
    max_len: Option<usize>,
}

impl ArrayValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(mut self, items: impl FieldValidator + 'static) -> Self {
        self.items = Some(Arc::new(items));
        self
    }

    pub(crate) fn items_arc(mut self, items: Arc<dyn FieldValidator>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn min_len(mut self, min_len: usize) -> Self {
        self.min_len = Some(min_len);
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

impl FieldValidator for ArrayValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValueError> {
        let items = value.as_array().ok_or_else(|| ValueError::new("not an array"))?;
        if let Some(min) = self.min_len {
            if items.len() < min {
                return Err(ValueError::new(format!("has fewer than {min} items")));
            }
        }
        if let Some(max) = self.max_len {
            if items.len() > max {
                return Err(ValueError::new(format!("has more than {max} items")));
            }
        }
        let Some(validator) = &self.items else {
            return Ok(value.clone());
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                validator
                    .validate(item)
                    .map_err(|e| ValueError::new(format!("invalid value at #{}: {e}", i + 1)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn compile(&self) -> Result<(), CompileError> {
        check_bounds(self.min_len, self.max_len)?;
        match &self.items {
            Some(items) => items.compile(),
            None => Ok(()),
        }
    }

    fn serializer(&self) -> Option<&dyn FieldSerializer> {
        self.items
            .as_ref()
            .and_then(|items| items.serializer())
            .map(|_| self as &dyn FieldSerializer)
    }
}

impl FieldSerializer for ArrayValidator {
    fn serialize(&self, value: &Value) -> Result<Value, ValueError> {
        let (Some(serializer), Value::Array(items)) =
            (self.items.as_ref().and_then(|items| items.serializer()), value)
        else {
            return Ok(value.clone());
        };
        items
            .iter()
            .map(|item| serializer.serialize(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

// ─── Timestamp ──────────────────────────────────────────────────────

/// Accepts RFC 3339 strings with any UTC offset, and unix seconds.
///
/// Every accepted instant is normalized to UTC with a `Z` suffix,
/// truncated to seconds: `2024-03-01T12:00:00Z`. The same rendering is
/// applied when serializing, so stored epoch integers are echoed back as
/// strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampValidator;

impl TimestampValidator {
    fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Integer(secs) => Utc.timestamp_opt(*secs, 0).single(),
            _ => None,
        }
    }
}

/// Render an instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub(crate) fn format_timestamp(dt: DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

impl FieldValidator for TimestampValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValueError> {
        Self::parse(value)
            .map(format_timestamp)
            .ok_or_else(|| ValueError::new("not a time"))
    }

    fn serializer(&self) -> Option<&dyn FieldSerializer> {
        Some(self)
    }
}

impl FieldSerializer for TimestampValidator {
    fn serialize(&self, value: &Value) -> Result<Value, ValueError> {
        self.validate(value)
    }
}
