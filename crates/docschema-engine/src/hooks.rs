//! # Built-in Hooks and Fields
//!
//! Lifecycle hooks for the bookkeeping fields most document schemas carry,
//! and ready-made [`Field`]s wiring them up.
//!
//! | Field | Flags | on_init | on_update |
//! |-------|-------|---------|-----------|
//! | [`id_field`] | read-only | [`NewId`] | |
//! | [`created_field`] | read-only, required | [`Now`] | |
//! | [`updated_field`] | read-only, required | [`Now`] | [`Now`] |
//!
//! Because a replace tombstones omitted fields and then hands the prior
//! value to `on_init`, a replaced document keeps its id.

use chrono::Utc;
use docschema_core::{Context, Value};
use uuid::Uuid;

use crate::field::{Field, Hook};
use crate::validators::{format_timestamp, StringValidator, TimestampValidator};

/// Sets the current UTC time, truncated to seconds, unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct Now;

impl Hook for Now {
    fn call(&self, _ctx: &Context, _value: Option<Value>) -> Option<Value> {
        Some(format_timestamp(Utc::now()))
    }
}

/// Generates a v4 UUID when the field has no value yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewId;

impl Hook for NewId {
    fn call(&self, _ctx: &Context, value: Option<Value>) -> Option<Value> {
        match value {
            Some(value) if !value.is_null() => Some(value),
            _ => Some(Value::String(Uuid::new_v4().to_string())),
        }
    }
}

/// Read-only identifier generated on creation.
pub fn id_field() -> Field {
    Field::new()
        .description("The item's id")
        .read_only(true)
        .on_init(NewId)
        .validator(StringValidator::new())
}

/// Read-only creation time, set on creation and on replace.
pub fn created_field() -> Field {
    Field::new()
        .description("The time at which the item has been inserted")
        .required(true)
        .read_only(true)
        .on_init(Now)
        .validator(TimestampValidator)
}

/// Read-only modification time, refreshed on every write.
pub fn updated_field() -> Field {
    Field::new()
        .description("The time at which the item has been last updated")
        .required(true)
        .read_only(true)
        .on_init(Now)
        .on_update(Now)
        .validator(TimestampValidator)
}
