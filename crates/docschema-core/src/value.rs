//! # Document Values — Tagged Sum Type with Tombstones
//!
//! Defines [`Value`], the representation of every payload, original document,
//! change-set, base snapshot and resolved document handled by docschema,
//! and [`Map`], the ordered mapping used for documents and sub-documents.
//!
//! ## Tombstones
//!
//! [`Value::Tombstone`] marks a field for removal. It is only meaningful
//! inside a change-set: merging a change-set onto a base deletes every key
//! that carries a tombstone. Tombstones refuse to serialize and refuse to
//! convert to `serde_json::Value`, so a change-set that escapes unmerged
//! fails loudly instead of persisting a marker.
//!
//! ## Equality
//!
//! Equality is structural over the variants. `Integer(1)` and `Float(1.0)`
//! are different values, arrays compare element-wise in order, objects
//! compare key sets and values. `Float(NAN)` is never equal to itself.
//!
//! ## Key Order
//!
//! [`Map`] is a `BTreeMap`, so documents, change-sets and error reports
//! iterate in sorted key order and render deterministically.

use std::collections::BTreeMap;
use std::fmt;

use serde::{ser, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConversionError;

/// An ordered mapping from field name to value.
pub type Map = BTreeMap<String, Value>;

/// A document value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit null. Distinct from an absent key.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Nested document.
    Object(Map),
    /// Removal marker, valid only inside a change-set.
    Tombstone,
}

impl Value {
    /// Returns the name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Tombstone => "tombstone",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Value::Tombstone)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Consumes the value and returns the inner map if it is an object.
    pub fn into_object(self) -> Option<Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value` without consuming `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Tombstone`] if the value contains a tombstone
    /// at any depth, or [`ConversionError::NonFiniteFloat`] for NaN/infinity.
    pub fn to_json(&self) -> Result<serde_json::Value, ConversionError> {
        serde_json::Value::try_from(self.clone())
    }
}

/// Resolve a dotted path (`a.b.c`) through nested objects.
///
/// Returns `None` if any segment is missing or an intermediate value is not
/// an object.
pub fn lookup<'a>(doc: &'a Map, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        Some((head, rest)) => lookup(doc.get(head)?.as_object()?, rest),
        None => doc.get(path),
    }
}

// ─── Conversions ────────────────────────────────────────────────────

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                // u64 above i64::MAX and all non-integral numbers.
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = ConversionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(n) => serde_json::Value::from(n),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .ok_or(ConversionError::NonFiniteFloat(f))?,
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .into_iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, value)| Ok((key, serde_json::Value::try_from(value)?)))
                    .collect::<Result<_, ConversionError>>()?,
            ),
            Value::Tombstone => return Err(ConversionError::Tombstone),
        })
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

// ─── Serde ──────────────────────────────────────────────────────────

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(map) => map.serialize(serializer),
            Value::Tombstone => Err(ser::Error::custom(ConversionError::Tombstone)),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Tombstone => write!(f, "<tombstone>"),
            Value::Float(v) if !v.is_finite() => write!(f, "{v}"),
            other => {
                let rendered = serde_json::to_string(other).map_err(|_| fmt::Error)?;
                write!(f, "{rendered}")
            }
        }
    }
}
