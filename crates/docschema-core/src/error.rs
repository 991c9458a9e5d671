//! # Error Types
//!
//! Errors raised by the core data model. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Error converting a [`Value`](crate::Value) to an external representation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Tombstones only exist inside change-sets and have no external form.
    #[error("tombstone cannot leave a change-set")]
    Tombstone,

    /// JSON has no representation for NaN or infinities.
    #[error("non-finite float {0} has no JSON representation")]
    NonFiniteFloat(f64),
}
