//! # docschema-core — Foundational Types for docschema
//!
//! This crate defines the data model every other docschema crate operates
//! on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Tagged values, not dynamic maps.** Documents, change-sets and base
//!    snapshots are [`Map`]s of [`Value`]s. `Value` is a closed sum type, so
//!    every consumer matches exhaustively.
//!
//! 2. **Tombstone is a variant.** Removal markers in a change-set are
//!    [`Value::Tombstone`], never a sentinel compared by identity. A tombstone
//!    cannot be serialized or converted to JSON, so it cannot leak out of a
//!    change-set into storage or a response.
//!
//! 3. **Owned error reports.** [`ErrorReport`] is a value returned by each
//!    validation level and merged explicitly by its caller. Nested documents
//!    nest their reports under [`FieldError::Nested`].
//!
//! 4. **Opaque request context.** [`Context`] carries a request id and a
//!    cooperative cancellation flag through hook invocations. The engine
//!    never inspects it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `docschema-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod context;
pub mod error;
pub mod report;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use context::Context;
pub use error::ConversionError;
pub use report::{ErrorReport, FieldError};
pub use value::{lookup, Map, Value};
