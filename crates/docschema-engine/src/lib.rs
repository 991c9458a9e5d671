//! # docschema-engine — Schema Compilation, Prepare and Validate
//!
//! Turns a declared [`Schema`] into the two-step write pipeline used by
//! document stores:
//!
//! ```text
//! payload ──prepare(mode)──▶ (changes, base) ──validate──▶ (doc, errors)
//! ```
//!
//! ## Prepare (`prepare`)
//!
//! [`Schema::prepare`] diffs a payload against the stored original in one of
//! three [`Mode`]s (create, update, replace). It places defaults and hook
//! output in `base`, and caller changes and removal tombstones in
//! `changes`.
//!
//! ## Validate (`validate`)
//!
//! [`Schema::validate`] merges `changes` onto `base`, applies the read-only,
//! required and dependency rules, and runs every field validator. All errors
//! are collected into one [`ErrorReport`](docschema_core::ErrorReport).
//!
//! ## Schemas (`schema`, `field`, `validators`, `hooks`, `dependency`)
//!
//! Schemas are built in code from [`Field`]s carrying pluggable capabilities
//! ([`FieldValidator`], [`FieldSerializer`], [`Hook`], [`Dependency`]), or
//! loaded from YAML/JSON through the [`descriptor`] module. A schema must be
//! [compiled](Schema::compile) once before use, then is read-only and may be
//! shared across threads.
//!
//! ## Crate Policy
//!
//! - Depends only on `docschema-core` internally.
//! - Validation never aborts: a best-effort document is always returned.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod hooks;
pub mod prepare;
pub mod schema;
pub mod validate;
pub mod validators;

pub use dependency::{Dependency, Equals, Predicate, Requires};
pub use descriptor::{
    DependencyDescriptor, DescriptorError, FieldDescriptor, HookDescriptor, SchemaDescriptor,
    ValidatorDescriptor,
};
pub use error::{CompileError, PrepareError, SerializeError, ValueError};
pub use field::{Field, FieldSerializer, FieldValidator, Hook};
pub use hooks::{created_field, id_field, updated_field, NewId, Now};
pub use prepare::{Mode, Prepared};
pub use schema::Schema;
pub use validate::Validated;
pub use validators::{
    ArrayValidator, BoolValidator, FloatValidator, IntegerValidator, ObjectValidator,
    StringValidator, TimestampValidator,
};
