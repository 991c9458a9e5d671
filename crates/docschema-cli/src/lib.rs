//! # docschema-cli — Schema Descriptor Command-Line Interface
//!
//! Embeds the docschema engine in a small clap-based CLI that works on
//! files: a schema descriptor (YAML or JSON) and JSON or YAML documents.
//!
//! ## Subcommands
//!
//! - `check`: Compile a schema descriptor and list its field paths
//! - `field`: Look up a (dotted) field and describe it
//! - `serialize`: Apply hidden-field removal and serializers to a document
//! - `validate`: Prepare a payload in create, update or replace mode, then
//!   validate it
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the engine and return values; printing
//!   and exit codes belong to `main`.

pub mod check;
pub mod field;
pub mod input;
pub mod serialize;
pub mod validate;
