//! # Field Dependencies
//!
//! A field may declare a [`Dependency`]: a condition the merged document
//! must satisfy whenever that field is part of a change-set. The
//! expression language behind a dependency is pluggable. The engine only
//! relies on two steps:
//!
//! 1. **Compile.** `Schema::compile` resolves every declaration in the tree
//!    against the *root* schema, so a nested field may reference parent or
//!    sibling paths. Compilation yields a [`Predicate`].
//! 2. **Evaluate.** Root-level validation runs each changed field's
//!    predicate against the fully merged document and reports failures as
//!    [`FieldError::Dependency`](docschema_core::FieldError::Dependency).
//!
//! Two declarations ship with the engine: [`Requires`] and [`Equals`].

use std::fmt;
use std::sync::Arc;

use docschema_core::{lookup, Map, Value};

use crate::error::CompileError;
use crate::schema::Schema;

/// A dependency declaration, compiled once against the root schema.
pub trait Dependency: Send + Sync + fmt::Debug {
    /// Resolve the declaration into an evaluable predicate.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] when the declaration is malformed or
    /// references fields `root` does not declare.
    fn compile(&self, root: &Schema) -> Result<Arc<dyn Predicate>, CompileError>;
}

/// A compiled dependency condition. `Display` renders the condition for
/// error reports.
pub trait Predicate: Send + Sync + fmt::Debug + fmt::Display {
    /// Returns true when `doc` satisfies the condition.
    fn matches(&self, doc: &Map) -> bool;
}

fn check_path(root: &Schema, path: &str) -> Result<(), CompileError> {
    match root.get_field(path) {
        Some(_) => Ok(()),
        None => Err(CompileError::UnknownDependencyField(path.to_string())),
    }
}

/// Every listed dotted path must resolve to a non-null value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requires {
    paths: Vec<String>,
}

impl Requires {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

impl Dependency for Requires {
    fn compile(&self, root: &Schema) -> Result<Arc<dyn Predicate>, CompileError> {
        if self.paths.is_empty() {
            return Err(CompileError::Dependency(
                "requires at least one field path".into(),
            ));
        }
        for path in &self.paths {
            check_path(root, path)?;
        }
        Ok(Arc::new(self.clone()))
    }
}

impl Predicate for Requires {
    fn matches(&self, doc: &Map) -> bool {
        self.paths
            .iter()
            .all(|path| lookup(doc, path).is_some_and(|v| !v.is_null()))
    }
}

impl fmt::Display for Requires {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "requires {}", self.paths.join(", "))
    }
}

/// A dotted path must resolve to exactly `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equals {
    path: String,
    value: Value,
}

impl Equals {
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

impl Dependency for Equals {
    fn compile(&self, root: &Schema) -> Result<Arc<dyn Predicate>, CompileError> {
        if self.value.is_tombstone() {
            return Err(CompileError::Dependency(format!(
                "{} cannot be compared to a tombstone",
                self.path
            )));
        }
        check_path(root, &self.path)?;
        Ok(Arc::new(self.clone()))
    }
}

impl Predicate for Equals {
    fn matches(&self, doc: &Map) -> bool {
        lookup(doc, &self.path) == Some(&self.value)
    }
}

impl fmt::Display for Equals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {}", self.path, self.value)
    }
}
