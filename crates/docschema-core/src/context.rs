//! # Request Context
//!
//! [`Context`] is the request-scoped handle passed unchanged to every hook
//! invocation during `prepare`. The engine never reads it; hooks use it to
//! correlate log lines and to honour cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

/// Request-scoped handle with an id and a cooperative cancellation flag.
///
/// Clones share the cancellation flag, so cancelling any clone is observed
/// by all of them.
#[derive(Debug, Clone)]
pub struct Context {
    request_id: Uuid,
    cancelled: Arc<AtomicBool>,
}

impl Context {
    /// Create a context with a fresh random request id.
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4())
    }

    /// Create a context bound to an existing request id.
    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            request_id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Signal cancellation to every clone of this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
