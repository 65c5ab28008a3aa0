//! Scoped exit finalizer.
use std::sync::Arc;

use super::types::Log;

/// Emits one final INFO line when dropped.
///
/// Create exactly one per run, before any fallible work, and keep it alive
/// until the exit code has been decided; `Drop` runs on normal completion,
/// early returns, and fatal-error paths alike.
pub struct ExitNotice {
    log: Arc<dyn Log>,
    message: String,
}

impl std::fmt::Debug for ExitNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExitNotice")
            .field("log", &"<dyn Log>")
            .field("message", &self.message)
            .finish()
    }
}

impl ExitNotice {
    /// Register the finalizer.
    #[must_use]
    pub fn new(log: Arc<dyn Log>, message: impl Into<String>) -> Self {
        Self {
            log,
            message: message.into(),
        }
    }
}

impl Drop for ExitNotice {
    fn drop(&mut self) {
        self.log.info(&self.message);
    }
}
