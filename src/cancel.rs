use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between a caller and hashing workers.
///
/// Workers check it before every buffer read, so a bulk run stops within one
/// read of `cancel()` being called.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    /// Set once, never cleared
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every operation holding a clone of this token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
