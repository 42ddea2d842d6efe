use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag that aborts a running fetch at the next chunk boundary.
///
/// Clones share the flag, so a clone can be handed to another thread
/// (a Ctrl-C handler, say) while the fetch holds the original.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
