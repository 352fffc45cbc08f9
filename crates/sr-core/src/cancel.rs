//! Cooperative cancellation flag shared between a caller and a request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheap-to-clone cancellation flag.
///
/// The request-handling layer keeps one clone and calls [`cancel`](Self::cancel)
/// when its client goes away; the planner checks it between stages and while
/// waiting on blocking upstream calls.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
