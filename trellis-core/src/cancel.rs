//! Cooperative cancellation for long-running dynamic programs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{Result, TrellisError};

/// A cloneable flag shared between a running computation and its owner.
///
/// The computation polls [`checkpoint`](Self::checkpoint) at safe points
/// (one per trellis column); once [`cancel`](Self::cancel) has been called the
/// next checkpoint fails with [`TrellisError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Fail with [`TrellisError::Cancelled`] if cancellation was requested.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(TrellisError::Cancelled)
        } else {
            Ok(())
        }
    }
}
