//! A minimal cooperative cancellation token.
//!
//! SPEC_FULL.md §5 requires the batch driver to check a caller-supplied
//! cancellation signal between rows and between batch chunks, synchronously
//! (no async runtime). The shape here (`cancel()` / `is_cancelled()` on a
//! cheaply `Clone`-able handle) mirrors `tokio_util::sync::CancellationToken`,
//! used this way elsewhere in the retrieval pack, but is hand-rolled on a bare
//! `AtomicBool` so this crate does not have to pull in an async runtime for a
//! single boolean flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_the_same_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
