// libjensen/src/transfer/cancel.rs

//! Cooperative cancellation for long transfers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    parents: Vec<CancellationToken>,
}

/// Cooperative cancellation flag, checked by the streaming engine between
/// packets.
///
/// A child token also reports cancelled once any ancestor is cancelled;
/// cancelling the child leaves the parent alone. The client keeps one
/// session token per connection and links every caller token to it, so
/// `disconnect()` stops every running transfer.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    /// Fresh token, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled along with `self`, but cancellable on its own.
    pub fn child(&self) -> Self {
        Self::with_parents(vec![self.clone()])
    }

    /// A token cancelled when either `self` or `other` is.
    pub fn linked_with(&self, other: &CancellationToken) -> Self {
        Self::with_parents(vec![self.clone(), other.clone()])
    }

    fn with_parents(parents: Vec<CancellationToken>) -> Self {
        Self {
            state: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                parents,
            }),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once this token or any parent was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
            || self.state.parents.iter().any(|p| p.is_cancelled())
    }
}
