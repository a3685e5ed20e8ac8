//! # Operation Context
//!
//! Every repository method and every service operation in this crate takes
//! an [`OperationContext`] as its first argument. It carries the two things
//! a caller-invoked, possibly-cancelled, possibly-long-running operation
//! needs that don't belong on any individual domain type: a request id for
//! log/audit correlation, and a cooperative cancellation flag.
//!
//! There is no deadline/timeout field - the kernel is store-agnostic and
//! leaves timeout enforcement to the caller's async runtime (`tokio::time::
//! timeout` around a service call) rather than threading a `Duration`
//! through every repository trait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use kernel_shared::errors::KernelError;

/// Carries request-scoped metadata and a cooperative cancellation signal
/// through a service operation and the repository calls it makes.
///
/// Cloning an `OperationContext` is cheap - the cancellation flag is shared
/// (`Arc<AtomicBool>`), so cancelling one clone cancels every clone derived
/// from the same originating call.
#[derive(Debug, Clone)]
pub struct OperationContext {
    request_id: Uuid,
    cancelled: Arc<AtomicBool>,
}

impl OperationContext {
    /// Starts a fresh context with a newly generated request id.
    pub fn new() -> Self {
        Self {
            request_id: kernel_shared::new_id(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Starts a context carrying an existing request id, e.g. one received
    /// from an upstream transport plane for cross-system correlation.
    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            request_id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The request id to attach to logs and audit events emitted while this
    /// context is in scope.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Signals cancellation. Visible to every clone sharing this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been signalled.
    pub fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns [`KernelError::Cancelled`] if cancellation has been
    /// signalled, `Ok(())` otherwise. Services call this between
    /// repository round-trips in multi-step operations (the tenant
    /// deletion cascade, role assignment dual-write) so a cancelled caller
    /// doesn't keep paying for store round-trips it no longer wants.
    pub fn check_cancelled(&self) -> Result<(), KernelError> {
        if self.cancelled() {
            Err(KernelError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_not_cancelled() {
        let ctx = OperationContext::new();
        assert!(!ctx.cancelled());
        assert!(ctx.check_cancelled().is_ok());
    }

    #[test]
    fn cancellation_is_visible_across_clones() {
        let ctx = OperationContext::new();
        let clone = ctx.clone();
        ctx.cancel();
        assert!(clone.cancelled());
        assert!(matches!(
            clone.check_cancelled(),
            Err(KernelError::Cancelled)
        ));
    }

    #[test]
    fn with_request_id_preserves_the_given_id() {
        let id = Uuid::now_v7();
        let ctx = OperationContext::with_request_id(id);
        assert_eq!(ctx.request_id(), id);
    }
}
