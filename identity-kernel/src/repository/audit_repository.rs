//! # Audit Repository Contract

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;

use crate::audit::event::{AuditEvent, AuditFilter};
use crate::context::OperationContext;

/// The persistence half of [`crate::audit::AuditLogger`]'s dual sink. Never
/// deletes: audit events are append-only (spec §3).
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn log(&self, ctx: &OperationContext, event: AuditEvent) -> KernelResult<()>;

    /// Lists events matching `filter`, paginated, alongside the total
    /// matching count (spec §4.7 "Listing").
    async fn list(&self, ctx: &OperationContext, filter: AuditFilter) -> KernelResult<(Vec<AuditEvent>, i64)>;
}
