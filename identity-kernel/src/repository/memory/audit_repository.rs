//! In-memory [`AuditRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use tokio::sync::Mutex;

use crate::audit::event::{AuditEvent, AuditFilter};
use crate::context::OperationContext;
use crate::repository::audit_repository::AuditRepository;

#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditRepository {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn log(&self, ctx: &OperationContext, event: AuditEvent) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut events = self.events.lock().await;
        events.push(event);
        Ok(())
    }

    async fn list(&self, ctx: &OperationContext, filter: AuditFilter) -> KernelResult<(Vec<AuditEvent>, i64)> {
        ctx.check_cancelled()?;
        let events = self.events.lock().await;
        let matching: Vec<AuditEvent> = events
            .iter()
            .filter(|e| filter.tenant_id.map(|t| e.tenant_id == Some(t)).unwrap_or(true))
            .filter(|e| filter.actor_id.map(|a| e.actor_id == Some(a)).unwrap_or(true))
            .filter(|e| filter.event_type.map(|t| e.event_type == t).unwrap_or(true))
            .filter(|e| filter.from.map(|from| e.occurred_at >= from).unwrap_or(true))
            .filter(|e| filter.to.map(|to| e.occurred_at <= to).unwrap_or(true))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(if filter.limit > 0 { filter.limit as usize } else { usize::MAX })
            .collect();
        Ok((page, total))
    }
}
