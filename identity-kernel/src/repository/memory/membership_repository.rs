//! In-memory [`MembershipRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kernel_shared::errors::KernelResult;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::membership::Membership;
use crate::repository::membership_repository::MembershipRepository;

#[derive(Debug, Default, Clone)]
pub struct InMemoryMembershipRepository {
    memberships: Arc<Mutex<HashMap<(Uuid, Uuid), Membership>>>,
}

impl InMemoryMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn add_member(&self, ctx: &OperationContext, tenant_id: Uuid, user_id: Uuid) -> KernelResult<Membership> {
        ctx.check_cancelled()?;
        let mut memberships = self.memberships.lock().await;
        let key = (tenant_id, user_id);
        if let Some(existing) = memberships.get(&key) {
            return Ok(existing.clone());
        }
        let membership = Membership {
            id: kernel_shared::new_id(),
            tenant_id,
            user_id,
            created_at: Utc::now(),
        };
        memberships.insert(key, membership.clone());
        Ok(membership)
    }

    async fn remove_member(&self, ctx: &OperationContext, tenant_id: Uuid, user_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut memberships = self.memberships.lock().await;
        memberships.remove(&(tenant_id, user_id));
        Ok(())
    }

    async fn list_members(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<Vec<Membership>> {
        ctx.check_cancelled()?;
        let memberships = self.memberships.lock().await;
        Ok(memberships.values().filter(|m| m.tenant_id == tenant_id).cloned().collect())
    }

    async fn check_membership(&self, ctx: &OperationContext, tenant_id: Uuid, user_id: Uuid) -> KernelResult<bool> {
        ctx.check_cancelled()?;
        let memberships = self.memberships.lock().await;
        Ok(memberships.contains_key(&(tenant_id, user_id)))
    }

    async fn delete_by_tenant_id(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut memberships = self.memberships.lock().await;
        memberships.retain(|(t, _), _| *t != tenant_id);
        Ok(())
    }
}
