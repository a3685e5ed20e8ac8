//! # Membership Repository Contract

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::membership::Membership;

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Adds a member; ignores a uniqueness conflict on `(tenant_id,
    /// user_id)` rather than erroring, so the orchestrator's `assign_role`
    /// can call this unconditionally (spec §4.5 step 3).
    async fn add_member(&self, ctx: &OperationContext, tenant_id: Uuid, user_id: Uuid) -> KernelResult<Membership>;

    async fn remove_member(&self, ctx: &OperationContext, tenant_id: Uuid, user_id: Uuid) -> KernelResult<()>;

    async fn list_members(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<Vec<Membership>>;

    async fn check_membership(&self, ctx: &OperationContext, tenant_id: Uuid, user_id: Uuid) -> KernelResult<bool>;

    /// Physically removes every membership for a tenant - part of the
    /// deletion cascade (spec §4.5 `delete_tenant` step 1).
    async fn delete_by_tenant_id(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<()>;
}
