//! # Assignment Repository Contract

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::assignment::Assignment;
use crate::domain::permissions::Scope;

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Grants a role; idempotent under the store's uniqueness constraint
    /// on `(user, role, scope, scope_context)` - a repeat grant is not an
    /// error (spec §8 property 7).
    async fn grant(&self, ctx: &OperationContext, assignment: Assignment) -> KernelResult<Assignment>;

    async fn revoke(
        &self,
        ctx: &OperationContext,
        user_id: Uuid,
        role_id: Uuid,
        scope: Scope,
        scope_context_id: Option<Uuid>,
    ) -> KernelResult<()>;

    async fn list_for_user(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<Vec<Assignment>>;

    async fn list_by_role(
        &self,
        ctx: &OperationContext,
        role_id: Uuid,
        scope: Scope,
        scope_context_id: Option<Uuid>,
    ) -> KernelResult<Vec<Assignment>>;

    async fn check_exists(
        &self,
        ctx: &OperationContext,
        user_id: Uuid,
        role_id: Uuid,
        scope: Scope,
        scope_context_id: Option<Uuid>,
    ) -> KernelResult<bool>;

    /// Removes every assignment matching `(scope, scope_context_id)` -
    /// used by the tenant deletion cascade to drop all tenant-scoped
    /// assignments for the deleted tenant (spec §4.5 `delete_tenant` step 4).
    async fn delete_by_context_id(&self, ctx: &OperationContext, scope: Scope, scope_context_id: Uuid) -> KernelResult<()>;
}
