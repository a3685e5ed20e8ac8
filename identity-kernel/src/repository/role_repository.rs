//! # Role Repository Contract

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::permissions::Scope;
use crate::domain::role::Role;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create(&self, ctx: &OperationContext, role: Role) -> KernelResult<Role>;

    async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Option<Role>>;

    async fn get_by_name(&self, ctx: &OperationContext, name: &str, scope: Scope) -> KernelResult<Option<Role>>;

    async fn list(&self, ctx: &OperationContext, scope: Option<Scope>) -> KernelResult<Vec<Role>>;

    async fn update(&self, ctx: &OperationContext, role: Role) -> KernelResult<Role>;

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()>;
}
