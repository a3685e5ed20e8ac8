//! # Tenant Repository Contract

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::tenant::Tenant;

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, ctx: &OperationContext, tenant: Tenant) -> KernelResult<Tenant>;

    async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Option<Tenant>>;

    async fn get_by_name(&self, ctx: &OperationContext, name: &str) -> KernelResult<Option<Tenant>>;

    async fn update(&self, ctx: &OperationContext, tenant: Tenant) -> KernelResult<Tenant>;

    /// Soft-deletes (sets `deleted_at`); never physically removes a tenant.
    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()>;

    async fn list(&self, ctx: &OperationContext, limit: i64, offset: i64) -> KernelResult<Vec<Tenant>>;
}
