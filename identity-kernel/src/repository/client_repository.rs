//! # OAuth2 Client Repository Contract

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::client::OAuth2Client;

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, ctx: &OperationContext, client: OAuth2Client) -> KernelResult<OAuth2Client>;

    async fn get_by_client_id(&self, ctx: &OperationContext, tenant_id: Uuid, client_id: &str) -> KernelResult<Option<OAuth2Client>>;

    async fn get_by_id(&self, ctx: &OperationContext, tenant_id: Uuid, id: Uuid) -> KernelResult<Option<OAuth2Client>>;

    async fn update(&self, ctx: &OperationContext, client: OAuth2Client) -> KernelResult<OAuth2Client>;

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()>;

    async fn list_by_owner(&self, ctx: &OperationContext, owner_user_id: Uuid) -> KernelResult<Vec<OAuth2Client>>;

    async fn list_by_tenant(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<Vec<OAuth2Client>>;

    /// Soft-deletes every client owned by a tenant - part of the deletion
    /// cascade (spec §4.5 `delete_tenant` step 2).
    async fn delete_by_tenant_id(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<()>;
}
