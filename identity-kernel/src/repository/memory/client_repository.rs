//! In-memory [`ClientRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kernel_shared::errors::KernelResult;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::client::OAuth2Client;
use crate::repository::client_repository::ClientRepository;

#[derive(Debug, Default, Clone)]
pub struct InMemoryClientRepository {
    clients: Arc<Mutex<HashMap<Uuid, OAuth2Client>>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn create(&self, ctx: &OperationContext, client: OAuth2Client) -> KernelResult<OAuth2Client> {
        ctx.check_cancelled()?;
        let mut clients = self.clients.lock().await;
        clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn get_by_client_id(&self, ctx: &OperationContext, tenant_id: Uuid, client_id: &str) -> KernelResult<Option<OAuth2Client>> {
        ctx.check_cancelled()?;
        let clients = self.clients.lock().await;
        Ok(clients
            .values()
            .find(|c| c.tenant_id == tenant_id && c.client_id == client_id && c.deleted_at.is_none())
            .cloned())
    }

    async fn get_by_id(&self, ctx: &OperationContext, tenant_id: Uuid, id: Uuid) -> KernelResult<Option<OAuth2Client>> {
        ctx.check_cancelled()?;
        let clients = self.clients.lock().await;
        Ok(clients
            .get(&id)
            .filter(|c| c.tenant_id == tenant_id && c.deleted_at.is_none())
            .cloned())
    }

    async fn update(&self, ctx: &OperationContext, mut client: OAuth2Client) -> KernelResult<OAuth2Client> {
        ctx.check_cancelled()?;
        let mut clients = self.clients.lock().await;
        client.updated_at = Utc::now();
        clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get_mut(&id) {
            client.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn list_by_owner(&self, ctx: &OperationContext, owner_user_id: Uuid) -> KernelResult<Vec<OAuth2Client>> {
        ctx.check_cancelled()?;
        let clients = self.clients.lock().await;
        Ok(clients
            .values()
            .filter(|c| c.owner_user_id == Some(owner_user_id) && c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn list_by_tenant(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<Vec<OAuth2Client>> {
        ctx.check_cancelled()?;
        let clients = self.clients.lock().await;
        Ok(clients
            .values()
            .filter(|c| c.tenant_id == tenant_id && c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn delete_by_tenant_id(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut clients = self.clients.lock().await;
        let now = Utc::now();
        for client in clients.values_mut().filter(|c| c.tenant_id == tenant_id) {
            client.deleted_at = Some(now);
        }
        Ok(())
    }
}
