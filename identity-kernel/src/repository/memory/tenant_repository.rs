//! In-memory [`TenantRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::tenant::Tenant;
use crate::repository::tenant_repository::TenantRepository;

#[derive(Debug, Default, Clone)]
pub struct InMemoryTenantRepository {
    tenants: Arc<Mutex<HashMap<Uuid, Tenant>>>,
}

impl InMemoryTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantRepository for InMemoryTenantRepository {
    async fn create(&self, ctx: &OperationContext, tenant: Tenant) -> KernelResult<Tenant> {
        ctx.check_cancelled()?;
        let mut tenants = self.tenants.lock().await;
        if tenants.values().any(|t| t.name == tenant.name && t.deleted_at.is_none()) {
            return Err(KernelError::already_exists(ResourceKind::Tenant, tenant.name.clone()));
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Option<Tenant>> {
        ctx.check_cancelled()?;
        let tenants = self.tenants.lock().await;
        Ok(tenants.get(&id).filter(|t| t.deleted_at.is_none()).cloned())
    }

    async fn get_by_name(&self, ctx: &OperationContext, name: &str) -> KernelResult<Option<Tenant>> {
        ctx.check_cancelled()?;
        let tenants = self.tenants.lock().await;
        Ok(tenants.values().find(|t| t.name == name && t.deleted_at.is_none()).cloned())
    }

    async fn update(&self, ctx: &OperationContext, mut tenant: Tenant) -> KernelResult<Tenant> {
        ctx.check_cancelled()?;
        let mut tenants = self.tenants.lock().await;
        tenant.updated_at = Utc::now();
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut tenants = self.tenants.lock().await;
        if let Some(tenant) = tenants.get_mut(&id) {
            tenant.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn list(&self, ctx: &OperationContext, limit: i64, offset: i64) -> KernelResult<Vec<Tenant>> {
        ctx.check_cancelled()?;
        let tenants = self.tenants.lock().await;
        let mut all: Vec<Tenant> = tenants.values().filter(|t| t.deleted_at.is_none()).cloned().collect();
        all.sort_by_key(|t| t.created_at);
        Ok(all.into_iter().skip(offset.max(0) as usize).take(limit.max(0) as usize).collect())
    }
}
