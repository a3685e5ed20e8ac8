//! In-memory [`RoleRepository`], pre-seeded with the well-known tenant roles.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::permissions::Scope;
use crate::domain::role::Role;
use crate::repository::role_repository::RoleRepository;
use crate::seed::seeded_tenant_roles;

#[derive(Debug, Clone)]
pub struct InMemoryRoleRepository {
    roles: Arc<Mutex<HashMap<Uuid, Role>>>,
}

impl InMemoryRoleRepository {
    /// Starts empty - use [`Self::seeded`] to pre-populate the well-known
    /// tenant roles, the way a fresh deployment's migrations would.
    pub fn new() -> Self {
        Self {
            roles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn seeded() -> Self {
        let repo = Self::new();
        let mut roles = repo.roles.lock().await;
        for role in seeded_tenant_roles() {
            roles.insert(role.id, role);
        }
        drop(roles);
        repo
    }
}

impl Default for InMemoryRoleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn create(&self, ctx: &OperationContext, role: Role) -> KernelResult<Role> {
        ctx.check_cancelled()?;
        let mut roles = self.roles.lock().await;
        roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Option<Role>> {
        ctx.check_cancelled()?;
        let roles = self.roles.lock().await;
        Ok(roles.get(&id).cloned())
    }

    async fn get_by_name(&self, ctx: &OperationContext, name: &str, scope: Scope) -> KernelResult<Option<Role>> {
        ctx.check_cancelled()?;
        let roles = self.roles.lock().await;
        Ok(roles.values().find(|r| r.name == name && r.scope == scope).cloned())
    }

    async fn list(&self, ctx: &OperationContext, scope: Option<Scope>) -> KernelResult<Vec<Role>> {
        ctx.check_cancelled()?;
        let roles = self.roles.lock().await;
        Ok(roles
            .values()
            .filter(|r| scope.map(|s| r.scope == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn update(&self, ctx: &OperationContext, role: Role) -> KernelResult<Role> {
        ctx.check_cancelled()?;
        let mut roles = self.roles.lock().await;
        roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut roles = self.roles.lock().await;
        roles.remove(&id);
        Ok(())
    }
}
