//! In-memory [`AssignmentRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::assignment::Assignment;
use crate::domain::permissions::Scope;
use crate::repository::assignment_repository::AssignmentRepository;

type Key = (Uuid, Uuid, &'static str, Option<Uuid>);

fn key(user_id: Uuid, role_id: Uuid, scope: Scope, scope_context_id: Option<Uuid>) -> Key {
    (user_id, role_id, scope.as_str(), scope_context_id)
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryAssignmentRepository {
    assignments: Arc<Mutex<HashMap<Key, Assignment>>>,
}

impl InMemoryAssignmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentRepository {
    async fn grant(&self, ctx: &OperationContext, assignment: Assignment) -> KernelResult<Assignment> {
        ctx.check_cancelled()?;
        let mut assignments = self.assignments.lock().await;
        let k = key(assignment.user_id, assignment.role_id, assignment.scope, assignment.scope_context_id);
        if let Some(existing) = assignments.get(&k) {
            // Repeated grant of the same (user, role, scope, context) is
            // idempotent (spec §8 property 7) - return the existing record
            // rather than creating a duplicate.
            return Ok(existing.clone());
        }
        assignments.insert(k, assignment.clone());
        Ok(assignment)
    }

    async fn revoke(
        &self,
        ctx: &OperationContext,
        user_id: Uuid,
        role_id: Uuid,
        scope: Scope,
        scope_context_id: Option<Uuid>,
    ) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut assignments = self.assignments.lock().await;
        assignments.remove(&key(user_id, role_id, scope, scope_context_id));
        Ok(())
    }

    async fn list_for_user(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<Vec<Assignment>> {
        ctx.check_cancelled()?;
        let assignments = self.assignments.lock().await;
        Ok(assignments.values().filter(|a| a.user_id == user_id).cloned().collect())
    }

    async fn list_by_role(
        &self,
        ctx: &OperationContext,
        role_id: Uuid,
        scope: Scope,
        scope_context_id: Option<Uuid>,
    ) -> KernelResult<Vec<Assignment>> {
        ctx.check_cancelled()?;
        let assignments = self.assignments.lock().await;
        Ok(assignments
            .values()
            .filter(|a| a.role_id == role_id && a.scope == scope && a.scope_context_id == scope_context_id)
            .cloned()
            .collect())
    }

    async fn check_exists(
        &self,
        ctx: &OperationContext,
        user_id: Uuid,
        role_id: Uuid,
        scope: Scope,
        scope_context_id: Option<Uuid>,
    ) -> KernelResult<bool> {
        ctx.check_cancelled()?;
        let assignments = self.assignments.lock().await;
        Ok(assignments.contains_key(&key(user_id, role_id, scope, scope_context_id)))
    }

    async fn delete_by_context_id(&self, ctx: &OperationContext, scope: Scope, scope_context_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut assignments = self.assignments.lock().await;
        assignments.retain(|_, a| !(a.scope == scope && a.scope_context_id == Some(scope_context_id)));
        Ok(())
    }
}
