//! # Authorization Service
//!
//! The scoped RBAC permission resolution algorithm (spec §4.4): three
//! levels of scope (platform / tenant / client), a platform-override rule,
//! and wildcard permission handling.

use std::collections::BTreeSet;
use std::sync::Arc;

use kernel_shared::errors::KernelResult;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::assignment::Assignment;
use crate::domain::permissions::Scope;
use crate::repository::assignment_repository::AssignmentRepository;
use crate::repository::project_repository::{ProjectInfo, ProjectRepository};
use crate::repository::role_repository::RoleRepository;

/// Claim set aggregated for a user across every assignment they hold
/// (spec §4.4 "user-info aggregation").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfoClaims {
    pub roles: Vec<String>,
    pub projects: Vec<ProjectInfo>,
}

/// Whether an assignment matches a permission check's `(scope, context)`
/// pair (spec §4.4 step 2). Platform-scoped assignments match
/// unconditionally; anything else must match scope and context exactly.
/// A malformed non-platform assignment with a null context never matches.
fn assignment_matches(assignment: &Assignment, required_scope: Scope, required_context: Option<Uuid>) -> bool {
    if assignment.scope == Scope::Platform {
        return true;
    }
    if !assignment.is_well_formed() {
        return false;
    }
    assignment.scope == required_scope && assignment.scope_context_id == required_context
}

/// Scoped permission resolution service (spec §4.4).
#[derive(Clone)]
pub struct AuthorizationService {
    assignments: Arc<dyn AssignmentRepository>,
    roles: Arc<dyn RoleRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl AuthorizationService {
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        roles: Arc<dyn RoleRepository>,
        projects: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self { assignments, roles, projects }
    }

    /// `has_permission` (spec §4.4): loads every assignment for `user_id`,
    /// keeps the ones matching `(required_scope, required_context)` per
    /// [`assignment_matches`], and returns true as soon as a matching
    /// assignment's role grants `permission` (exact match or wildcard). A
    /// role id an assignment references but that no longer exists is
    /// skipped, not an error.
    pub async fn has_permission(
        &self,
        ctx: &OperationContext,
        user_id: Uuid,
        required_scope: Scope,
        required_context: Option<Uuid>,
        permission: &str,
    ) -> KernelResult<bool> {
        let assignments = self.assignments.list_for_user(ctx, user_id).await?;

        for assignment in assignments.iter().filter(|a| assignment_matches(a, required_scope, required_context)) {
            match self.roles.get_by_id(ctx, assignment.role_id).await? {
                Some(role) if role.grants(permission) => return Ok(true),
                Some(_) => {}
                None => {
                    warn!(role_id = %assignment.role_id, user_id = %user_id, "assignment references a role that no longer exists, skipping");
                }
            }
        }

        Ok(false)
    }

    /// Aggregates the claim set for a user: deduplicated role names across
    /// every assignment, plus projects from the external project
    /// collaborator (spec §4.4 "user-info aggregation").
    pub async fn user_info(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<UserInfoClaims> {
        let assignments = self.assignments.list_for_user(ctx, user_id).await?;

        let mut role_names = BTreeSet::new();
        for assignment in &assignments {
            if let Some(role) = self.roles.get_by_id(ctx, assignment.role_id).await? {
                role_names.insert(role.name);
            } else {
                warn!(role_id = %assignment.role_id, user_id = %user_id, "assignment references a role that no longer exists, skipping");
            }
        }

        let projects = self.projects.list_for_user(ctx, user_id).await?;

        Ok(UserInfoClaims {
            roles: role_names.into_iter().collect(),
            projects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::Role;
    use crate::repository::memory::{InMemoryAssignmentRepository, InMemoryProjectRepository, InMemoryRoleRepository};

    async fn grant(
        assignments: &InMemoryAssignmentRepository,
        roles: &InMemoryRoleRepository,
        ctx: &OperationContext,
        user_id: Uuid,
        scope: Scope,
        context: Option<Uuid>,
        permissions: &[&str],
    ) -> Uuid {
        let role = roles
            .create(
                ctx,
                Role {
                    id: Uuid::now_v7(),
                    name: format!("role-{}", kernel_shared::new_id()),
                    scope,
                    description: None,
                    permissions: permissions.iter().map(|s| s.to_string()).collect(),
                },
            )
            .await
            .unwrap();

        assignments
            .grant(
                ctx,
                Assignment {
                    id: Uuid::now_v7(),
                    user_id,
                    role_id: role.id,
                    scope,
                    scope_context_id: context,
                    granted_at: chrono::Utc::now(),
                    granted_by: None,
                },
            )
            .await
            .unwrap();

        role.id
    }

    fn service(
        assignments: Arc<InMemoryAssignmentRepository>,
        roles: Arc<InMemoryRoleRepository>,
    ) -> AuthorizationService {
        AuthorizationService::new(assignments, roles, Arc::new(InMemoryProjectRepository::new()))
    }

    #[tokio::test]
    async fn platform_assignment_matches_any_scope_and_context() {
        let assignments = Arc::new(InMemoryAssignmentRepository::new());
        let roles = Arc::new(InMemoryRoleRepository::new());
        let ctx = OperationContext::new();
        let user_id = Uuid::now_v7();

        grant(&assignments, &roles, &ctx, user_id, Scope::Platform, None, &["tenant:manage_users"]).await;

        let svc = service(assignments, roles);
        let tenant_id = Uuid::now_v7();
        assert!(svc
            .has_permission(&ctx, user_id, Scope::Tenant, Some(tenant_id), "tenant:manage_users")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn tenant_assignment_requires_matching_context() {
        let assignments = Arc::new(InMemoryAssignmentRepository::new());
        let roles = Arc::new(InMemoryRoleRepository::new());
        let ctx = OperationContext::new();
        let user_id = Uuid::now_v7();
        let tenant_id = Uuid::now_v7();
        let other_tenant_id = Uuid::now_v7();

        grant(&assignments, &roles, &ctx, user_id, Scope::Tenant, Some(tenant_id), &["tenant:read"]).await;

        let svc = service(assignments, roles);
        assert!(svc.has_permission(&ctx, user_id, Scope::Tenant, Some(tenant_id), "tenant:read").await.unwrap());
        assert!(!svc
            .has_permission(&ctx, user_id, Scope::Tenant, Some(other_tenant_id), "tenant:read")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn wildcard_permission_satisfies_any_check() {
        let assignments = Arc::new(InMemoryAssignmentRepository::new());
        let roles = Arc::new(InMemoryRoleRepository::new());
        let ctx = OperationContext::new();
        let user_id = Uuid::now_v7();
        let tenant_id = Uuid::now_v7();

        grant(&assignments, &roles, &ctx, user_id, Scope::Tenant, Some(tenant_id), &["*"]).await;

        let svc = service(assignments, roles);
        assert!(svc.has_permission(&ctx, user_id, Scope::Tenant, Some(tenant_id), "anything:at_all").await.unwrap());
    }

    #[tokio::test]
    async fn no_matching_assignment_returns_false() {
        let assignments = Arc::new(InMemoryAssignmentRepository::new());
        let roles = Arc::new(InMemoryRoleRepository::new());
        let ctx = OperationContext::new();
        let svc = service(assignments, roles);

        assert!(!svc
            .has_permission(&ctx, Uuid::now_v7(), Scope::Tenant, Some(Uuid::now_v7()), "tenant:read")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn user_info_aggregates_deduplicated_role_names() {
        let assignments = Arc::new(InMemoryAssignmentRepository::new());
        let roles = Arc::new(InMemoryRoleRepository::new());
        let ctx = OperationContext::new();
        let user_id = Uuid::now_v7();
        let tenant_a = Uuid::now_v7();
        let tenant_b = Uuid::now_v7();

        grant(&assignments, &roles, &ctx, user_id, Scope::Tenant, Some(tenant_a), &["tenant:read"]).await;
        grant(&assignments, &roles, &ctx, user_id, Scope::Tenant, Some(tenant_b), &["tenant:read"]).await;

        let svc = service(assignments, roles);
        let claims = svc.user_info(&ctx, user_id).await.unwrap();
        assert_eq!(claims.roles.len(), 2);
    }
}
