//! # Tenant Orchestrator
//!
//! The most transactionally complex component (spec §4.5): tenant
//! creation with owner provisioning, role assignment, self-revocation
//! protection, and the cascaded soft-deletion of a tenant and everything
//! scoped to it.
//!
//! ## On the "dual write" and "legacy tenant-role mapping"
//!
//! spec §9 flags the source corpus's overlapping role/assignment
//! contracts as accidental complexity this kernel deliberately does not
//! reproduce - it ships exactly one assignment contract (see
//! `crate::repository::assignment_repository`). `assign_role`'s dual
//! write therefore collapses to the single generic-assignment write
//! below; there is no separate legacy table to keep in sync.

use std::sync::Arc;

use chrono::Utc;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use tracing::info;
use uuid::Uuid;

use crate::audit::{AuditEventType, AuditLogger, NewAuditEvent};
use crate::context::OperationContext;
use crate::domain::assignment::Assignment;
use crate::domain::identity::ProfileInput;
use crate::domain::permissions::Scope;
use crate::domain::tenant::{Tenant, TenantStatus, TENANT_NAME_MAX_LEN, TENANT_NAME_MIN_LEN};
use crate::repository::assignment_repository::AssignmentRepository;
use crate::repository::client_repository::ClientRepository;
use crate::repository::membership_repository::MembershipRepository;
use crate::repository::tenant_repository::TenantRepository;
use crate::seed;
use crate::service::identity_service::IdentityService;

fn validate_tenant_name(name: &str) -> KernelResult<String> {
    let trimmed = name.trim().to_string();
    if !(TENANT_NAME_MIN_LEN..=TENANT_NAME_MAX_LEN).contains(&trimmed.len()) {
        return Err(KernelError::invalid_input(format!(
            "tenant name must be between {TENANT_NAME_MIN_LEN} and {TENANT_NAME_MAX_LEN} characters"
        )));
    }
    Ok(trimmed)
}

/// Tenant lifecycle orchestration service (spec §4.5).
#[derive(Clone)]
pub struct TenantOrchestrator {
    tenants: Arc<dyn TenantRepository>,
    memberships: Arc<dyn MembershipRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    clients: Arc<dyn ClientRepository>,
    identity_service: Arc<IdentityService>,
    audit: AuditLogger,
}

impl TenantOrchestrator {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        memberships: Arc<dyn MembershipRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        clients: Arc<dyn ClientRepository>,
        identity_service: Arc<IdentityService>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            tenants,
            memberships,
            assignments,
            clients,
            identity_service,
            audit,
        }
    }

    /// Returns the identity service this orchestrator provisions tenant
    /// owners through, for callers that need to resolve an owner's
    /// identity after creation.
    pub fn identity_service(&self) -> &IdentityService {
        &self.identity_service
    }

    pub fn tenants(&self) -> &Arc<dyn TenantRepository> {
        &self.tenants
    }

    pub fn memberships(&self) -> &Arc<dyn MembershipRepository> {
        &self.memberships
    }

    pub fn assignments(&self) -> &Arc<dyn AssignmentRepository> {
        &self.assignments
    }

    /// `create_tenant` (spec §4.5). Resolves or provisions the owner
    /// identity first so the tenant is never persisted without a
    /// resolvable owner when one was requested.
    pub async fn create_tenant(
        &self,
        ctx: &OperationContext,
        name: &str,
        owner_email: Option<&str>,
        owner_password: Option<&str>,
        creator_user_id: Uuid,
    ) -> KernelResult<Tenant> {
        let name = validate_tenant_name(name)?;

        if self.tenants.get_by_name(ctx, &name).await?.is_some() {
            return Err(KernelError::already_exists(ResourceKind::Tenant, name));
        }

        let owner_id = match owner_email {
            Some(email) => {
                let identity = match self.identity_service.get_by_email(ctx, email).await {
                    Ok(identity) => identity,
                    Err(KernelError::NotFound { .. }) => {
                        self.identity_service.provision(ctx, email, ProfileInput::default()).await?
                    }
                    Err(e) => return Err(e),
                };
                if let Some(password) = owner_password {
                    self.identity_service.set_password(ctx, identity.id, password).await?;
                }
                Some(identity.id)
            }
            None => None,
        };

        ctx.check_cancelled()?;

        let now = Utc::now();
        let tenant = Tenant {
            id: kernel_shared::new_id(),
            name: name.clone(),
            status: TenantStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let created = self.tenants.create(ctx, tenant).await?;

        if let Some(owner_id) = owner_id {
            self.assign_role(ctx, created.id, owner_id, seed::TENANT_OWNER, creator_user_id).await?;
        }

        info!(tenant_id = %created.id, tenant_name = %created.name, "tenant created");
        let mut event = NewAuditEvent::new(AuditEventType::TenantCreated)
            .tenant(created.id)
            .metadata("tenant_id", created.id.to_string())
            .metadata("tenant_name", created.name.clone());
        if let Some(owner_id) = owner_id {
            event = event.metadata("owner_id", owner_id.to_string());
        }
        self.audit.log(ctx, event).await;

        Ok(created)
    }

    /// `assign_role` (spec §4.5). `role_name` must be one of the three
    /// seeded tenant-scope roles.
    pub async fn assign_role(
        &self,
        ctx: &OperationContext,
        tenant_id: Uuid,
        user_id: Uuid,
        role_name: &str,
        granted_by: Uuid,
    ) -> KernelResult<()> {
        let role_id = seed::role_id_for_name(role_name)
            .ok_or_else(|| KernelError::invalid_input(format!("unknown tenant role: {role_name}")))?;

        self.assignments
            .grant(
                ctx,
                Assignment {
                    id: kernel_shared::new_id(),
                    user_id,
                    role_id,
                    scope: Scope::Tenant,
                    scope_context_id: Some(tenant_id),
                    granted_at: Utc::now(),
                    granted_by: Some(granted_by),
                },
            )
            .await?;

        ctx.check_cancelled()?;
        self.memberships.add_member(ctx, tenant_id, user_id).await?;

        let actor_name = match self.identity_service.get_by_id(ctx, granted_by).await {
            Ok(identity) => identity
                .full_name
                .or(identity.email_plain)
                .unwrap_or_else(|| granted_by.to_string()),
            Err(_) => granted_by.to_string(),
        };

        info!(tenant_id = %tenant_id, user_id = %user_id, role = %role_name, "role assigned");
        self.audit
            .log(
                ctx,
                NewAuditEvent::new(AuditEventType::RoleAssigned)
                    .tenant(tenant_id)
                    .actor(granted_by)
                    .actor_name(actor_name)
                    .target(user_id, role_name)
                    .metadata("role", role_name),
            )
            .await;

        Ok(())
    }

    /// `revoke_role` (spec §4.5). Rejects an owner's attempt to revoke
    /// their own ownership, preventing an orphaned tenant.
    pub async fn revoke_role(
        &self,
        ctx: &OperationContext,
        tenant_id: Uuid,
        user_id: Uuid,
        role_name: &str,
        actor_id: Uuid,
    ) -> KernelResult<()> {
        if user_id == actor_id && role_name == seed::TENANT_OWNER {
            return Err(KernelError::security_violation(
                "owners cannot revoke their own ownership",
            ));
        }

        let role_id = seed::role_id_for_name(role_name)
            .ok_or_else(|| KernelError::invalid_input(format!("unknown tenant role: {role_name}")))?;

        self.assignments.revoke(ctx, user_id, role_id, Scope::Tenant, Some(tenant_id)).await?;

        info!(tenant_id = %tenant_id, user_id = %user_id, role = %role_name, "role revoked");
        self.audit
            .log(
                ctx,
                NewAuditEvent::new(AuditEventType::RoleRevoked)
                    .tenant(tenant_id)
                    .actor(actor_id)
                    .target(user_id, role_name)
                    .metadata("role", role_name),
            )
            .await;

        Ok(())
    }

    /// `delete_tenant` (spec §4.5): a cascaded, sequential, idempotent
    /// soft-deletion. Each step is a separate store operation; a failure
    /// aborts remaining steps (spec §9 records this as not a single
    /// transaction, by design - every step is safe to re-run).
    pub async fn delete_tenant(&self, ctx: &OperationContext, tenant_id: Uuid, actor_id: Uuid) -> KernelResult<()> {
        self.memberships.delete_by_tenant_id(ctx, tenant_id).await?;
        ctx.check_cancelled()?;

        self.clients.delete_by_tenant_id(ctx, tenant_id).await?;
        ctx.check_cancelled()?;

        // Legacy tenant-role records: folded into the assignment deletion
        // below (see module doc) since this kernel has no separate legacy
        // store to clear.
        self.assignments.delete_by_context_id(ctx, Scope::Tenant, tenant_id).await?;
        ctx.check_cancelled()?;

        self.tenants.delete(ctx, tenant_id).await?;

        info!(tenant_id = %tenant_id, actor_id = %actor_id, "tenant deleted");
        self.audit
            .log(
                ctx,
                NewAuditEvent::new(AuditEventType::TenantDeleted)
                    .tenant(tenant_id)
                    .actor(actor_id)
                    .metadata("tenant_id", tenant_id.to_string()),
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_shared::config::Argon2Config;
    use kernel_shared::crypto::password::PasswordHasher;
    use crate::repository::memory::{
        InMemoryAssignmentRepository, InMemoryAuditRepository, InMemoryClientRepository,
        InMemoryIdentityRepository, InMemoryMembershipRepository, InMemoryTenantRepository,
    };

    fn orchestrator() -> TenantOrchestrator {
        let audit = AuditLogger::new(Arc::new(InMemoryAuditRepository::new()));
        let identity_service = Arc::new(IdentityService::new(
            Arc::new(InMemoryIdentityRepository::new()),
            Arc::new(PasswordHasher::new(&Argon2Config::default())),
            audit.clone(),
            b"test-key".to_vec(),
            5,
            chrono::Duration::minutes(15),
        ));
        TenantOrchestrator::new(
            Arc::new(InMemoryTenantRepository::new()),
            Arc::new(InMemoryMembershipRepository::new()),
            Arc::new(InMemoryAssignmentRepository::new()),
            Arc::new(InMemoryClientRepository::new()),
            identity_service,
            audit,
        )
    }

    #[tokio::test]
    async fn create_tenant_provisions_owner_and_assigns_ownership() {
        let orch = orchestrator();
        let ctx = OperationContext::new();
        let creator = Uuid::now_v7();

        let tenant = orch
            .create_tenant(&ctx, "Acme Corp", Some("owner@acme.test"), Some("owner-password"), creator)
            .await
            .unwrap();

        let owner = orch.identity_service.get_by_email(&ctx, "owner@acme.test").await.unwrap();
        assert!(orch
            .assignments
            .check_exists(
                &ctx,
                owner.id,
                seed::seeded_role_id(seed::TENANT_OWNER),
                Scope::Tenant,
                Some(tenant.id)
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn create_tenant_rejects_duplicate_name() {
        let orch = orchestrator();
        let ctx = OperationContext::new();
        orch.create_tenant(&ctx, "Acme Corp", None, None, Uuid::now_v7()).await.unwrap();

        let err = orch.create_tenant(&ctx, "Acme Corp", None, None, Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, KernelError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn create_tenant_rejects_short_name() {
        let orch = orchestrator();
        let ctx = OperationContext::new();
        assert!(orch.create_tenant(&ctx, "ab", None, None, Uuid::now_v7()).await.is_err());
    }

    #[tokio::test]
    async fn owner_cannot_revoke_their_own_ownership() {
        let orch = orchestrator();
        let ctx = OperationContext::new();
        let creator = Uuid::now_v7();
        let tenant = orch
            .create_tenant(&ctx, "Acme Corp", Some("owner2@acme.test"), None, creator)
            .await
            .unwrap();
        let owner = orch.identity_service.get_by_email(&ctx, "owner2@acme.test").await.unwrap();

        let err = orch
            .revoke_role(&ctx, tenant.id, owner.id, seed::TENANT_OWNER, owner.id)
            .await
            .unwrap_err();
        assert!(matches!(err, KernelError::SecurityViolation { .. }));
    }

    #[tokio::test]
    async fn delete_tenant_cascades_memberships_clients_and_assignments() {
        let orch = orchestrator();
        let ctx = OperationContext::new();
        let creator = Uuid::now_v7();
        let tenant = orch
            .create_tenant(&ctx, "Acme Corp", Some("owner3@acme.test"), None, creator)
            .await
            .unwrap();
        let owner = orch.identity_service.get_by_email(&ctx, "owner3@acme.test").await.unwrap();

        orch.delete_tenant(&ctx, tenant.id, creator).await.unwrap();

        assert!(!orch.memberships.check_membership(&ctx, tenant.id, owner.id).await.unwrap());
        assert!(!orch
            .assignments
            .check_exists(&ctx, owner.id, seed::seeded_role_id(seed::TENANT_OWNER), Scope::Tenant, Some(tenant.id))
            .await
            .unwrap());
        assert!(orch.tenants.get_by_id(&ctx, tenant.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_tenant_is_idempotent() {
        let orch = orchestrator();
        let ctx = OperationContext::new();
        let tenant = orch.create_tenant(&ctx, "Acme Corp", None, None, Uuid::now_v7()).await.unwrap();

        orch.delete_tenant(&ctx, tenant.id, Uuid::now_v7()).await.unwrap();
        orch.delete_tenant(&ctx, tenant.id, Uuid::now_v7()).await.unwrap();
    }
}
