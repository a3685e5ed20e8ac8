//! End-to-end scenarios exercising the service layer against the
//! in-memory repository implementations: one per named testable
//! property.

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use identity_kernel::audit::AuditLogger;
use identity_kernel::context::OperationContext;
use identity_kernel::domain::permissions::{validate_oidc_scopes, Scope};
use identity_kernel::domain::role::Role;
use identity_kernel::domain::assignment::Assignment;
use identity_kernel::domain::identity::ProfileInput;
use identity_kernel::repository::assignment_repository::AssignmentRepository;
use identity_kernel::repository::membership_repository::MembershipRepository;
use identity_kernel::repository::memory::{
    InMemoryAssignmentRepository, InMemoryAuditRepository, InMemoryClientRepository,
    InMemoryIdentityRepository, InMemoryMembershipRepository, InMemoryProjectRepository,
    InMemoryRoleRepository, InMemoryTenantRepository,
};
use identity_kernel::repository::role_repository::RoleRepository;
use identity_kernel::repository::tenant_repository::TenantRepository;
use identity_kernel::seed;
use identity_kernel::service::{AuthorizationService, IdentityService, TenantOrchestrator};
use kernel_shared::config::Argon2Config;
use kernel_shared::crypto::password::PasswordHasher;
use kernel_shared::errors::KernelError;
use uuid::Uuid;

const HMAC_KEY: &[u8] = b"test-key";

fn identity_service() -> IdentityService {
    IdentityService::new(
        Arc::new(InMemoryIdentityRepository::new()),
        Arc::new(PasswordHasher::new(&Argon2Config::default())),
        AuditLogger::new(Arc::new(InMemoryAuditRepository::new())),
        HMAC_KEY.to_vec(),
        3,
        ChronoDuration::minutes(15),
    )
}

/// E1 - Provision + Authenticate: lockout triggers after the third
/// consecutive failure and a successful login never follows it.
#[tokio::test]
async fn e1_provision_authenticate_and_lockout() {
    let svc = identity_service();
    let ctx = OperationContext::new();

    let identity = svc
        .provision(&ctx, "User@Example.Com ", ProfileInput { given_name: Some("Test".into()), ..Default::default() })
        .await
        .unwrap();
    let expected_hash = kernel_shared::crypto::email_hash::email_hash(HMAC_KEY, "User@Example.Com ");
    assert_eq!(identity.email_hash, expected_hash);
    assert_eq!(identity.nickname.as_deref(), Some("user"));

    svc.add_password(&ctx, identity.id, "secure-password").await.unwrap();

    let authenticated = svc.authenticate(&ctx, "user@example.com", "secure-password").await.unwrap();
    assert_eq!(authenticated.id, identity.id);

    for _ in 0..2 {
        assert!(matches!(
            svc.authenticate(&ctx, "user@example.com", "wrong").await.unwrap_err(),
            KernelError::InvalidCredentials
        ));
    }
    // Third consecutive failure trips the lock (max_attempts = 3).
    assert!(matches!(
        svc.authenticate(&ctx, "user@example.com", "wrong").await.unwrap_err(),
        KernelError::InvalidCredentials
    ));

    let locked = svc.get_by_id(&ctx, identity.id).await.unwrap();
    assert!(locked.locked_until.is_some());

    // A correct password no longer succeeds while locked.
    assert!(matches!(
        svc.authenticate(&ctx, "user@example.com", "secure-password").await.unwrap_err(),
        KernelError::AccountLocked { .. }
    ));
}

fn authorization_service() -> (
    AuthorizationService,
    Arc<InMemoryAssignmentRepository>,
    Arc<InMemoryRoleRepository>,
) {
    let assignments = Arc::new(InMemoryAssignmentRepository::new());
    let roles = Arc::new(InMemoryRoleRepository::new());
    let projects = Arc::new(InMemoryProjectRepository::new());
    (
        AuthorizationService::new(assignments.clone(), roles.clone(), projects),
        assignments,
        roles,
    )
}

/// E2 - Platform admin override: a platform-scoped wildcard role passes
/// every check regardless of the requested scope or context.
#[tokio::test]
async fn e2_platform_admin_override() {
    let (svc, assignments, roles) = authorization_service();
    let ctx = OperationContext::new();
    let admin = roles
        .create(
            &ctx,
            Role {
                id: Uuid::now_v7(),
                name: "admin".into(),
                scope: Scope::Platform,
                description: None,
                permissions: vec!["*".into()],
            },
        )
        .await
        .unwrap();
    let ua = Uuid::now_v7();
    assignments
        .grant(
            &ctx,
            Assignment {
                id: Uuid::now_v7(),
                user_id: ua,
                role_id: admin.id,
                scope: Scope::Platform,
                scope_context_id: None,
                granted_at: chrono::Utc::now(),
                granted_by: None,
            },
        )
        .await
        .unwrap();

    let t1 = Uuid::now_v7();
    assert!(svc.has_permission(&ctx, ua, Scope::Tenant, Some(t1), "tenant:manage_users").await.unwrap());
    assert!(svc.has_permission(&ctx, ua, Scope::Platform, None, "arbitrary:action").await.unwrap());
}

/// E3 - Tenant editor scoped: a tenant-scoped role only grants its
/// permission within its own context.
#[tokio::test]
async fn e3_tenant_editor_scoped() {
    let (svc, assignments, roles) = authorization_service();
    let ctx = OperationContext::new();
    let editor = roles
        .create(
            &ctx,
            Role {
                id: Uuid::now_v7(),
                name: "editor".into(),
                scope: Scope::Tenant,
                description: None,
                permissions: vec!["edit:stuff".into()],
            },
        )
        .await
        .unwrap();
    let ub = Uuid::now_v7();
    let t1 = Uuid::now_v7();
    let t2 = Uuid::now_v7();
    assignments
        .grant(
            &ctx,
            Assignment {
                id: Uuid::now_v7(),
                user_id: ub,
                role_id: editor.id,
                scope: Scope::Tenant,
                scope_context_id: Some(t1),
                granted_at: chrono::Utc::now(),
                granted_by: None,
            },
        )
        .await
        .unwrap();

    assert!(svc.has_permission(&ctx, ub, Scope::Tenant, Some(t1), "edit:stuff").await.unwrap());
    assert!(!svc.has_permission(&ctx, ub, Scope::Tenant, Some(t2), "edit:stuff").await.unwrap());
    assert!(!svc.has_permission(&ctx, ub, Scope::Tenant, Some(t1), "delete:stuff").await.unwrap());
}

fn orchestrator() -> TenantOrchestrator {
    let audit = AuditLogger::new(Arc::new(InMemoryAuditRepository::new()));
    let identity_service = Arc::new(IdentityService::new(
        Arc::new(InMemoryIdentityRepository::new()),
        Arc::new(PasswordHasher::new(&Argon2Config::default())),
        audit.clone(),
        HMAC_KEY.to_vec(),
        5,
        ChronoDuration::minutes(15),
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

/// E4 - Tenant create then delete cascade: the owner is provisioned and
/// assigned on create, and every tenant-scoped record is gone after
/// delete.
#[tokio::test]
async fn e4_tenant_create_then_delete_cascade() {
    let orch = orchestrator();
    let ctx = OperationContext::new();
    let creator = Uuid::now_v7();

    let tenant = orch
        .create_tenant(&ctx, "Acme Corp", Some("owner@acme.test"), Some("p@ssw0rd1"), creator)
        .await
        .unwrap();

    let owner = orch.identity_service().get_by_email(&ctx, "owner@acme.test").await.unwrap();
    assert_eq!(owner.nickname.as_deref(), Some("owner"));
    assert!(orch.memberships().check_membership(&ctx, tenant.id, owner.id).await.unwrap());
    assert!(orch
        .assignments()
        .check_exists(&ctx, owner.id, seed::seeded_role_id(seed::TENANT_OWNER), Scope::Tenant, Some(tenant.id))
        .await
        .unwrap());

    orch.delete_tenant(&ctx, tenant.id, creator).await.unwrap();

    assert!(!orch.memberships().check_membership(&ctx, tenant.id, owner.id).await.unwrap());
    assert!(!orch
        .assignments()
        .check_exists(&ctx, owner.id, seed::seeded_role_id(seed::TENANT_OWNER), Scope::Tenant, Some(tenant.id))
        .await
        .unwrap());
    assert!(orch.tenants().get_by_id(&ctx, tenant.id).await.unwrap().is_none());
}

/// E5 - Self-revocation guard: an owner cannot revoke their own
/// ownership, and the assignment survives the attempt.
#[tokio::test]
async fn e5_self_revocation_guard() {
    let orch = orchestrator();
    let ctx = OperationContext::new();
    let creator = Uuid::now_v7();
    let tenant = orch
        .create_tenant(&ctx, "Acme Corp", Some("owner@acme.test"), None, creator)
        .await
        .unwrap();
    let owner = orch.identity_service().get_by_email(&ctx, "owner@acme.test").await.unwrap();

    let err = orch.revoke_role(&ctx, tenant.id, owner.id, seed::TENANT_OWNER, owner.id).await.unwrap_err();
    assert!(matches!(err, KernelError::SecurityViolation { .. }));

    assert!(orch
        .assignments()
        .check_exists(&ctx, owner.id, seed::seeded_role_id(seed::TENANT_OWNER), Scope::Tenant, Some(tenant.id))
        .await
        .unwrap());
}

/// E6 - OIDC scope validation: `openid` is mandatory and every scope
/// must belong to the closed catalog.
#[tokio::test]
async fn e6_oidc_scope_validation() {
    assert!(validate_oidc_scopes(&["openid".into(), "profile".into()]).is_ok());

    let missing_openid = validate_oidc_scopes(&["profile".into()]).unwrap_err();
    assert!(missing_openid.to_string().contains("openid"));

    let unknown = validate_oidc_scopes(&["openid".into(), "unknown".into()]).unwrap_err();
    assert!(unknown.to_string().contains("unknown"));
}
