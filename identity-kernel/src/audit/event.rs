//! # Audit Event Taxonomy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The closed set of audit event types the kernel may emit (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    LoginSuccess,
    LoginFailed,
    UserLocked,
    UserUnlocked,
    UserCreated,
    UserUpdated,
    PasswordChanged,
    Logout,
    PlatformAdminBootstrap,
    TenantCreated,
    TenantUpdated,
    TenantDeleted,
    ClientCreated,
    ClientUpdated,
    ClientDeleted,
    RoleAssigned,
    RoleRevoked,
    SecretRotated,
    TokenIssued,
    TokenRevoked,
    AuditRead,
    AuditReadCrossTenant,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::LoginSuccess => "login_success",
            AuditEventType::LoginFailed => "login_failed",
            AuditEventType::UserLocked => "user_locked",
            AuditEventType::UserUnlocked => "user_unlocked",
            AuditEventType::UserCreated => "user_created",
            AuditEventType::UserUpdated => "user_updated",
            AuditEventType::PasswordChanged => "password_changed",
            AuditEventType::Logout => "logout",
            AuditEventType::PlatformAdminBootstrap => "platform_admin_bootstrap",
            AuditEventType::TenantCreated => "tenant_created",
            AuditEventType::TenantUpdated => "tenant_updated",
            AuditEventType::TenantDeleted => "tenant_deleted",
            AuditEventType::ClientCreated => "client_created",
            AuditEventType::ClientUpdated => "client_updated",
            AuditEventType::ClientDeleted => "client_deleted",
            AuditEventType::RoleAssigned => "role_assigned",
            AuditEventType::RoleRevoked => "role_revoked",
            AuditEventType::SecretRotated => "secret_rotated",
            AuditEventType::TokenIssued => "token_issued",
            AuditEventType::TokenRevoked => "token_revoked",
            AuditEventType::AuditRead => "audit.read",
            AuditEventType::AuditReadCrossTenant => "audit.read.cross_tenant",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a security-relevant action (spec §3 `Audit Event`).
/// Never modified or deleted once written - even a soft-deleted tenant's
/// audit trail survives the tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub event_type: AuditEventType,
    pub tenant_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub resource: Option<String>,
    pub target_name: Option<String>,
    pub target_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: HashMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

/// Builder for a new audit event, filled in by the emitting call site and
/// stamped with `id`/`occurred_at` by [`super::AuditLogger::log`].
#[derive(Debug, Clone, Default)]
pub struct NewAuditEvent {
    pub event_type: Option<AuditEventType>,
    pub tenant_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub resource: Option<String>,
    pub target_name: Option<String>,
    pub target_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl NewAuditEvent {
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_type: Some(event_type),
            ..Default::default()
        }
    }

    pub fn tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn actor_name(mut self, name: impl Into<String>) -> Self {
        self.actor_name = Some(name.into());
        self
    }

    pub fn target(mut self, target_id: Uuid, target_name: impl Into<String>) -> Self {
        self.target_id = Some(target_id);
        self.target_name = Some(target_name.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Filter for [`crate::repository::audit_repository::AuditRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub tenant_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    pub event_type: Option<AuditEventType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}
