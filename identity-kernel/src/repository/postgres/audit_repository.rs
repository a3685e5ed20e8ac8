//! Postgres-backed [`AuditRepository`].
//!
//! Listing joins `identities` to resolve `actor_name` via the coalesce
//! order spec §4.7 specifies (`full_name → email_plain → actor_id`), since
//! the persisted event only carries whatever `actor_name` the emitting
//! call site supplied at write time - this repository augments it at read
//! time for callers who list historical events emitted before that
//! convention existed.

use async_trait::async_trait;
use kernel_shared::errors::{KernelError, KernelResult};
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::audit::event::{AuditEvent, AuditEventType, AuditFilter};
use crate::context::OperationContext;
use crate::repository::audit_repository::AuditRepository;

#[derive(Debug, Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn event_type_from_row(row: &PgRow, col: &str) -> Result<AuditEventType, sqlx::Error> {
    let raw: String = row.try_get(col)?;
    parse_event_type(&raw).ok_or_else(|| sqlx::Error::Decode(format!("unknown audit event type: {raw}").into()))
}

fn parse_event_type(s: &str) -> Option<AuditEventType> {
    use AuditEventType::*;
    Some(match s {
        "login_success" => LoginSuccess,
        "login_failed" => LoginFailed,
        "user_locked" => UserLocked,
        "user_unlocked" => UserUnlocked,
        "user_created" => UserCreated,
        "user_updated" => UserUpdated,
        "password_changed" => PasswordChanged,
        "logout" => Logout,
        "platform_admin_bootstrap" => PlatformAdminBootstrap,
        "tenant_created" => TenantCreated,
        "tenant_updated" => TenantUpdated,
        "tenant_deleted" => TenantDeleted,
        "client_created" => ClientCreated,
        "client_updated" => ClientUpdated,
        "client_deleted" => ClientDeleted,
        "role_assigned" => RoleAssigned,
        "role_revoked" => RoleRevoked,
        "secret_rotated" => SecretRotated,
        "token_issued" => TokenIssued,
        "token_revoked" => TokenRevoked,
        "audit.read" => AuditRead,
        "audit.read.cross_tenant" => AuditReadCrossTenant,
        _ => return None,
    })
}

fn row_to_event(row: PgRow) -> Result<AuditEvent, sqlx::Error> {
    let metadata_json: serde_json::Value = row.try_get("metadata")?;
    let metadata = serde_json::from_value(metadata_json).unwrap_or_default();
    Ok(AuditEvent {
        id: row.try_get("id")?,
        event_type: event_type_from_row(&row, "event_type")?,
        tenant_id: row.try_get("tenant_id")?,
        actor_id: row.try_get("actor_id")?,
        actor_name: row.try_get("actor_name")?,
        resource: row.try_get("resource")?,
        target_name: row.try_get("target_name")?,
        target_id: row.try_get("target_id")?,
        ip_address: row.try_get("ip_address")?,
        user_agent: row.try_get("user_agent")?,
        metadata,
        occurred_at: row.try_get("occurred_at")?,
    })
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn log(&self, ctx: &OperationContext, event: AuditEvent) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let metadata_json = serde_json::to_value(&event.metadata).map_err(KernelError::storage)?;
        sqlx::query(
            r#"
            INSERT INTO audit_events (
                id, event_type, tenant_id, actor_id, actor_name, resource,
                target_name, target_id, ip_address, user_agent, metadata, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(event.id)
        .bind(event.event_type.as_str())
        .bind(event.tenant_id)
        .bind(event.actor_id)
        .bind(&event.actor_name)
        .bind(&event.resource)
        .bind(&event.target_name)
        .bind(event.target_id)
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .bind(metadata_json)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn list(&self, ctx: &OperationContext, filter: AuditFilter) -> KernelResult<(Vec<AuditEvent>, i64)> {
        ctx.check_cancelled()?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT count(*) FROM audit_events e
            WHERE ($1::uuid IS NULL OR e.tenant_id = $1)
              AND ($2::uuid IS NULL OR e.actor_id = $2)
              AND ($3::text IS NULL OR e.event_type = $3)
              AND ($4::timestamptz IS NULL OR e.occurred_at >= $4)
              AND ($5::timestamptz IS NULL OR e.occurred_at <= $5)
            "#,
        )
        .bind(filter.tenant_id)
        .bind(filter.actor_id)
        .bind(filter.event_type.map(|t| t.as_str().to_string()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(&self.pool)
        .await
        .map_err(KernelError::storage)?;

        let rows = sqlx::query(
            r#"
            SELECT
                e.id, e.event_type, e.tenant_id, e.actor_id,
                COALESCE(e.actor_name, i.full_name, i.email_plain, e.actor_id::text) AS actor_name,
                e.resource, e.target_name, e.target_id, e.ip_address, e.user_agent, e.metadata, e.occurred_at
            FROM audit_events e
            LEFT JOIN identities i ON i.id = e.actor_id
            WHERE ($1::uuid IS NULL OR e.tenant_id = $1)
              AND ($2::uuid IS NULL OR e.actor_id = $2)
              AND ($3::text IS NULL OR e.event_type = $3)
              AND ($4::timestamptz IS NULL OR e.occurred_at >= $4)
              AND ($5::timestamptz IS NULL OR e.occurred_at <= $5)
            ORDER BY e.occurred_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.tenant_id)
        .bind(filter.actor_id)
        .bind(filter.event_type.map(|t| t.as_str().to_string()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(if filter.limit > 0 { filter.limit } else { i64::MAX })
        .bind(filter.offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(KernelError::storage)?;

        let events = rows.into_iter().map(row_to_event).collect::<Result<Vec<_>, _>>().map_err(KernelError::storage)?;

        Ok((events, total))
    }
}
