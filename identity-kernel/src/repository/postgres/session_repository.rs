//! Postgres-backed [`SessionRepository`].

use async_trait::async_trait;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::session::Session;
use crate::repository::session_repository::SessionRepository;

#[derive(Debug, Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(&self, ctx: &OperationContext, session: Session) -> KernelResult<Session> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, tenant_id, user_id, ip_address, user_agent, namespace, expires_at, created_at, last_seen_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&session.id)
        .bind(session.tenant_id)
        .bind(session.user_id)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .bind(session.namespace)
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.last_seen_at)
        .fetch_one(&self.pool)
        .await
        .map_err(KernelError::storage)
    }

    async fn get(&self, ctx: &OperationContext, id: &str) -> KernelResult<Option<Session>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn update(&self, ctx: &OperationContext, session: Session) -> KernelResult<Session> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Session>("UPDATE sessions SET last_seen_at = $2 WHERE id = $1 RETURNING *")
            .bind(&session.id)
            .bind(session.last_seen_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)?
            .ok_or_else(|| KernelError::not_found(ResourceKind::Session, session.id.clone()))
    }

    async fn delete(&self, ctx: &OperationContext, id: &str) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn delete_by_user_id(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64> {
        ctx.check_cancelled()?;
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(result.rows_affected())
    }
}
