//! Postgres-backed [`MembershipRepository`].

use async_trait::async_trait;
use kernel_shared::errors::{KernelError, KernelResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::membership::Membership;
use crate::repository::membership_repository::MembershipRepository;

#[derive(Debug, Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn add_member(&self, ctx: &OperationContext, tenant_id: Uuid, user_id: Uuid) -> KernelResult<Membership> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (id, tenant_id, user_id, created_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (tenant_id, user_id) DO UPDATE SET tenant_id = EXCLUDED.tenant_id
            RETURNING *
            "#,
        )
        .bind(kernel_shared::new_id())
        .bind(tenant_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(KernelError::storage)
    }

    async fn remove_member(&self, ctx: &OperationContext, tenant_id: Uuid, user_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("DELETE FROM memberships WHERE tenant_id = $1 AND user_id = $2")
            .bind(tenant_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn list_members(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<Vec<Membership>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE tenant_id = $1 ORDER BY created_at ASC")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn check_membership(&self, ctx: &OperationContext, tenant_id: Uuid, user_id: Uuid) -> KernelResult<bool> {
        ctx.check_cancelled()?;
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM memberships WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(KernelError::storage)?;
        Ok(row.is_some())
    }

    async fn delete_by_tenant_id(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("DELETE FROM memberships WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }
}
