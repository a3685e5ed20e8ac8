//! Postgres-backed [`AssignmentRepository`].

use async_trait::async_trait;
use kernel_shared::errors::{KernelError, KernelResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::assignment::Assignment;
use crate::domain::permissions::Scope;
use crate::repository::assignment_repository::AssignmentRepository;

#[derive(Debug, Clone)]
pub struct PostgresAssignmentRepository {
    pool: PgPool,
}

impl PostgresAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn grant(&self, ctx: &OperationContext, assignment: Assignment) -> KernelResult<Assignment> {
        ctx.check_cancelled()?;
        // Repeated grant of the same (user, role, scope, context) is
        // idempotent (spec §8 property 7) - ON CONFLICT DO NOTHING plus a
        // re-select covers both the fresh-insert and already-exists cases
        // in one round-trip without surfacing a uniqueness error.
        sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (id, user_id, role_id, scope, scope_context_id, granted_at, granted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, role_id, scope, scope_context_id) DO UPDATE SET role_id = EXCLUDED.role_id
            RETURNING *
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.user_id)
        .bind(assignment.role_id)
        .bind(assignment.scope)
        .bind(assignment.scope_context_id)
        .bind(assignment.granted_at)
        .bind(assignment.granted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(KernelError::storage)
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
        sqlx::query(
            r#"
            DELETE FROM assignments
            WHERE user_id = $1 AND role_id = $2 AND scope = $3
              AND scope_context_id IS NOT DISTINCT FROM $4
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .bind(scope)
        .bind(scope_context_id)
        .execute(&self.pool)
        .await
        .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn list_for_user(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<Vec<Assignment>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn list_by_role(
        &self,
        ctx: &OperationContext,
        role_id: Uuid,
        scope: Scope,
        scope_context_id: Option<Uuid>,
    ) -> KernelResult<Vec<Assignment>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Assignment>(
            r#"
            SELECT * FROM assignments
            WHERE role_id = $1 AND scope = $2 AND scope_context_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(role_id)
        .bind(scope)
        .bind(scope_context_id)
        .fetch_all(&self.pool)
        .await
        .map_err(KernelError::storage)
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
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT 1 FROM assignments
            WHERE user_id = $1 AND role_id = $2 AND scope = $3
              AND scope_context_id IS NOT DISTINCT FROM $4
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .bind(scope)
        .bind(scope_context_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(KernelError::storage)?;
        Ok(row.is_some())
    }

    async fn delete_by_context_id(&self, ctx: &OperationContext, scope: Scope, scope_context_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("DELETE FROM assignments WHERE scope = $1 AND scope_context_id = $2")
            .bind(scope)
            .bind(scope_context_id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }
}
