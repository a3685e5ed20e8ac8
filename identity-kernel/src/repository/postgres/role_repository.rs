//! Postgres-backed [`RoleRepository`].

use async_trait::async_trait;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::permissions::Scope;
use crate::domain::role::Role;
use crate::repository::role_repository::RoleRepository;

#[derive(Debug, Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_create_error(e: sqlx::Error, name: &str) -> KernelError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.constraint() == Some("roles_name_scope_key") {
            return KernelError::already_exists(ResourceKind::Role, name.to_string());
        }
    }
    KernelError::storage(e)
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn create(&self, ctx: &OperationContext, role: Role) -> KernelResult<Role> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (id, name, scope, description, permissions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(role.scope)
        .bind(&role.description)
        .bind(&role.permissions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_error(e, &role.name))
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Option<Role>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn get_by_name(&self, ctx: &OperationContext, name: &str, scope: Scope) -> KernelResult<Option<Role>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1 AND scope = $2")
            .bind(name)
            .bind(scope)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn list(&self, ctx: &OperationContext, scope: Option<Scope>) -> KernelResult<Vec<Role>> {
        ctx.check_cancelled()?;
        match scope {
            Some(scope) => sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE scope = $1 ORDER BY name ASC")
                .bind(scope)
                .fetch_all(&self.pool)
                .await
                .map_err(KernelError::storage),
            None => sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY scope ASC, name ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(KernelError::storage),
        }
    }

    async fn update(&self, ctx: &OperationContext, role: Role) -> KernelResult<Role> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET description = $2, permissions = $3 WHERE id = $1 RETURNING *",
        )
        .bind(role.id)
        .bind(&role.description)
        .bind(&role.permissions)
        .fetch_optional(&self.pool)
        .await
        .map_err(KernelError::storage)?
        .ok_or_else(|| KernelError::not_found(ResourceKind::Role, role.id.to_string()))
    }

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }
}
