//! Postgres-backed [`TenantRepository`].

use async_trait::async_trait;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::tenant::Tenant;
use crate::repository::tenant_repository::TenantRepository;

#[derive(Debug, Clone)]
pub struct PostgresTenantRepository {
    pool: PgPool,
}

impl PostgresTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    async fn create(&self, ctx: &OperationContext, tenant: Tenant) -> KernelResult<Tenant> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (id, name, status, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, NULL)
            RETURNING *
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(tenant.status)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("tenants_name_key") {
                    return KernelError::already_exists(ResourceKind::Tenant, tenant.name.clone());
                }
            }
            KernelError::storage(e)
        })
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Option<Tenant>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn get_by_name(&self, ctx: &OperationContext, name: &str) -> KernelResult<Option<Tenant>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE name = $1 AND deleted_at IS NULL")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn update(&self, ctx: &OperationContext, tenant: Tenant) -> KernelResult<Tenant> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET name = $2, status = $3, updated_at = now() WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(tenant.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(KernelError::storage)?
        .ok_or_else(|| KernelError::not_found(ResourceKind::Tenant, tenant.id.to_string()))
    }

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("UPDATE tenants SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn list(&self, ctx: &OperationContext, limit: i64, offset: i64) -> KernelResult<Vec<Tenant>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenants WHERE deleted_at IS NULL ORDER BY created_at ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(KernelError::storage)
    }
}
