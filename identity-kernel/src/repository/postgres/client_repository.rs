//! Postgres-backed [`ClientRepository`].

use async_trait::async_trait;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::client::OAuth2Client;
use crate::repository::client_repository::ClientRepository;

#[derive(Debug, Clone)]
pub struct PostgresClientRepository {
    pool: PgPool,
}

impl PostgresClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_create_error(e: sqlx::Error, client_id: &str) -> KernelError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.constraint() == Some("oauth_clients_client_id_key") {
            return KernelError::already_exists(ResourceKind::Client, client_id.to_string());
        }
    }
    KernelError::storage(e)
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn create(&self, ctx: &OperationContext, client: OAuth2Client) -> KernelResult<OAuth2Client> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, OAuth2Client>(
            r#"
            INSERT INTO oauth_clients (
                id, client_id, tenant_id, client_secret_hash, name, client_uri,
                redirect_uris, allowed_scopes, grant_types, response_types,
                token_endpoint_auth_method, access_token_lifetime_seconds,
                refresh_token_lifetime_seconds, id_token_lifetime_seconds,
                owner_user_id, trusted, active, created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, NULL)
            RETURNING *
            "#,
        )
        .bind(client.id)
        .bind(&client.client_id)
        .bind(client.tenant_id)
        .bind(&client.client_secret_hash)
        .bind(&client.name)
        .bind(&client.client_uri)
        .bind(&client.redirect_uris)
        .bind(&client.allowed_scopes)
        .bind(&client.grant_types)
        .bind(&client.response_types)
        .bind(&client.token_endpoint_auth_method)
        .bind(client.access_token_lifetime_seconds)
        .bind(client.refresh_token_lifetime_seconds)
        .bind(client.id_token_lifetime_seconds)
        .bind(client.owner_user_id)
        .bind(client.trusted)
        .bind(client.active)
        .bind(client.created_at)
        .bind(client.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_error(e, &client.client_id))
    }

    async fn get_by_client_id(&self, ctx: &OperationContext, tenant_id: Uuid, client_id: &str) -> KernelResult<Option<OAuth2Client>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, OAuth2Client>(
            "SELECT * FROM oauth_clients WHERE tenant_id = $1 AND client_id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(KernelError::storage)
    }

    async fn get_by_id(&self, ctx: &OperationContext, tenant_id: Uuid, id: Uuid) -> KernelResult<Option<OAuth2Client>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, OAuth2Client>(
            "SELECT * FROM oauth_clients WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(KernelError::storage)
    }

    async fn update(&self, ctx: &OperationContext, client: OAuth2Client) -> KernelResult<OAuth2Client> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, OAuth2Client>(
            r#"
            UPDATE oauth_clients SET
                name = $2, client_uri = $3, redirect_uris = $4, allowed_scopes = $5,
                grant_types = $6, response_types = $7, token_endpoint_auth_method = $8,
                access_token_lifetime_seconds = $9, refresh_token_lifetime_seconds = $10,
                id_token_lifetime_seconds = $11, trusted = $12, active = $13, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.client_uri)
        .bind(&client.redirect_uris)
        .bind(&client.allowed_scopes)
        .bind(&client.grant_types)
        .bind(&client.response_types)
        .bind(&client.token_endpoint_auth_method)
        .bind(client.access_token_lifetime_seconds)
        .bind(client.refresh_token_lifetime_seconds)
        .bind(client.id_token_lifetime_seconds)
        .bind(client.trusted)
        .bind(client.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(KernelError::storage)?
        .ok_or_else(|| KernelError::not_found(ResourceKind::Client, client.id.to_string()))
    }

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("UPDATE oauth_clients SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn list_by_owner(&self, ctx: &OperationContext, owner_user_id: Uuid) -> KernelResult<Vec<OAuth2Client>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, OAuth2Client>(
            "SELECT * FROM oauth_clients WHERE owner_user_id = $1 AND deleted_at IS NULL ORDER BY created_at ASC",
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(KernelError::storage)
    }

    async fn list_by_tenant(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<Vec<OAuth2Client>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, OAuth2Client>(
            "SELECT * FROM oauth_clients WHERE tenant_id = $1 AND deleted_at IS NULL ORDER BY created_at ASC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(KernelError::storage)
    }

    async fn delete_by_tenant_id(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("UPDATE oauth_clients SET deleted_at = now() WHERE tenant_id = $1 AND deleted_at IS NULL")
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }
}
