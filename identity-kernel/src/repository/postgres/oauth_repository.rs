//! Postgres-backed [`AuthorizationCodeRepository`], [`AccessTokenRepository`],
//! [`RefreshTokenRepository`].

use async_trait::async_trait;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::oauth::{AccessToken, AuthorizationCode, RefreshToken};
use crate::repository::oauth_repository::{AccessTokenRepository, AuthorizationCodeRepository, RefreshTokenRepository};

#[derive(Debug, Clone)]
pub struct PostgresAuthorizationCodeRepository {
    pool: PgPool,
}

impl PostgresAuthorizationCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationCodeRepository for PostgresAuthorizationCodeRepository {
    async fn create(&self, ctx: &OperationContext, code: AuthorizationCode) -> KernelResult<AuthorizationCode> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, AuthorizationCode>(
            r#"
            INSERT INTO authorization_codes (
                id, code, client_id, user_id, redirect_uri, scope, state, nonce,
                code_challenge, code_challenge_method, expires_at, is_used, used_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, false, NULL)
            RETURNING *
            "#,
        )
        .bind(code.id)
        .bind(&code.code)
        .bind(code.client_id)
        .bind(code.user_id)
        .bind(&code.redirect_uri)
        .bind(&code.scope)
        .bind(&code.state)
        .bind(&code.nonce)
        .bind(&code.code_challenge)
        .bind(&code.code_challenge_method)
        .bind(code.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(KernelError::storage)
    }

    async fn get_by_code(&self, ctx: &OperationContext, code: &str) -> KernelResult<Option<AuthorizationCode>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, AuthorizationCode>("SELECT * FROM authorization_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn mark_as_used(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        // Atomic single-use enforcement (spec §5): the WHERE clause only
        // matches a not-yet-used row, so concurrent redemptions observe at
        // most one success.
        let result = sqlx::query(
            "UPDATE authorization_codes SET is_used = true, used_at = now() WHERE id = $1 AND is_used = false",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(KernelError::storage)?;

        if result.rows_affected() == 0 {
            return Err(KernelError::not_found(ResourceKind::AuthorizationCode, id.to_string()));
        }
        Ok(())
    }

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64> {
        ctx.check_cancelled()?;
        let result = sqlx::query("DELETE FROM authorization_codes WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
pub struct PostgresAccessTokenRepository {
    pool: PgPool,
}

impl PostgresAccessTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessTokenRepository for PostgresAccessTokenRepository {
    async fn create(&self, ctx: &OperationContext, token: AccessToken) -> KernelResult<AccessToken> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO access_tokens (id, token_hash, tenant_id, client_id, user_id, scope, expires_at, revoked, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, false, NULL)
            RETURNING *
            "#,
        )
        .bind(token.id)
        .bind(&token.token_hash)
        .bind(token.tenant_id)
        .bind(token.client_id)
        .bind(token.user_id)
        .bind(&token.scope)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(KernelError::storage)
    }

    async fn get_by_token_hash(&self, ctx: &OperationContext, token_hash: &str) -> KernelResult<Option<AccessToken>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, AccessToken>("SELECT * FROM access_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn revoke(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("UPDATE access_tokens SET revoked = true, revoked_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64> {
        ctx.check_cancelled()?;
        let result = sqlx::query("DELETE FROM access_tokens WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn create(&self, ctx: &OperationContext, token: RefreshToken) -> KernelResult<RefreshToken> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (id, token_hash, tenant_id, client_id, user_id, scope, expires_at, revoked, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, false, NULL)
            RETURNING *
            "#,
        )
        .bind(token.id)
        .bind(&token.token_hash)
        .bind(token.tenant_id)
        .bind(token.client_id)
        .bind(token.user_id)
        .bind(&token.scope)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(KernelError::storage)
    }

    async fn get_by_token_hash(&self, ctx: &OperationContext, token_hash: &str) -> KernelResult<Option<RefreshToken>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn revoke(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("UPDATE refresh_tokens SET revoked = true, revoked_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64> {
        ctx.check_cancelled()?;
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(result.rows_affected())
    }
}
