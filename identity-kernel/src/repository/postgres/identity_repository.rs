//! # Postgres-Backed Identity Repository
//!
//! ## Query Patterns
//!
//! | Pattern          | Example                                              |
//! |------------------|-------------------------------------------------------|
//! | Soft delete      | `WHERE deleted_at IS NULL`                            |
//! | Returning        | `INSERT ... RETURNING *`                               |
//! | Parameterized    | Always `$1, $2`, never string interpolation            |
//!
//! Unique-constraint violations on `email_hash` surface as
//! `KernelError::AlreadyExists`; everything else from `sqlx` is wrapped in
//! `KernelError::Storage`.

use async_trait::async_trait;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::identity::{Credential, Identity, NewIdentity};
use crate::repository::identity_repository::IdentityRepository;

#[derive(Debug, Clone)]
pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_create_error(e: sqlx::Error, email_hash: &str) -> KernelError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.constraint() == Some("identities_email_hash_key") {
            return KernelError::already_exists(ResourceKind::Identity, email_hash.to_string());
        }
    }
    KernelError::storage(e)
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn create(&self, ctx: &OperationContext, email_hash: String, new_identity: NewIdentity) -> KernelResult<Identity> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO identities (
                id, email_hash, email_plain, email_verified,
                given_name, family_name, full_name, nickname, picture, locale, timezone,
                failed_login_attempts, locked_until, created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, false, $4, $5, $6, $7, $8, $9, $10, 0, NULL, now(), now(), NULL)
            RETURNING *
            "#,
        )
        .bind(kernel_shared::new_id())
        .bind(&email_hash)
        .bind(&new_identity.email_plain)
        .bind(&new_identity.profile.given_name)
        .bind(&new_identity.profile.family_name)
        .bind(&new_identity.profile.full_name)
        .bind(&new_identity.profile.nickname)
        .bind(&new_identity.profile.picture)
        .bind(&new_identity.profile.locale)
        .bind(&new_identity.profile.timezone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_error(e, &email_hash))
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Option<Identity>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn get_by_hash(&self, ctx: &OperationContext, email_hash: &str) -> KernelResult<Option<Identity>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE email_hash = $1 AND deleted_at IS NULL")
            .bind(email_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn update(&self, ctx: &OperationContext, identity: Identity) -> KernelResult<Identity> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Identity>(
            r#"
            UPDATE identities SET
                email_verified = $2, given_name = $3, family_name = $4, full_name = $5,
                nickname = $6, picture = $7, locale = $8, timezone = $9, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(identity.id)
        .bind(identity.email_verified)
        .bind(&identity.given_name)
        .bind(&identity.family_name)
        .bind(&identity.full_name)
        .bind(&identity.nickname)
        .bind(&identity.picture)
        .bind(&identity.locale)
        .bind(&identity.timezone)
        .fetch_optional(&self.pool)
        .await
        .map_err(KernelError::storage)?
        .ok_or_else(|| KernelError::not_found(ResourceKind::Identity, identity.id.to_string()))
    }

    async fn update_lockout(
        &self,
        ctx: &OperationContext,
        user_id: Uuid,
        failed_attempts: i32,
        locked_until: Option<chrono::DateTime<chrono::Utc>>,
    ) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let result = sqlx::query(
            "UPDATE identities SET failed_login_attempts = $2, locked_until = $3, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .bind(failed_attempts)
        .bind(locked_until)
        .execute(&self.pool)
        .await
        .map_err(KernelError::storage)?;

        if result.rows_affected() == 0 {
            return Err(KernelError::not_found(ResourceKind::Identity, user_id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        sqlx::query("UPDATE identities SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(KernelError::storage)?;
        Ok(())
    }

    async fn get_credentials(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<Option<Credential>> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Credential>("SELECT * FROM credentials WHERE identity_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(KernelError::storage)
    }

    async fn add_credentials(&self, ctx: &OperationContext, user_id: Uuid, password_hash: String) -> KernelResult<Credential> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Credential>(
            "INSERT INTO credentials (identity_id, password_hash, updated_at) VALUES ($1, $2, now()) RETURNING *",
        )
        .bind(user_id)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("credentials_pkey") {
                    return KernelError::already_exists(ResourceKind::Credential, user_id.to_string());
                }
            }
            KernelError::storage(e)
        })
    }

    async fn update_password(&self, ctx: &OperationContext, user_id: Uuid, password_hash: String) -> KernelResult<Credential> {
        ctx.check_cancelled()?;
        sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO credentials (identity_id, password_hash, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (identity_id) DO UPDATE SET password_hash = EXCLUDED.password_hash, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(KernelError::storage)
    }
}
