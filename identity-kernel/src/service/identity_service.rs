//! # Identity Service
//!
//! Provisioning, authentication, lockout, and password lifecycle for the
//! privacy-preserving identity layer (spec §4.2). The single hardest
//! invariant this service owns: authentication must never disclose
//! whether an email is registered. Every failure path that could leak
//! that - "no such user" vs. "wrong password" - collapses to the same
//! [`KernelError::InvalidCredentials`].

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use kernel_shared::crypto::email_hash::{email_hash, nickname_from_email, placeholder_picture_url};
use kernel_shared::crypto::password::{validate_password_strength, PasswordHasher};
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{AuditLogger, AuditEventType, NewAuditEvent};
use crate::context::OperationContext;
use crate::domain::identity::{Credential, Identity, NewIdentity, ProfileInput};
use crate::repository::identity_repository::IdentityRepository;

/// Minimum/maximum email length the kernel validates (spec §4.2:
/// "Email validation is minimal (length 3 ≤ n ≤ 254)").
const EMAIL_MIN_LEN: usize = 3;
const EMAIL_MAX_LEN: usize = 254;

fn validate_email(email: &str) -> KernelResult<()> {
    let len = email.trim().len();
    if !(EMAIL_MIN_LEN..=EMAIL_MAX_LEN).contains(&len) {
        return Err(KernelError::invalid_input(format!(
            "email must be between {EMAIL_MIN_LEN} and {EMAIL_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Provisioning, authentication, and lockout service for [`Identity`] (spec
/// §4.2). Holds the process-wide HMAC key used to derive `email_hash` -
/// this is the only place in the kernel a plaintext email is hashed.
#[derive(Clone)]
pub struct IdentityService {
    repository: Arc<dyn IdentityRepository>,
    password_hasher: Arc<PasswordHasher>,
    audit: AuditLogger,
    hmac_key: Arc<Vec<u8>>,
    max_attempts: u32,
    lockout_duration: ChronoDuration,
}

impl IdentityService {
    pub fn new(
        repository: Arc<dyn IdentityRepository>,
        password_hasher: Arc<PasswordHasher>,
        audit: AuditLogger,
        hmac_key: Vec<u8>,
        max_attempts: u32,
        lockout_duration: ChronoDuration,
    ) -> Self {
        Self {
            repository,
            password_hasher,
            audit,
            hmac_key: Arc::new(hmac_key),
            max_attempts,
            lockout_duration,
        }
    }

    fn hash_email(&self, email: &str) -> String {
        email_hash(&self.hmac_key, email)
    }

    /// Provisions a new identity (spec §4.2 `provision`).
    ///
    /// Fills in a `nickname` derived from the email local-part and a
    /// deterministic placeholder `picture` when the caller's profile
    /// leaves them unset; rejects if an identity with this email's hash
    /// already exists.
    pub async fn provision(&self, ctx: &OperationContext, email: &str, mut profile: ProfileInput) -> KernelResult<Identity> {
        validate_email(email)?;
        let hash = self.hash_email(email);

        if profile.nickname.is_none() {
            profile.nickname = Some(nickname_from_email(email));
        }
        if profile.picture.is_none() {
            profile.picture = Some(placeholder_picture_url(&hash));
        }

        let identity = self
            .repository
            .create(
                ctx,
                hash.clone(),
                NewIdentity {
                    email_plain: email.trim().to_string(),
                    profile,
                },
            )
            .await?;

        info!(identity_id = %identity.id, email_hash = %hash, "identity provisioned");
        self.audit
            .log(
                ctx,
                NewAuditEvent::new(AuditEventType::UserCreated)
                    .actor(identity.id)
                    .target(identity.id, identity.nickname.clone().unwrap_or_default()),
            )
            .await;

        Ok(identity)
    }

    /// Strict create-only password set (spec §4.2 `add_password`):
    /// rejects with `already_exists` if a credential already exists.
    pub async fn add_password(&self, ctx: &OperationContext, user_id: Uuid, password: &str) -> KernelResult<Credential> {
        validate_password_strength(password)?;
        let hash = self.password_hasher.hash(password)?;
        let credential = self.repository.add_credentials(ctx, user_id, hash).await?;
        info!(identity_id = %user_id, "password set (create-only)");
        self.audit
            .log(ctx, NewAuditEvent::new(AuditEventType::PasswordChanged).actor(user_id))
            .await;
        Ok(credential)
    }

    /// Idempotent password set (spec §4.2 `set_password`): creates the
    /// credential if absent, overwrites if present.
    pub async fn set_password(&self, ctx: &OperationContext, user_id: Uuid, password: &str) -> KernelResult<Credential> {
        validate_password_strength(password)?;
        let hash = self.password_hasher.hash(password)?;
        let credential = self.repository.update_password(ctx, user_id, hash).await?;
        info!(identity_id = %user_id, "password set (upsert)");
        self.audit
            .log(ctx, NewAuditEvent::new(AuditEventType::PasswordChanged).actor(user_id))
            .await;
        Ok(credential)
    }

    /// Verifies `old`, then re-hashes and stores `new` (spec §4.2
    /// `change_password`).
    pub async fn change_password(&self, ctx: &OperationContext, user_id: Uuid, old: &str, new: &str) -> KernelResult<()> {
        let credential = self
            .repository
            .get_credentials(ctx, user_id)
            .await?
            .ok_or_else(|| KernelError::not_found(ResourceKind::Credential, user_id.to_string()))?;

        if !self.password_hasher.verify(old, &credential.password_hash)? {
            return Err(KernelError::InvalidCredentials);
        }

        validate_password_strength(new)?;
        let hash = self.password_hasher.hash(new)?;
        self.repository.update_password(ctx, user_id, hash).await?;

        info!(identity_id = %user_id, "password changed");
        self.audit
            .log(ctx, NewAuditEvent::new(AuditEventType::PasswordChanged).actor(user_id))
            .await;
        Ok(())
    }

    /// Authenticates by email and password, enforcing the lockout state
    /// machine (spec §4.2 `authenticate`). Never discloses whether the
    /// account exists: an unknown email and a wrong password both return
    /// [`KernelError::InvalidCredentials`].
    pub async fn authenticate(&self, ctx: &OperationContext, email: &str, password: &str) -> KernelResult<Identity> {
        let hash = self.hash_email(email);

        let identity = match self.repository.get_by_hash(ctx, &hash).await? {
            Some(identity) => identity,
            None => {
                warn!(email_hash = %hash, "login failed: no identity for this email hash");
                self.audit
                    .log(
                        ctx,
                        NewAuditEvent::new(AuditEventType::LoginFailed)
                            .metadata("reason", "user_not_found")
                            .metadata("email_hash", &hash),
                    )
                    .await;
                return Err(KernelError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        if identity.is_locked_at(now) {
            warn!(identity_id = %identity.id, "login failed: account locked");
            self.audit
                .log(
                    ctx,
                    NewAuditEvent::new(AuditEventType::LoginFailed)
                        .actor(identity.id)
                        .metadata("reason", "locked_out"),
                )
                .await;
            return Err(KernelError::AccountLocked {
                until: identity.locked_until.expect("is_locked_at implies locked_until is set"),
            });
        }

        let credential = self
            .repository
            .get_credentials(ctx, identity.id)
            .await?
            .ok_or_else(|| KernelError::not_found(ResourceKind::Credential, identity.id.to_string()))?;

        let verified = self.password_hasher.verify(password, &credential.password_hash)?;

        if !verified {
            let attempts = identity.failed_login_attempts + 1;
            let locked_until = if attempts as u32 >= self.max_attempts {
                Some(now + self.lockout_duration)
            } else {
                None
            };
            self.repository.update_lockout(ctx, identity.id, attempts, locked_until).await?;

            self.audit
                .log(
                    ctx,
                    NewAuditEvent::new(AuditEventType::LoginFailed)
                        .actor(identity.id)
                        .metadata("reason", "invalid_password")
                        .metadata("attempts", attempts.to_string()),
                )
                .await;

            if let Some(until) = locked_until {
                warn!(identity_id = %identity.id, attempts, "account locked after exceeding max attempts");
                self.audit
                    .log(
                        ctx,
                        NewAuditEvent::new(AuditEventType::UserLocked)
                            .actor(identity.id)
                            .metadata("locked_until", until.to_rfc3339()),
                    )
                    .await;
            }

            return Err(KernelError::InvalidCredentials);
        }

        if identity.failed_login_attempts != 0 || identity.locked_until.is_some() {
            self.repository.update_lockout(ctx, identity.id, 0, None).await?;
        }

        info!(identity_id = %identity.id, "login succeeded");
        self.audit
            .log(ctx, NewAuditEvent::new(AuditEventType::LoginSuccess).actor(identity.id))
            .await;

        Ok(Identity {
            failed_login_attempts: 0,
            locked_until: None,
            ..identity
        })
    }

    pub async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Identity> {
        self.repository
            .get_by_id(ctx, id)
            .await?
            .ok_or_else(|| KernelError::not_found(ResourceKind::Identity, id.to_string()))
    }

    pub async fn get_by_email(&self, ctx: &OperationContext, email: &str) -> KernelResult<Identity> {
        let hash = self.hash_email(email);
        self.repository
            .get_by_hash(ctx, &hash)
            .await?
            .ok_or_else(|| KernelError::not_found(ResourceKind::Identity, hash))
    }

    pub async fn update_profile(&self, ctx: &OperationContext, user_id: Uuid, profile: ProfileInput) -> KernelResult<Identity> {
        let mut identity = self.get_by_id(ctx, user_id).await?;
        identity.given_name = profile.given_name.or(identity.given_name);
        identity.family_name = profile.family_name.or(identity.family_name);
        identity.full_name = profile.full_name.or(identity.full_name);
        identity.nickname = profile.nickname.or(identity.nickname);
        identity.picture = profile.picture.or(identity.picture);
        identity.locale = profile.locale.or(identity.locale);
        identity.timezone = profile.timezone.or(identity.timezone);

        let updated = self.repository.update(ctx, identity).await?;
        self.audit
            .log(ctx, NewAuditEvent::new(AuditEventType::UserUpdated).actor(user_id))
            .await;
        Ok(updated)
    }

    /// Soft-deletes an identity (spec §3 soft deletion).
    pub async fn delete(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<()> {
        self.repository.delete(ctx, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_shared::config::Argon2Config;
    use crate::repository::memory::{InMemoryAuditRepository, InMemoryIdentityRepository};

    fn service() -> IdentityService {
        IdentityService::new(
            Arc::new(InMemoryIdentityRepository::new()),
            Arc::new(PasswordHasher::new(&Argon2Config::default())),
            AuditLogger::new(Arc::new(InMemoryAuditRepository::new())),
            b"test-key".to_vec(),
            3,
            ChronoDuration::minutes(15),
        )
    }

    #[tokio::test]
    async fn provision_fills_nickname_and_picture_from_email() {
        let svc = service();
        let ctx = OperationContext::new();
        let identity = svc.provision(&ctx, "User@Example.Com ", ProfileInput::default()).await.unwrap();
        assert_eq!(identity.nickname.as_deref(), Some("user"));
        assert!(identity.picture.unwrap().contains(&identity.email_hash));
    }

    #[tokio::test]
    async fn provision_twice_with_same_email_conflicts() {
        let svc = service();
        let ctx = OperationContext::new();
        svc.provision(&ctx, "dup@example.com", ProfileInput::default()).await.unwrap();
        let err = svc.provision(&ctx, " DUP@Example.com", ProfileInput::default()).await.unwrap_err();
        assert!(matches!(err, KernelError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn authenticate_succeeds_with_correct_password() {
        let svc = service();
        let ctx = OperationContext::new();
        let identity = svc.provision(&ctx, "user@example.com", ProfileInput::default()).await.unwrap();
        svc.add_password(&ctx, identity.id, "secure-password").await.unwrap();

        let authenticated = svc.authenticate(&ctx, "user@example.com", "secure-password").await.unwrap();
        assert_eq!(authenticated.id, identity.id);
    }

    #[tokio::test]
    async fn authenticate_unknown_user_and_wrong_password_are_indistinguishable() {
        let svc = service();
        let ctx = OperationContext::new();
        let identity = svc.provision(&ctx, "user2@example.com", ProfileInput::default()).await.unwrap();
        svc.add_password(&ctx, identity.id, "secure-password").await.unwrap();

        let unknown_err = svc.authenticate(&ctx, "nosuchuser@example.com", "whatever").await.unwrap_err();
        let wrong_pw_err = svc.authenticate(&ctx, "user2@example.com", "wrong").await.unwrap_err();
        assert!(matches!(unknown_err, KernelError::InvalidCredentials));
        assert!(matches!(wrong_pw_err, KernelError::InvalidCredentials));
    }

    #[tokio::test]
    async fn lockout_triggers_after_max_attempts_e1() {
        let svc = service();
        let ctx = OperationContext::new();
        let identity = svc.provision(&ctx, "locktest@example.com", ProfileInput::default()).await.unwrap();
        svc.add_password(&ctx, identity.id, "secure-password").await.unwrap();

        assert!(matches!(
            svc.authenticate(&ctx, "locktest@example.com", "wrong").await.unwrap_err(),
            KernelError::InvalidCredentials
        ));
        assert!(matches!(
            svc.authenticate(&ctx, "locktest@example.com", "wrong").await.unwrap_err(),
            KernelError::InvalidCredentials
        ));
        // Third failure (max_attempts = 3) locks the account.
        assert!(matches!(
            svc.authenticate(&ctx, "locktest@example.com", "wrong").await.unwrap_err(),
            KernelError::InvalidCredentials
        ));
        assert!(matches!(
            svc.authenticate(&ctx, "locktest@example.com", "secure-password").await.unwrap_err(),
            KernelError::AccountLocked { .. }
        ));
    }

    #[tokio::test]
    async fn successful_login_resets_lockout_counter() {
        let svc = service();
        let ctx = OperationContext::new();
        let identity = svc.provision(&ctx, "reset@example.com", ProfileInput::default()).await.unwrap();
        svc.add_password(&ctx, identity.id, "secure-password").await.unwrap();

        let _ = svc.authenticate(&ctx, "reset@example.com", "wrong").await;
        svc.authenticate(&ctx, "reset@example.com", "secure-password").await.unwrap();

        let refreshed = svc.get_by_id(&ctx, identity.id).await.unwrap();
        assert_eq!(refreshed.failed_login_attempts, 0);
        assert!(refreshed.locked_until.is_none());
    }

    #[tokio::test]
    async fn change_password_requires_correct_old_password() {
        let svc = service();
        let ctx = OperationContext::new();
        let identity = svc.provision(&ctx, "change@example.com", ProfileInput::default()).await.unwrap();
        svc.add_password(&ctx, identity.id, "old-password").await.unwrap();

        assert!(svc.change_password(&ctx, identity.id, "wrong-old", "new-password").await.is_err());
        svc.change_password(&ctx, identity.id, "old-password", "new-password").await.unwrap();

        svc.authenticate(&ctx, "change@example.com", "new-password").await.unwrap();
    }
}
