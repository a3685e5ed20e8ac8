//! # Identity & Credential Entities
//!
//! An [`Identity`] is a globally unique actor, looked up by
//! [`kernel_shared::crypto::email_hash`], never by plaintext email. See
//! spec §3 for the full invariant list; the ones enforced in this module
//! rather than at the repository layer are: `email_hash` is always
//! computed (never accepted raw from a caller), and `failed_login_attempts`
//! / `locked_until` only ever change through the lockout transitions in
//! [`crate::service::identity_service`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Optional profile attributes supplied on provisioning or update.
///
/// Every field is optional: `provision` fills in a nickname and picture
/// when absent (spec §4.2), everything else stays `None` until the identity
/// updates its own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub full_name: Option<String>,
    pub nickname: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
}

/// Complete identity record as stored.
///
/// `email_plain` is PII, unindexed, and nullable - lookups never use it.
/// `hashed_password` is deliberately absent here: password material lives
/// in a separate [`Credential`] row, not inline on the identity (spec §3,
/// "at most one credential per identity").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub email_hash: String,
    pub email_plain: Option<String>,
    pub email_verified: bool,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub full_name: Option<String>,
    pub nickname: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// True while `locked_until` is set and in the future.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.map(|until| until > now).unwrap_or(false)
    }

    /// Projects the full record down to the fields safe to hand to a
    /// transport plane - no `email_plain`, no lockout counters. Mirrors the
    /// `User` → `UserProfile` split this kernel is grounded on, generalized
    /// to identities (spec §3 **[EXPANSION]**).
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            email_verified: self.email_verified,
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
            full_name: self.full_name.clone(),
            nickname: self.nickname.clone(),
            picture: self.picture.clone(),
            locale: self.locale.clone(),
            timezone: self.timezone.clone(),
        }
    }
}

/// Sanitized identity projection with no PII and no lockout state - safe to
/// return from read-only, non-privileged operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub email_verified: bool,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub full_name: Option<String>,
    pub nickname: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
}

/// Data required to provision a new identity (spec §4.2 `provision`).
#[derive(Debug, Clone, Default)]
pub struct NewIdentity {
    pub email_plain: String,
    pub profile: ProfileInput,
}

/// Authentication proof for an identity (spec §3 `Credential`).
///
/// `password_hash` is always a self-describing Argon2id PHC string -
/// see [`kernel_shared::crypto::password`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    pub identity_id: Uuid,
    pub password_hash: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_identity() -> Identity {
        Identity {
            id: Uuid::now_v7(),
            email_hash: "deadbeef".into(),
            email_plain: Some("user@example.com".into()),
            email_verified: false,
            given_name: None,
            family_name: None,
            full_name: None,
            nickname: Some("user".into()),
            picture: None,
            locale: None,
            timezone: None,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn public_profile_omits_email_plain() {
        let identity = sample_identity();
        let profile = identity.public_profile();
        assert_eq!(profile.nickname.as_deref(), Some("user"));
    }

    #[test]
    fn is_locked_at_respects_future_vs_past_timestamps() {
        let mut identity = sample_identity();
        let now = Utc::now();
        identity.locked_until = Some(now + chrono::Duration::minutes(5));
        assert!(identity.is_locked_at(now));

        identity.locked_until = Some(now - chrono::Duration::minutes(5));
        assert!(!identity.is_locked_at(now));
    }
}
