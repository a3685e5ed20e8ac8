//! # OAuth2 Code & Token Entities
//!
//! [`AuthorizationCode`], [`AccessToken`], and [`RefreshToken`] back the
//! OAuth2 authorization code flow. The kernel never signs or encodes a JWT
//! (spec §1 Non-goals, "token signing/JWS") - these are opaque, hashed,
//! store-backed bearer credentials, the same shape as [`super::session`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Single-use code for the OAuth2 authorization code grant (spec §3
/// `Authorization Code`). `is_used` is monotone: `false → true` only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthorizationCode {
    pub id: Uuid,
    pub code: String,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub redirect_uri: String,
    pub scope: String,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
}

impl AuthorizationCode {
    /// Usable iff unexpired and not already redeemed (spec §3).
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && now < self.expires_at
    }
}

/// Bearer access token. Only `token_hash` - never the bearer value itself -
/// is persisted (spec §3 `Access Token`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessToken {
    pub id: Uuid,
    pub token_hash: String,
    pub tenant_id: Option<Uuid>,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }
}

/// Bearer refresh token, same shape and invariants as [`AccessToken`] (spec
/// §3 `Refresh Token`): `token_hash` unique, revocation monotone.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token_hash: String,
    pub tenant_id: Option<Uuid>,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_code_unusable_once_used() {
        let mut code = AuthorizationCode {
            id: Uuid::now_v7(),
            code: "abc".into(),
            client_id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            redirect_uri: "https://example.test/cb".into(),
            scope: "openid".into(),
            state: None,
            nonce: None,
            code_challenge: None,
            code_challenge_method: None,
            expires_at: Utc::now() + chrono::Duration::minutes(5),
            is_used: false,
            used_at: None,
        };
        assert!(code.is_usable(Utc::now()));
        code.is_used = true;
        assert!(!code.is_usable(Utc::now()));
    }

    #[test]
    fn authorization_code_unusable_once_expired() {
        let code = AuthorizationCode {
            id: Uuid::now_v7(),
            code: "abc".into(),
            client_id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            redirect_uri: "https://example.test/cb".into(),
            scope: "openid".into(),
            state: None,
            nonce: None,
            code_challenge: None,
            code_challenge_method: None,
            expires_at: Utc::now() - chrono::Duration::seconds(1),
            is_used: false,
            used_at: None,
        };
        assert!(!code.is_usable(Utc::now()));
    }
}
