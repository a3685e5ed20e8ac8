//! # Session Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Distinguishes sessions issued by different planes (spec Glossary
/// "Namespace (session)") so, e.g., an admin-plane session and an
/// auth-plane session for the same user don't collide if both end up in a
/// cookie jar keyed only by session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionNamespace {
    Auth,
    Admin,
}

impl SessionNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionNamespace::Auth => "auth",
            SessionNamespace::Admin => "admin",
        }
    }
}

impl std::str::FromStr for SessionNamespace {
    type Err = kernel_shared::errors::KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(SessionNamespace::Auth),
            "admin" => Ok(SessionNamespace::Admin),
            other => Err(kernel_shared::errors::KernelError::invalid_input(format!(
                "unknown session namespace: {other}"
            ))),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for SessionNamespace {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for SessionNamespace {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for SessionNamespace {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

/// Server-side authenticated state (spec §3 `Session`).
///
/// `id` itself is the opaque, unguessable bearer token - a 32-byte
/// CSPRNG value, URL-safe base64 encoded (see
/// [`kernel_shared::crypto::token::generate_session_token`]). Validity is a
/// service-layer concern (spec §4.3 `get`), not enforced by this struct.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub tenant_id: Option<Uuid>,
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub namespace: SessionNamespace,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid iff `now < expires_at` AND `now - last_seen_at <=
    /// idle_timeout` (spec §4.3 `get`).
    pub fn is_valid(&self, now: DateTime<Utc>, idle_timeout: chrono::Duration) -> bool {
        now < self.expires_at && (now - self.last_seen_at) <= idle_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_in: chrono::Duration, last_seen_ago: chrono::Duration) -> Session {
        let now = Utc::now();
        Session {
            id: "token".into(),
            tenant_id: None,
            user_id: Uuid::now_v7(),
            ip_address: None,
            user_agent: None,
            namespace: SessionNamespace::Auth,
            expires_at: now + expires_in,
            created_at: now,
            last_seen_at: now - last_seen_ago,
        }
    }

    #[test]
    fn valid_within_expiry_and_idle_window() {
        let s = session(chrono::Duration::hours(1), chrono::Duration::minutes(5));
        assert!(s.is_valid(Utc::now(), chrono::Duration::minutes(30)));
    }

    #[test]
    fn invalid_past_absolute_expiry() {
        let s = session(chrono::Duration::seconds(-1), chrono::Duration::seconds(0));
        assert!(!s.is_valid(Utc::now(), chrono::Duration::minutes(30)));
    }

    #[test]
    fn invalid_past_idle_timeout() {
        let s = session(chrono::Duration::hours(1), chrono::Duration::minutes(45));
        assert!(!s.is_valid(Utc::now(), chrono::Duration::minutes(30)));
    }
}
