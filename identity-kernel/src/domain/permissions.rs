//! # Permission Scope & OIDC Scope Catalogs
//!
//! Two distinct, closed vocabularies live here and should not be confused:
//!
//! - [`Scope`] - the three levels at which a [`Role`](super::role::Role) can
//!   apply (platform / tenant / client). This is the "scope tag" set spec'd
//!   as part of the L0 permission catalog.
//! - [`OIDC_SCOPES`] - the fixed OpenID Connect scope strings a client may
//!   request (`openid`, `profile`, ...), unrelated to [`Scope`] despite the
//!   shared English word.
//!
//! Permission strings themselves (`"tenant:manage_users"`, `"edit:stuff"`,
//! the wildcard `*`, ...) are not drawn from a fixed enum in this kernel -
//! the source corpus never enumerates a closed permission vocabulary beyond
//! examples, so they are modelled as plain `String`s compared for exact
//! equality or against the wildcard. See `DESIGN.md` for this call.

use serde::{Deserialize, Serialize};

/// The wildcard permission string: satisfies every `has_permission` check
/// for a matching assignment (spec §4.4).
pub const WILDCARD_PERMISSION: &str = "*";

/// The level at which a [`Role`](super::role::Role) applies, and therefore
/// at which an [`Assignment`](super::assignment::Assignment) grants it.
///
/// `Platform` is special: an assignment at this scope matches unconditionally
/// regardless of the scope/context a permission check is made against (spec
/// §4.4 step 2, "platform admins have global authority across all scopes").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Platform,
    Tenant,
    Client,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Platform => "platform",
            Scope::Tenant => "tenant",
            Scope::Client => "client",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = kernel_shared::errors::KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "platform" => Ok(Scope::Platform),
            "tenant" => Ok(Scope::Tenant),
            "client" => Ok(Scope::Client),
            other => Err(kernel_shared::errors::KernelError::invalid_input(format!(
                "unknown scope: {other}"
            ))),
        }
    }
}

// Scope is persisted as a plain TEXT column (`platform`/`tenant`/`client`);
// these impls let `sqlx::query_as`/`FromRow` decode it directly instead of
// every repository mapping a raw `String` by hand.
impl sqlx::Type<sqlx::Postgres> for Scope {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Scope {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Scope {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

/// The closed set of OpenID Connect scopes a client's `allowed_scopes` may
/// draw from (spec §4.6, `validate_oidc_scopes`).
pub const OIDC_SCOPES: &[&str] = &["openid", "profile", "email", "address", "phone", "offline_access"];

/// Validates a list of requested scopes against the closed OIDC catalog.
///
/// Requires `openid` to be present (the defining scope of an OIDC request)
/// and every scope to be a member of [`OIDC_SCOPES`].
pub fn validate_oidc_scopes(requested: &[String]) -> Result<(), kernel_shared::errors::KernelError> {
    use kernel_shared::errors::KernelError;

    if !requested.iter().any(|s| s == "openid") {
        return Err(KernelError::invalid_input("invalid_scope: openid required"));
    }
    for scope in requested {
        if !OIDC_SCOPES.contains(&scope.as_str()) {
            return Err(KernelError::invalid_input(format!("invalid_scope: {scope}")));
        }
    }
    Ok(())
}

/// Validates requested scopes against a client's own `allowed_scopes` list
/// (spec §4.6, `validate_scope`). Splitting on whitespace is the caller's
/// job when scopes arrive as a single space-delimited string; this function
/// takes the already-split token list.
pub fn validate_client_scope(allowed: &[String], requested: &[String]) -> bool {
    if allowed.iter().any(|s| s == WILDCARD_PERMISSION) {
        return true;
    }
    requested.iter().all(|token| allowed.iter().any(|a| a == token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oidc_scopes_require_openid() {
        assert!(validate_oidc_scopes(&["openid".into(), "profile".into()]).is_ok());
        assert!(validate_oidc_scopes(&["profile".into()]).is_err());
    }

    #[test]
    fn oidc_scopes_reject_unknown_members() {
        let err = validate_oidc_scopes(&["openid".into(), "unknown".into()]).unwrap_err();
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn client_scope_validation_honors_wildcard() {
        let allowed = vec!["*".to_string()];
        assert!(validate_client_scope(&allowed, &["anything".into()]));
    }

    #[test]
    fn client_scope_validation_rejects_unlisted_scope() {
        let allowed = vec!["read".to_string()];
        assert!(!validate_client_scope(&allowed, &["write".into()]));
    }

    #[test]
    fn empty_request_is_trivially_valid() {
        let allowed = vec!["read".to_string()];
        assert!(validate_client_scope(&allowed, &[]));
    }

    #[test]
    fn scope_round_trips_through_display_and_from_str() {
        for scope in [Scope::Platform, Scope::Tenant, Scope::Client] {
            let parsed: Scope = scope.to_string().parse().unwrap();
            assert_eq!(parsed, scope);
        }
    }
}
