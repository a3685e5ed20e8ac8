//! # Kernel Error Taxonomy
//!
//! A single error enum shared by every layer of the identity kernel. Each
//! variant corresponds to one of the closed categories in the kernel's error
//! design: not-found, conflict, credential failure, lockout, invalid input,
//! policy violation, access denial, and storage failure.
//!
//! ## Design Philosophy
//!
//! Same principle as the rest of the corpus this crate is grounded on: make
//! illegal states unrepresentable, and keep the mapping from domain failure
//! to error variant total and unambiguous. Unlike a typical web service's
//! error type, `KernelError` does **not** know about HTTP status codes or
//! response bodies - the kernel has no transport plane. Callers (an OIDC
//! gateway, a management API, a CLI) own that mapping.
//!
//! ## Error Categories
//!
//! | Category                 | Variant(s)                            |
//! |---------------------------|----------------------------------------|
//! | Not found                 | `NotFound`                             |
//! | Uniqueness conflict        | `AlreadyExists`                        |
//! | Authentication failure     | `InvalidCredentials`, `AccountLocked`   |
//! | Malformed input            | `InvalidInput`                         |
//! | Forbidden operation        | `SecurityViolation`                    |
//! | Authorization failure      | `AccessDenied`                         |
//! | Expiry / single-use        | `Expired`                              |
//! | Cooperative cancellation   | `Cancelled`                            |
//! | Underlying store failure   | `Storage`                              |

use std::fmt;
use thiserror::Error;

/// Result type alias used throughout the kernel.
///
/// ```rust,ignore
/// async fn provision(&self, ctx: &OperationContext, email: &str) -> KernelResult<Identity> { ... }
/// ```
pub type KernelResult<T> = Result<T, KernelError>;

/// Identifies which aggregate a `NotFound`/`AlreadyExists` error refers to.
///
/// Kept as a small closed enum (rather than a free-form string) so callers
/// can match on it without string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Identity,
    Credential,
    Tenant,
    Membership,
    Role,
    Assignment,
    Session,
    Client,
    AuthorizationCode,
    AccessToken,
    RefreshToken,
    Project,
    AuditEvent,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Identity => "identity",
            Self::Credential => "credential",
            Self::Tenant => "tenant",
            Self::Membership => "membership",
            Self::Role => "role",
            Self::Assignment => "assignment",
            Self::Session => "session",
            Self::Client => "client",
            Self::AuthorizationCode => "authorization_code",
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::Project => "project",
            Self::AuditEvent => "audit_event",
        };
        f.write_str(s)
    }
}

/// Workspace-wide error type for the identity kernel.
///
/// Every service and repository method returns `Result<T, KernelError>`.
/// Variants are grouped to match the taxonomy in the kernel's design: each
/// one maps to exactly one failure category, never more than one.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The aggregate doesn't exist, or exists but is soft-deleted.
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    /// A uniqueness invariant would be violated by this write.
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: ResourceKind, id: String },

    /// Authentication failed. Deliberately indistinguishable from
    /// "no such user" - see `IdentityService::authenticate`.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authentication failed because the account is presently locked out.
    #[error("account locked until {until}")]
    AccountLocked { until: chrono::DateTime<chrono::Utc> },

    /// A server-side session or code has expired (or its idle timeout
    /// elapsed) and has been invalidated.
    #[error("{kind} expired")]
    Expired { kind: ResourceKind },

    /// Malformed input: bad email, weak password, non-absolute redirect
    /// URI, unknown scope, invalid role name, invalid tenant name, etc.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A policy-forbidden operation, e.g. an owner attempting to revoke
    /// their own ownership.
    #[error("security violation: {message}")]
    SecurityViolation { message: String },

    /// Caller lacks the permission required for this operation.
    #[error("access denied")]
    AccessDenied,

    /// The calling context was cancelled before the operation completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Underlying repository/store failure. Wraps the store's error
    /// message; the cause itself is not required to be `'static` so any
    /// backend (sqlx, an in-memory mock, ...) can produce one cheaply.
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl KernelError {
    /// Stable, machine-readable error code. Used by callers that need to
    /// branch on error category, and folded into audit event metadata.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountLocked { .. } => "ACCOUNT_LOCKED",
            Self::Expired { .. } => "EXPIRED",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::SecurityViolation { .. } => "SECURITY_VIOLATION",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::Cancelled => "CANCELLED",
            Self::Storage { .. } => "STORAGE_ERROR",
        }
    }

    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn already_exists(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::AlreadyExists { kind, id: id.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub fn security_violation(message: impl Into<String>) -> Self {
        Self::SecurityViolation { message: message.into() }
    }

    /// Wraps any displayable storage-layer error (sqlx, an in-memory
    /// backend's own error type, ...) without taking a hard dependency on
    /// a specific driver crate from this shared layer.
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage { message: message.to_string() }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_screaming_snake_case() {
        assert_eq!(KernelError::InvalidCredentials.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(
            KernelError::not_found(ResourceKind::Identity, "abc").error_code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn not_found_display_includes_kind_and_id() {
        let err = KernelError::not_found(ResourceKind::Tenant, "t-123");
        assert_eq!(err.to_string(), "tenant not found: t-123");
    }
}
