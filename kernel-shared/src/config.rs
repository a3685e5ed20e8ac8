//! # Kernel Configuration
//!
//! Centralized configuration for the identity kernel's tunable knobs:
//! Argon2id parameters, the HMAC email-hashing key, lockout thresholds,
//! and session lifetimes. Everything else the kernel needs (the OIDC
//! scope catalog) is a fixed constant, not configuration - see
//! `identity_kernel::domain::permissions::OIDC_SCOPES`.
//!
//! ## How It Works
//!
//! Configuration is loaded from multiple sources in order of precedence:
//!
//! 1. **Default values** - conservative, OWASP-aligned defaults
//! 2. **`.env` file** - local overrides (git-ignored)
//! 3. **Environment variables** - container/orchestrator configuration
//!
//! ## Environment Variable Format
//!
//! Variables use the `KERNEL_` prefix with `__` as the nested separator:
//!
//! ```bash
//! KERNEL_PASSWORD__MEMORY_KIB=65536
//! KERNEL_IDENTITY__LOCKOUT__MAX_ATTEMPTS=5
//! KERNEL_SESSION__IDLE_TIMEOUT_SECONDS=1800
//! # The HMAC key is read from its own variable, never logged:
//! IDENTITY_HMAC_KEY=change-me-in-production
//! ```
//!
//! ## Security Notes
//!
//! - `identity.hmac_key` is process-wide and immutable after init (see
//!   kernel concurrency model, §5). Rotating it makes every existing
//!   `email_hash` unreachable by email lookup - treat it like a
//!   signing key, not an app setting.
//! - Never commit `.env` files with real secrets.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Root configuration for the identity kernel.
///
/// Constructed once at process startup (by the consuming transport plane)
/// and shared via `Arc` with every service.
#[derive(Debug, Clone, Deserialize)]
pub struct KernelConfig {
    /// Argon2id parameters for password hashing.
    pub password: Argon2Config,

    /// Identity provisioning and lockout settings.
    pub identity: IdentityConfig,

    /// Server-side session lifetime settings.
    pub session: SessionConfig,
}

/// Argon2id tuning parameters (spec §6 Configuration: `password.argon2`).
///
/// Defaults match the OWASP-recommended values this kernel was grounded
/// on: 64 MiB memory, 3 iterations, 4-way parallelism.
#[derive(Debug, Clone, Deserialize)]
pub struct Argon2Config {
    /// Memory cost in KiB. Default: 65536 (64 MiB).
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    /// Time cost (iteration count). Default: 3.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Degree of parallelism (lanes). Default: 4.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Salt length in bytes. Default: 16.
    #[serde(default = "default_salt_len")]
    pub salt_len: usize,

    /// Output hash length in bytes. Default: 32.
    #[serde(default = "default_key_len")]
    pub key_len: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
            salt_len: default_salt_len(),
            key_len: default_key_len(),
        }
    }
}

/// Identity provisioning and brute-force lockout configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Process-wide HMAC key used to derive `email_hash`. Read raw
    /// (not base64) from `IDENTITY_HMAC_KEY`; treat as a secret.
    #[serde(default)]
    pub hmac_key: String,

    /// Lockout thresholds.
    pub lockout: LockoutConfig,
}

/// Brute-force lockout configuration (spec §4.2 lockout state machine).
#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    /// Consecutive failed attempts before locking the account.
    /// Default: 5.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// How long an account stays locked, in seconds. Default: 900 (15m).
    #[serde(default = "default_lockout_duration_seconds")]
    pub duration_seconds: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            duration_seconds: default_lockout_duration_seconds(),
        }
    }
}

/// Server-side session lifetime configuration (spec §4.3).
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Absolute session lifetime in seconds. Default: 86400 (24h).
    #[serde(default = "default_session_lifetime_seconds")]
    pub lifetime_seconds: i64,

    /// Idle timeout in seconds. Default: 1800 (30m).
    #[serde(default = "default_idle_timeout_seconds")]
    pub idle_timeout_seconds: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_seconds: default_session_lifetime_seconds(),
            idle_timeout_seconds: default_idle_timeout_seconds(),
        }
    }
}

impl KernelConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Process
    ///
    /// 1. Loads a `.env` file if present (silently ignored if missing).
    /// 2. Applies conservative defaults.
    /// 3. Overrides with `KERNEL_*` environment variables.
    /// 4. Reads `IDENTITY_HMAC_KEY` directly (unprefixed, like the
    ///    teacher stack's `DATABASE_URL`/`JWT_SECRET` convention).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is present but fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("password.memory_kib", default_memory_kib())?
            .set_default("password.iterations", default_iterations())?
            .set_default("password.parallelism", default_parallelism())?
            .set_default("password.salt_len", default_salt_len() as i64)?
            .set_default("password.key_len", default_key_len() as i64)?
            .set_default("identity.lockout.max_attempts", default_max_attempts())?
            .set_default(
                "identity.lockout.duration_seconds",
                default_lockout_duration_seconds(),
            )?
            .set_default(
                "session.lifetime_seconds",
                default_session_lifetime_seconds(),
            )?
            .set_default(
                "session.idle_timeout_seconds",
                default_idle_timeout_seconds(),
            )?
            .add_source(
                Environment::with_prefix("KERNEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("identity.hmac_key", std::env::var("IDENTITY_HMAC_KEY").ok())?
            .build()?;

        let mut cfg: KernelConfig = config.try_deserialize()?;
        if cfg.identity.hmac_key.is_empty() {
            cfg.identity.hmac_key = std::env::var("IDENTITY_HMAC_KEY").unwrap_or_default();
        }
        Ok(cfg)
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_memory_kib() -> u32 {
    64 * 1024
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

fn default_salt_len() -> usize {
    16
}

fn default_key_len() -> usize {
    32
}

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout_duration_seconds() -> i64 {
    15 * 60
}

fn default_session_lifetime_seconds() -> i64 {
    24 * 60 * 60
}

fn default_idle_timeout_seconds() -> i64 {
    30 * 60
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_defaults_match_owasp_recommendation() {
        let cfg = Argon2Config::default();
        assert_eq!(cfg.memory_kib, 65536);
        assert_eq!(cfg.iterations, 3);
        assert_eq!(cfg.parallelism, 4);
    }

    #[test]
    fn lockout_defaults() {
        let cfg = LockoutConfig::default();
        assert_eq!(cfg.max_attempts, 5);
        assert_eq!(cfg.duration_seconds, 900);
    }

    #[test]
    fn session_defaults() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.lifetime_seconds, 86400);
        assert_eq!(cfg.idle_timeout_seconds, 1800);
    }
}
