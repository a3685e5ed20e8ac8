//! # Identity Kernel - Shared Library
//!
//! L0 ambient stack shared by the identity/authorization kernel: crypto
//! primitives, ID generation, configuration, error taxonomy, and structured
//! logging. Nothing in this crate knows about identities, tenants, or roles -
//! those concepts live one layer up, in `identity-kernel`.
//!
//! ## Modules
//!
//! | Module | Purpose | Key Types |
//! |--------|---------|-----------|
//! | [`crypto`] | Password hashing, email hashing, opaque tokens | [`crypto::PasswordHasher`] |
//! | [`id`] | Time-ordered ID generation | [`id::new_id`] |
//! | [`config`] | Environment-based configuration | [`KernelConfig`] |
//! | [`errors`] | Standardized error taxonomy | [`KernelError`], [`KernelResult`] |
//! | [`tracing_config`] | Structured logging setup | [`tracing_config::init_tracing`] |
//!
//! ## Design Decisions
//!
//! 1. **Single source of truth**: crypto, ids, config, and errors live here
//!    once so every repository and service implementation agrees on them.
//! 2. **Transport agnostic**: this crate (and the kernel built on it) has no
//!    opinion on HTTP, gRPC, or any other transport - that's a consumer's
//!    concern, not the kernel's.
//! 3. **Security first**: password and token handling follow OWASP guidance.
//! 4. **Observable by default**: structured logging built in.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use kernel_shared::{KernelConfig, crypto::PasswordHasher};
//!
//! let config = KernelConfig::from_env()?;
//! let hasher = PasswordHasher::new(&config.password);
//! let hash = hasher.hash("correct horse battery staple")?;
//! ```

pub mod config;
pub mod crypto;
pub mod errors;
pub mod id;
pub mod tracing_config;

// Re-exports for convenience - import commonly used types directly from `kernel_shared`
pub use config::KernelConfig;
pub use errors::{KernelError, KernelResult};
pub use id::new_id;
