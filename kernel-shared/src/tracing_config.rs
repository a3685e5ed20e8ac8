//! # Tracing and Structured Logging Configuration
//!
//! Initializes the logging system with environment-appropriate settings.
//!
//! ## What is Tracing?
//!
//! [Tracing](https://docs.rs/tracing/) is Rust's modern approach to logging.
//! Unlike traditional logging, tracing provides:
//!
//! - **Structured data**: Key-value pairs instead of just strings
//! - **Spans**: Track the execution of an operation
//! - **Context propagation**: Trace a call across async tasks
//!
//! ## Output Formats
//!
//! | Environment | Format | Purpose |
//! |-------------|--------|---------|
//! | Development | Pretty | Human-readable, colored output |
//! | Production | JSON | Machine-parseable for log aggregation |
//!
//! ### Development Output Example
//!
//! ```text
//! 2024-01-15T10:30:00.123456Z  INFO identity_kernel::service: identity provisioned
//!     at src/service/identity_service.rs:42
//!     identity_id: "0190f6c2-7b3a-7f2e-9c41-1a2b3c4d5e6f"
//!     email_hash: "3f79bb7b435b05321651daefd374cdc6"
//! ```
//!
//! ### Production Output Example (JSON)
//!
//! ```json
//! {
//!   "timestamp": "2024-01-15T10:30:00.123456Z",
//!   "level": "INFO",
//!   "target": "identity_kernel::service",
//!   "message": "identity provisioned",
//!   "identity_id": "0190f6c2-7b3a-7f2e-9c41-1a2b3c4d5e6f",
//!   "file": "src/service/identity_service.rs",
//!   "line": 42
//! }
//! ```
//!
//! ## Log Levels
//!
//! | Level | When to Use | Default Enabled |
//! |-------|-------------|-----------------|
//! | ERROR | Something failed that shouldn't | Always |
//! | WARN | Recoverable issues, degraded service | Always |
//! | INFO | Significant events (provisioning, role changes, lockouts) | Always |
//! | DEBUG | Detailed troubleshooting info | Dev only |
//! | TRACE | Very verbose, step-by-step | Never by default |
//!
//! ## Filter Configuration
//!
//! Control verbosity via `RUST_LOG` environment variable:
//!
//! ```bash
//! # All debug
//! RUST_LOG=debug
//!
//! # Info for most, debug for our code
//! RUST_LOG=info,identity_kernel=debug
//!
//! # Silence noisy crates
//! RUST_LOG=info,sqlx=warn
//! ```
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use kernel_shared::tracing_config::init_tracing;
//!
//! fn main() {
//!     // Initialize once at startup
//!     init_tracing("identity-kernel", false);
//!
//!     // Now use tracing macros anywhere
//!     tracing::info!(identity_id = %id, "identity provisioned");
//! }
//! ```
//!
//! ## Best Practices
//!
//! 1. **Use structured fields**: `info!(identity_id = %id, "provisioned")` not `info!("Identity {} provisioned", id)`
//! 2. **Use spans for operations**: Track an operation's lifecycle with spans
//! 3. **Don't log sensitive data**: Passwords, tokens, PII (see [`crate::audit`](../identity_kernel/audit/index.html) redaction)
//! 4. **Use appropriate levels**: INFO for business events, DEBUG for troubleshooting
//!
//! ## Related Documentation
//!
//! - [tracing crate](https://docs.rs/tracing/)
//! - [tracing-subscriber crate](https://docs.rs/tracing-subscriber/)

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

// =============================================================================
// Initialization
// =============================================================================

/// Initializes the tracing/logging system.
///
/// This should be called **once** at the very start of a binary embedding
/// this kernel, before any other code that might emit logs.
///
/// ## Parameters
///
/// - `service_name`: Name of the embedding service (for identification in logs)
/// - `is_production`: If true, outputs JSON; if false, outputs pretty format
///
/// ## Environment Variables
///
/// - `RUST_LOG`: Controls log filter (e.g., "info,identity_kernel=debug")
///
/// ## Defaults
///
/// If `RUST_LOG` is not set:
/// - Production: `info`
/// - Development: `debug,sqlx=warn`
pub fn init_tracing(service_name: &str, is_production: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("debug,sqlx=warn")
        }
    });

    if is_production {
        // Production: JSON structured output, parseable by log aggregation tools
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .init();
    } else {
        // Development: pretty, colorized, human-readable output
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    }

    tracing::info!(
        service = service_name,
        production = is_production,
        "tracing initialized"
    );
}

// =============================================================================
// Helper Macros
// =============================================================================

/// Creates a span for tracking a kernel operation.
///
/// Pairs with [`crate::context::OperationContext`]'s request id so every log
/// line emitted during an operation - across repository calls, audit writes,
/// and the final result - can be correlated back to one caller-supplied id.
///
/// ## Example
///
/// ```rust,ignore
/// use kernel_shared::operation_span;
///
/// let span = operation_span!(ctx.request_id(), "provision_identity");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! operation_span {
    ($request_id:expr, $operation:expr) => {
        tracing::info_span!(
            "operation",
            request_id = %$request_id,
            operation = %$operation,
        )
    };
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Logs an error with context.
///
/// Use this for consistent error logging format across the crate.
pub fn log_error<E: std::fmt::Display>(error: &E, context: &str) {
    tracing::error!(error = %error, context = context, "error occurred");
}

/// Logs a warning with context.
///
/// Use this for recoverable issues that should be monitored.
pub fn log_warning(message: &str, context: &str) {
    tracing::warn!(message = message, context = context, "warning");
}
