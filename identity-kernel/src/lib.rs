//! # Identity & Authorization Kernel
//!
//! Domain library for a multi-tenant identity provider: identity and
//! credential management, scoped RBAC authorization, tenant lifecycle
//! orchestration, OAuth2 client/token/code management, and an audit
//! subsystem. No transport plane lives here - no HTTP handlers, no JWT
//! signing, no OIDC discovery document. Those are a consumer's concern;
//! this crate hands back domain objects and `Result`s.
//!
//! ## Modules
//!
//! | Module | Purpose | Key Types |
//! |--------|---------|-----------|
//! | [`domain`] | Canonical entities and invariants | [`domain::Identity`], [`domain::Tenant`], [`domain::Role`] |
//! | [`repository`] | Persistence contracts, postgres + in-memory impls | [`repository::IdentityRepository`] |
//! | [`service`] | Use-case layer built on the repository traits | [`service::IdentityService`], [`service::TenantOrchestrator`] |
//! | [`audit`] | Dual-sink audit logging | [`audit::AuditLogger`] |
//! | [`context`] | Request identity and cooperative cancellation | [`context::OperationContext`] |
//! | [`seed`] | Deterministic seed data (the three tenant-scope roles) | [`seed::seeded_tenant_roles`] |
//!
//! ## Design Decisions
//!
//! 1. **Repository pattern throughout**: every service depends on `Arc<dyn
//!    Trait>`, never a concrete postgres or in-memory struct, so a
//!    downstream consumer can test against the in-memory implementations
//!    without standing up a database.
//! 2. **Every mutation is cancellable and traceable**: repository methods
//!    take `&OperationContext` first and check it for cancellation before
//!    doing work; every state change that matters to an operator emits an
//!    audit event alongside its structured log line.
//! 3. **Privacy-preserving identity lookup**: identities are looked up by
//!    an HMAC of their email, never the plaintext, so the store never
//!    becomes a reverse lookup table for "does this email have an
//!    account".
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use identity_kernel::context::OperationContext;
//! use identity_kernel::service::IdentityService;
//!
//! let ctx = OperationContext::new();
//! let identity = identity_service.provision(&ctx, "user@example.com", Default::default()).await?;
//! ```

pub mod audit;
pub mod context;
pub mod domain;
pub mod repository;
pub mod seed;
pub mod service;

pub use context::OperationContext;
