//! # In-Memory Repository Implementations
//!
//! `tokio::sync::Mutex`-guarded `HashMap`-backed implementations of every
//! repository trait in [`crate::repository`]. Used by this crate's own
//! unit and scenario tests; exported so downstream consumers can build
//! their own tests against the kernel without standing up Postgres.

pub mod assignment_repository;
pub mod audit_repository;
pub mod client_repository;
pub mod identity_repository;
pub mod membership_repository;
pub mod oauth_repository;
pub mod project_repository;
pub mod role_repository;
pub mod session_repository;
pub mod tenant_repository;

pub use assignment_repository::InMemoryAssignmentRepository;
pub use audit_repository::InMemoryAuditRepository;
pub use client_repository::InMemoryClientRepository;
pub use identity_repository::InMemoryIdentityRepository;
pub use membership_repository::InMemoryMembershipRepository;
pub use oauth_repository::{InMemoryAccessTokenRepository, InMemoryAuthorizationCodeRepository, InMemoryRefreshTokenRepository};
pub use project_repository::InMemoryProjectRepository;
pub use role_repository::InMemoryRoleRepository;
pub use session_repository::InMemorySessionRepository;
pub use tenant_repository::InMemoryTenantRepository;
