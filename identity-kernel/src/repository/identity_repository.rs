//! # Identity Repository Contract

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::identity::{Credential, Identity, NewIdentity};

/// Persistence operations for the [`Identity`] aggregate (spec §6).
///
/// Every method receives `&OperationContext` first and returns
/// `KernelResult<T>`; `get_by_*` methods return `Ok(None)` for a missing or
/// soft-deleted identity rather than an error - callers decide whether
/// absence is exceptional.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn create(&self, ctx: &OperationContext, email_hash: String, new_identity: NewIdentity) -> KernelResult<Identity>;

    async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Option<Identity>>;

    async fn get_by_hash(&self, ctx: &OperationContext, email_hash: &str) -> KernelResult<Option<Identity>>;

    async fn update(&self, ctx: &OperationContext, identity: Identity) -> KernelResult<Identity>;

    /// Updates the lockout state fields only. Kept separate from `update`
    /// because lockout transitions are last-writer-wins under concurrent
    /// failed logins (spec §5) and should not be bundled with a broader
    /// profile update that might race independently.
    async fn update_lockout(
        &self,
        ctx: &OperationContext,
        user_id: Uuid,
        failed_attempts: i32,
        locked_until: Option<chrono::DateTime<chrono::Utc>>,
    ) -> KernelResult<()>;

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()>;

    async fn get_credentials(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<Option<Credential>>;

    /// Strict create-only entry point: fails with `already_exists` if a
    /// credential already exists for this identity (spec §3 "at most one
    /// credential per identity"). See [`Self::update_password`] for the
    /// upsert variant backing `set_password`.
    async fn add_credentials(&self, ctx: &OperationContext, user_id: Uuid, password_hash: String) -> KernelResult<Credential>;

    /// Upserts the password hash for an identity - creates if absent,
    /// overwrites if present (spec §4.2 `set_password`).
    async fn update_password(&self, ctx: &OperationContext, user_id: Uuid, password_hash: String) -> KernelResult<Credential>;
}
