//! # Session Repository Contract

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::session::Session;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, ctx: &OperationContext, session: Session) -> KernelResult<Session>;

    async fn get(&self, ctx: &OperationContext, id: &str) -> KernelResult<Option<Session>>;

    async fn update(&self, ctx: &OperationContext, session: Session) -> KernelResult<Session>;

    async fn delete(&self, ctx: &OperationContext, id: &str) -> KernelResult<()>;

    async fn delete_by_user_id(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<()>;

    /// Physically removes every session whose `expires_at` has already
    /// passed - a maintenance sweep, not part of any single request path.
    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64>;
}
