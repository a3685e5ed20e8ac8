//! # Authorization Code & Token Repository Contracts

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::oauth::{AccessToken, AuthorizationCode, RefreshToken};

#[async_trait]
pub trait AuthorizationCodeRepository: Send + Sync {
    async fn create(&self, ctx: &OperationContext, code: AuthorizationCode) -> KernelResult<AuthorizationCode>;

    async fn get_by_code(&self, ctx: &OperationContext, code: &str) -> KernelResult<Option<AuthorizationCode>>;

    /// Marks the code used via a store-level atomic update so concurrent
    /// redemption attempts observe at most one success (spec §5).
    async fn mark_as_used(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()>;

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64>;
}

#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    async fn create(&self, ctx: &OperationContext, token: AccessToken) -> KernelResult<AccessToken>;

    async fn get_by_token_hash(&self, ctx: &OperationContext, token_hash: &str) -> KernelResult<Option<AccessToken>>;

    async fn revoke(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()>;

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, ctx: &OperationContext, token: RefreshToken) -> KernelResult<RefreshToken>;

    async fn get_by_token_hash(&self, ctx: &OperationContext, token_hash: &str) -> KernelResult<Option<RefreshToken>>;

    async fn revoke(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()>;

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64>;
}
