//! In-memory [`AuthorizationCodeRepository`], [`AccessTokenRepository`],
//! [`RefreshTokenRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::oauth::{AccessToken, AuthorizationCode, RefreshToken};
use crate::repository::oauth_repository::{AccessTokenRepository, AuthorizationCodeRepository, RefreshTokenRepository};

#[derive(Debug, Default, Clone)]
pub struct InMemoryAuthorizationCodeRepository {
    codes: Arc<Mutex<HashMap<Uuid, AuthorizationCode>>>,
}

impl InMemoryAuthorizationCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorizationCodeRepository for InMemoryAuthorizationCodeRepository {
    async fn create(&self, ctx: &OperationContext, code: AuthorizationCode) -> KernelResult<AuthorizationCode> {
        ctx.check_cancelled()?;
        let mut codes = self.codes.lock().await;
        codes.insert(code.id, code.clone());
        Ok(code)
    }

    async fn get_by_code(&self, ctx: &OperationContext, code: &str) -> KernelResult<Option<AuthorizationCode>> {
        ctx.check_cancelled()?;
        let codes = self.codes.lock().await;
        Ok(codes.values().find(|c| c.code == code).cloned())
    }

    async fn mark_as_used(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut codes = self.codes.lock().await;
        let code = codes
            .get_mut(&id)
            .ok_or_else(|| KernelError::not_found(ResourceKind::AuthorizationCode, id.to_string()))?;
        // Atomic single-use enforcement: once true, stays true (spec §3).
        code.is_used = true;
        code.used_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64> {
        ctx.check_cancelled()?;
        let now = Utc::now();
        let mut codes = self.codes.lock().await;
        let before = codes.len();
        codes.retain(|_, c| c.expires_at > now);
        Ok((before - codes.len()) as u64)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryAccessTokenRepository {
    tokens: Arc<Mutex<HashMap<Uuid, AccessToken>>>,
}

impl InMemoryAccessTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryAccessTokenRepository {
    async fn create(&self, ctx: &OperationContext, token: AccessToken) -> KernelResult<AccessToken> {
        ctx.check_cancelled()?;
        let mut tokens = self.tokens.lock().await;
        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn get_by_token_hash(&self, ctx: &OperationContext, token_hash: &str) -> KernelResult<Option<AccessToken>> {
        ctx.check_cancelled()?;
        let tokens = self.tokens.lock().await;
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn revoke(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut tokens = self.tokens.lock().await;
        if let Some(token) = tokens.get_mut(&id) {
            token.revoked = true;
            token.revoked_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64> {
        ctx.check_cancelled()?;
        let now = Utc::now();
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryRefreshTokenRepository {
    tokens: Arc<Mutex<HashMap<Uuid, RefreshToken>>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, ctx: &OperationContext, token: RefreshToken) -> KernelResult<RefreshToken> {
        ctx.check_cancelled()?;
        let mut tokens = self.tokens.lock().await;
        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn get_by_token_hash(&self, ctx: &OperationContext, token_hash: &str) -> KernelResult<Option<RefreshToken>> {
        ctx.check_cancelled()?;
        let tokens = self.tokens.lock().await;
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn revoke(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut tokens = self.tokens.lock().await;
        if let Some(token) = tokens.get_mut(&id) {
            token.revoked = true;
            token.revoked_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64> {
        ctx.check_cancelled()?;
        let now = Utc::now();
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}
