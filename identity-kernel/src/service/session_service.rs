//! # Session Service
//!
//! Server-side session lifecycle (spec §4.3). A session's id is itself the
//! opaque bearer token handed to the caller - see
//! [`kernel_shared::crypto::token::generate_session_token`].

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use kernel_shared::crypto::token::generate_session_token;
use kernel_shared::errors::{KernelResult, ResourceKind};
use tracing::info;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::session::{Session, SessionNamespace};
use crate::repository::session_repository::SessionRepository;

/// Session creation and validation service (spec §4.3).
#[derive(Clone)]
pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
    lifetime: ChronoDuration,
    idle_timeout: ChronoDuration,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository>, lifetime: ChronoDuration, idle_timeout: ChronoDuration) -> Self {
        Self {
            repository,
            lifetime,
            idle_timeout,
        }
    }

    /// Issues a new session (spec §4.3 `create`). The returned `Session::id`
    /// is the bearer token - callers are responsible for transporting it
    /// (cookie, header) however their transport plane sees fit.
    pub async fn create(
        &self,
        ctx: &OperationContext,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        namespace: SessionNamespace,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> KernelResult<Session> {
        let now = Utc::now();
        let session = Session {
            id: generate_session_token(),
            tenant_id,
            user_id,
            ip_address,
            user_agent,
            namespace,
            expires_at: now + self.lifetime,
            created_at: now,
            last_seen_at: now,
        };
        let created = self.repository.create(ctx, session).await?;
        info!(user_id = %user_id, namespace = %created.namespace.as_str(), "session created");
        Ok(created)
    }

    /// Looks up a session, validating both its absolute expiry and its idle
    /// timeout (spec §4.3 `get`). A session that has expired either way is
    /// deleted and treated as not found, rather than returned stale. Unlike
    /// `refresh`, a plain `get` never writes - reading a session must not
    /// itself slide its idle window forward.
    pub async fn get(&self, ctx: &OperationContext, id: &str) -> KernelResult<Option<Session>> {
        let Some(session) = self.repository.get(ctx, id).await? else {
            return Ok(None);
        };

        if !session.is_valid(Utc::now(), self.idle_timeout) {
            self.repository.delete(ctx, id).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Extends a still-valid session's idle window without changing its
    /// absolute expiry (spec §4.3 `refresh`). Returns `NotFound` if the
    /// session is absent or already past either timeout. Idempotent and
    /// safe under race - last writer wins on `last_seen_at` (spec §5).
    pub async fn refresh(&self, ctx: &OperationContext, id: &str) -> KernelResult<Session> {
        let session = self
            .get(ctx, id)
            .await?
            .ok_or_else(|| kernel_shared::errors::KernelError::not_found(ResourceKind::Session, id.to_string()))?;

        let refreshed = Session {
            last_seen_at: Utc::now(),
            ..session
        };
        self.repository.update(ctx, refreshed).await
    }

    pub async fn destroy(&self, ctx: &OperationContext, id: &str) -> KernelResult<()> {
        self.repository.delete(ctx, id).await
    }

    /// Invalidates every session belonging to a user - used on password
    /// change and account lockout to cut off already-issued sessions (spec
    /// §4.3 **[EXPANSION]**).
    pub async fn destroy_all_for_user(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<()> {
        self.repository.delete_by_user_id(ctx, user_id).await
    }

    /// Maintenance sweep removing every session past its absolute expiry,
    /// regardless of idle state (spec §4.3 `delete_expired`).
    pub async fn cleanup_expired(&self, ctx: &OperationContext) -> KernelResult<u64> {
        self.repository.delete_expired(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::InMemorySessionRepository;

    fn service() -> SessionService {
        SessionService::new(
            Arc::new(InMemorySessionRepository::new()),
            ChronoDuration::hours(24),
            ChronoDuration::minutes(30),
        )
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let svc = service();
        let ctx = OperationContext::new();
        let user_id = Uuid::now_v7();
        let created = svc.create(&ctx, user_id, None, SessionNamespace::Auth, None, None).await.unwrap();

        let fetched = svc.get(&ctx, &created.id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().user_id, user_id);
    }

    #[tokio::test]
    async fn get_missing_session_returns_none() {
        let svc = service();
        let ctx = OperationContext::new();
        assert!(svc.get(&ctx, "no-such-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn destroy_all_for_user_removes_every_session() {
        let svc = service();
        let ctx = OperationContext::new();
        let user_id = Uuid::now_v7();
        let a = svc.create(&ctx, user_id, None, SessionNamespace::Auth, None, None).await.unwrap();
        let b = svc.create(&ctx, user_id, None, SessionNamespace::Admin, None, None).await.unwrap();

        svc.destroy_all_for_user(&ctx, user_id).await.unwrap();

        assert!(svc.get(&ctx, &a.id).await.unwrap().is_none());
        assert!(svc.get(&ctx, &b.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn idle_timeout_invalidates_a_session_on_get() {
        let svc = SessionService::new(
            Arc::new(InMemorySessionRepository::new()),
            ChronoDuration::hours(24),
            ChronoDuration::seconds(-1),
        );
        let ctx = OperationContext::new();
        let created = svc.create(&ctx, Uuid::now_v7(), None, SessionNamespace::Auth, None, None).await.unwrap();

        assert!(svc.get(&ctx, &created.id).await.unwrap().is_none());
    }
}
