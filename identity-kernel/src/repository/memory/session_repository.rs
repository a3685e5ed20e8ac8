//! In-memory [`SessionRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kernel_shared::errors::KernelResult;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::session::Session;
use crate::repository::session_repository::SessionRepository;

#[derive(Debug, Default, Clone)]
pub struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, ctx: &OperationContext, session: Session) -> KernelResult<Session> {
        ctx.check_cancelled()?;
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, ctx: &OperationContext, id: &str) -> KernelResult<Option<Session>> {
        ctx.check_cancelled()?;
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(id).cloned())
    }

    async fn update(&self, ctx: &OperationContext, session: Session) -> KernelResult<Session> {
        ctx.check_cancelled()?;
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn delete(&self, ctx: &OperationContext, id: &str) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut sessions = self.sessions.lock().await;
        sessions.remove(id);
        Ok(())
    }

    async fn delete_by_user_id(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| s.user_id != user_id);
        Ok(())
    }

    async fn delete_expired(&self, ctx: &OperationContext) -> KernelResult<u64> {
        ctx.check_cancelled()?;
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}
