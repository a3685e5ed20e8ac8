//! In-memory [`IdentityRepository`] - `tokio::sync::Mutex`-guarded maps,
//! used by this crate's tests and available to downstream consumers'.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::domain::identity::{Credential, Identity, NewIdentity};
use crate::repository::identity_repository::IdentityRepository;

#[derive(Debug, Default)]
struct State {
    identities: HashMap<Uuid, Identity>,
    credentials: HashMap<Uuid, Credential>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn create(&self, ctx: &OperationContext, email_hash: String, new_identity: NewIdentity) -> KernelResult<Identity> {
        ctx.check_cancelled()?;
        let mut state = self.state.lock().await;
        if state.identities.values().any(|i| i.email_hash == email_hash && i.deleted_at.is_none()) {
            return Err(KernelError::already_exists(ResourceKind::Identity, email_hash));
        }
        let now = Utc::now();
        let identity = Identity {
            id: kernel_shared::new_id(),
            email_hash,
            email_plain: Some(new_identity.email_plain),
            email_verified: false,
            given_name: new_identity.profile.given_name,
            family_name: new_identity.profile.family_name,
            full_name: new_identity.profile.full_name,
            nickname: new_identity.profile.nickname,
            picture: new_identity.profile.picture,
            locale: new_identity.profile.locale,
            timezone: new_identity.profile.timezone,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<Option<Identity>> {
        ctx.check_cancelled()?;
        let state = self.state.lock().await;
        Ok(state.identities.get(&id).filter(|i| i.deleted_at.is_none()).cloned())
    }

    async fn get_by_hash(&self, ctx: &OperationContext, email_hash: &str) -> KernelResult<Option<Identity>> {
        ctx.check_cancelled()?;
        let state = self.state.lock().await;
        Ok(state
            .identities
            .values()
            .find(|i| i.email_hash == email_hash && i.deleted_at.is_none())
            .cloned())
    }

    async fn update(&self, ctx: &OperationContext, mut identity: Identity) -> KernelResult<Identity> {
        ctx.check_cancelled()?;
        let mut state = self.state.lock().await;
        identity.updated_at = Utc::now();
        state.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn update_lockout(
        &self,
        ctx: &OperationContext,
        user_id: Uuid,
        failed_attempts: i32,
        locked_until: Option<chrono::DateTime<chrono::Utc>>,
    ) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut state = self.state.lock().await;
        let identity = state
            .identities
            .get_mut(&user_id)
            .ok_or_else(|| KernelError::not_found(ResourceKind::Identity, user_id.to_string()))?;
        identity.failed_login_attempts = failed_attempts;
        identity.locked_until = locked_until;
        identity.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        ctx.check_cancelled()?;
        let mut state = self.state.lock().await;
        if let Some(identity) = state.identities.get_mut(&id) {
            identity.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn get_credentials(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<Option<Credential>> {
        ctx.check_cancelled()?;
        let state = self.state.lock().await;
        Ok(state.credentials.get(&user_id).cloned())
    }

    async fn add_credentials(&self, ctx: &OperationContext, user_id: Uuid, password_hash: String) -> KernelResult<Credential> {
        ctx.check_cancelled()?;
        let mut state = self.state.lock().await;
        if state.credentials.contains_key(&user_id) {
            return Err(KernelError::already_exists(ResourceKind::Credential, user_id.to_string()));
        }
        let credential = Credential {
            identity_id: user_id,
            password_hash,
            updated_at: Utc::now(),
        };
        state.credentials.insert(user_id, credential.clone());
        Ok(credential)
    }

    async fn update_password(&self, ctx: &OperationContext, user_id: Uuid, password_hash: String) -> KernelResult<Credential> {
        ctx.check_cancelled()?;
        let mut state = self.state.lock().await;
        let credential = Credential {
            identity_id: user_id,
            password_hash,
            updated_at: Utc::now(),
        };
        state.credentials.insert(user_id, credential.clone());
        Ok(credential)
    }
}
