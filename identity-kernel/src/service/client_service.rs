//! # Client Service
//!
//! Registration and scope validation for OAuth2 relying parties (spec
//! §4.6). Client secrets follow the same opaque-token-plus-hash pattern as
//! sessions and bearer tokens: the cleartext value is generated once,
//! returned to the caller, and never stored or retrievable again.

use std::sync::Arc;

use chrono::Utc;
use kernel_shared::crypto::token::{constant_time_eq, generate_opaque_token, hash_token};
use kernel_shared::errors::{KernelError, KernelResult, ResourceKind};
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::audit::{AuditEventType, AuditLogger, NewAuditEvent};
use crate::context::OperationContext;
use crate::domain::client::{ClientSpec, NewClient, OAuth2Client};
use crate::domain::permissions::{validate_client_scope, validate_oidc_scopes};
use crate::repository::client_repository::ClientRepository;

fn validate_absolute_uri(uri: &str, field: &str) -> KernelResult<()> {
    Url::parse(uri)
        .map(|_| ())
        .map_err(|_| KernelError::invalid_input(format!("{field} must be an absolute URI: {uri}")))
}

/// OAuth2 client registration and scope-validation service (spec §4.6).
#[derive(Clone)]
pub struct ClientService {
    repository: Arc<dyn ClientRepository>,
    audit: AuditLogger,
}

impl ClientService {
    pub fn new(repository: Arc<dyn ClientRepository>, audit: AuditLogger) -> Self {
        Self { repository, audit }
    }

    /// Registers a new client (spec §4.6 `register_client`). Generates the
    /// public `client_id` if the spec doesn't supply one, along with a
    /// fresh client secret; returns the secret exactly once in
    /// [`NewClient::client_secret`].
    pub async fn register_client(&self, ctx: &OperationContext, tenant_id: Uuid, spec: ClientSpec) -> KernelResult<NewClient> {
        if let Some(uri) = &spec.client_uri {
            validate_absolute_uri(uri, "client_uri")?;
        }
        for redirect_uri in &spec.redirect_uris {
            validate_absolute_uri(redirect_uri, "redirect_uri")?;
        }

        let client_id = spec.client_id.unwrap_or_else(|| kernel_shared::new_id().to_string());
        let client_secret = generate_opaque_token(32);
        let client_secret_hash = hash_token(&client_secret);
        let now = Utc::now();

        let client = OAuth2Client {
            id: kernel_shared::new_id(),
            client_id,
            tenant_id,
            client_secret_hash,
            name: spec.name,
            client_uri: spec.client_uri,
            redirect_uris: spec.redirect_uris,
            allowed_scopes: spec.allowed_scopes,
            grant_types: spec.grant_types,
            response_types: spec.response_types,
            token_endpoint_auth_method: spec.token_endpoint_auth_method,
            access_token_lifetime_seconds: spec.access_token_lifetime_seconds,
            refresh_token_lifetime_seconds: spec.refresh_token_lifetime_seconds,
            id_token_lifetime_seconds: spec.id_token_lifetime_seconds,
            owner_user_id: spec.owner_user_id,
            trusted: spec.trusted,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self.repository.create(ctx, client).await?;

        info!(client_id = %created.client_id, tenant_id = %tenant_id, "client registered");
        self.audit
            .log(
                ctx,
                NewAuditEvent::new(AuditEventType::ClientCreated)
                    .tenant(tenant_id)
                    .target(created.id, created.name.clone()),
            )
            .await;

        Ok(NewClient { client: created, client_secret })
    }

    pub async fn get(&self, ctx: &OperationContext, tenant_id: Uuid, id: Uuid) -> KernelResult<OAuth2Client> {
        self.repository
            .get_by_id(ctx, tenant_id, id)
            .await?
            .ok_or_else(|| KernelError::not_found(ResourceKind::Client, id.to_string()))
    }

    pub async fn list_by_tenant(&self, ctx: &OperationContext, tenant_id: Uuid) -> KernelResult<Vec<OAuth2Client>> {
        self.repository.list_by_tenant(ctx, tenant_id).await
    }

    pub async fn delete(&self, ctx: &OperationContext, id: Uuid) -> KernelResult<()> {
        self.repository.delete(ctx, id).await
    }

    /// Verifies a presented secret against a client's stored hash in
    /// constant time (spec §4.6, "comparison is constant-time").
    pub fn verify_secret(&self, client: &OAuth2Client, candidate: &str) -> bool {
        constant_time_eq(&hash_token(candidate), &client.client_secret_hash)
    }

    /// `validate_scope` (spec §4.6): every requested token must appear in
    /// `client.allowed_scopes`, or the client allows the wildcard.
    pub fn validate_scope(&self, client: &OAuth2Client, requested: &str) -> bool {
        let requested: Vec<String> = requested.split_whitespace().map(str::to_string).collect();
        validate_client_scope(&client.allowed_scopes, &requested)
    }

    /// `validate_oidc_scopes` (spec §4.6): the closed OIDC catalog gate,
    /// independent of any particular client's `allowed_scopes`.
    pub fn validate_oidc_scopes(&self, requested: &[String]) -> KernelResult<()> {
        validate_oidc_scopes(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::{InMemoryAuditRepository, InMemoryClientRepository};

    fn service() -> ClientService {
        ClientService::new(
            Arc::new(InMemoryClientRepository::new()),
            AuditLogger::new(Arc::new(InMemoryAuditRepository::new())),
        )
    }

    fn spec() -> ClientSpec {
        ClientSpec {
            client_id: None,
            name: "Test Client".into(),
            client_uri: Some("https://client.example.test".into()),
            redirect_uris: vec!["https://client.example.test/callback".into()],
            allowed_scopes: vec!["openid".into(), "profile".into()],
            grant_types: vec!["authorization_code".into()],
            response_types: vec!["code".into()],
            token_endpoint_auth_method: "client_secret_basic".into(),
            access_token_lifetime_seconds: 3600,
            refresh_token_lifetime_seconds: 2_592_000,
            id_token_lifetime_seconds: 3600,
            owner_user_id: None,
            trusted: false,
        }
    }

    #[tokio::test]
    async fn register_client_generates_id_and_secret() {
        let svc = service();
        let ctx = OperationContext::new();
        let tenant_id = Uuid::now_v7();

        let registered = svc.register_client(&ctx, tenant_id, spec()).await.unwrap();
        assert!(!registered.client.client_id.is_empty());
        assert!(!registered.client_secret.is_empty());
        assert_ne!(registered.client_secret, registered.client.client_secret_hash);
    }

    #[tokio::test]
    async fn register_client_rejects_relative_redirect_uri() {
        let svc = service();
        let ctx = OperationContext::new();
        let mut bad_spec = spec();
        bad_spec.redirect_uris = vec!["/callback".into()];

        let err = svc.register_client(&ctx, Uuid::now_v7(), bad_spec).await.unwrap_err();
        assert!(matches!(err, KernelError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn verify_secret_accepts_only_the_issued_secret() {
        let svc = service();
        let ctx = OperationContext::new();
        let registered = svc.register_client(&ctx, Uuid::now_v7(), spec()).await.unwrap();

        assert!(svc.verify_secret(&registered.client, &registered.client_secret));
        assert!(!svc.verify_secret(&registered.client, "wrong-secret"));
    }

    #[test]
    fn validate_scope_honors_wildcard_and_rejects_unlisted() {
        let client = OAuth2Client {
            id: Uuid::now_v7(),
            client_id: "abc".into(),
            tenant_id: Uuid::now_v7(),
            client_secret_hash: "hash".into(),
            name: "x".into(),
            client_uri: None,
            redirect_uris: vec![],
            allowed_scopes: vec!["read".into()],
            grant_types: vec![],
            response_types: vec![],
            token_endpoint_auth_method: "none".into(),
            access_token_lifetime_seconds: 3600,
            refresh_token_lifetime_seconds: 3600,
            id_token_lifetime_seconds: 3600,
            owner_user_id: None,
            trusted: false,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        let svc = service();
        assert!(svc.validate_scope(&client, "read"));
        assert!(!svc.validate_scope(&client, "read write"));
        assert!(svc.validate_scope(&client, ""));
    }
}
