//! # OAuth2 Client Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Registered relying party (spec §3 `OAuth2 Client`).
///
/// `client_secret_hash` is a SHA-256 hash of the client secret - the
/// cleartext secret is returned exactly once, at registration time, via
/// [`NewClient`], and never stored or re-derivable (same pattern as this
/// kernel's refresh/session tokens: only the hash lives at rest).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OAuth2Client {
    pub id: Uuid,
    pub client_id: String,
    pub tenant_id: Uuid,
    pub client_secret_hash: String,
    pub name: String,
    pub client_uri: Option<String>,
    pub redirect_uris: Vec<String>,
    pub allowed_scopes: Vec<String>,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    pub token_endpoint_auth_method: String,
    pub access_token_lifetime_seconds: i64,
    pub refresh_token_lifetime_seconds: i64,
    pub id_token_lifetime_seconds: i64,
    pub owner_user_id: Option<Uuid>,
    pub trusted: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Caller-supplied specification for [`register_client`](
/// crate::service::client_service::ClientService::register_client).
/// `client_id` is optional - generated if absent (spec §4.6).
#[derive(Debug, Clone, Default)]
pub struct ClientSpec {
    pub client_id: Option<String>,
    pub name: String,
    pub client_uri: Option<String>,
    pub redirect_uris: Vec<String>,
    pub allowed_scopes: Vec<String>,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    pub token_endpoint_auth_method: String,
    pub access_token_lifetime_seconds: i64,
    pub refresh_token_lifetime_seconds: i64,
    pub id_token_lifetime_seconds: i64,
    pub owner_user_id: Option<Uuid>,
    pub trusted: bool,
}

/// Result of a successful registration: the persisted client plus the
/// one-time cleartext secret. The cleartext value is not retrievable again.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub client: OAuth2Client,
    pub client_secret: String,
}
