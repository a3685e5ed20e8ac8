//! # Membership Entity
//!
//! Links an identity to a tenant. A membership record is a prerequisite for
//! any tenant-scoped authorization decision to succeed for that user (spec
//! §3) - it does not itself carry permissions, that's what
//! [`super::assignment::Assignment`] is for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
