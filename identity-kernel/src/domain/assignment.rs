//! # Assignment Entity
//!
//! Grants a role to a user in a scope context (spec §3 `Assignment`). The
//! central invariant - `scope_context_id` is `NULL` iff `scope == Platform`
//! - is enforced both by the store's check constraint (spec §6) and
//! defensively in [`crate::service::authorization_service`], which treats a
//! malformed record (non-platform scope with a null context) as
//! non-matching rather than panicking (spec §9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::permissions::Scope;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub scope: Scope,
    pub scope_context_id: Option<Uuid>,
    pub granted_at: DateTime<Utc>,
    pub granted_by: Option<Uuid>,
}

impl Assignment {
    /// An assignment is well-formed iff its context nullability matches its
    /// scope: `None` for `Platform`, `Some` otherwise.
    pub fn is_well_formed(&self) -> bool {
        match self.scope {
            Scope::Platform => self.scope_context_id.is_none(),
            Scope::Tenant | Scope::Client => self.scope_context_id.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(scope: Scope, context: Option<Uuid>) -> Assignment {
        Assignment {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            role_id: Uuid::now_v7(),
            scope,
            scope_context_id: context,
            granted_at: Utc::now(),
            granted_by: None,
        }
    }

    #[test]
    fn platform_scope_requires_null_context() {
        assert!(assignment(Scope::Platform, None).is_well_formed());
        assert!(!assignment(Scope::Platform, Some(Uuid::now_v7())).is_well_formed());
    }

    #[test]
    fn non_platform_scope_requires_context() {
        assert!(assignment(Scope::Tenant, Some(Uuid::now_v7())).is_well_formed());
        assert!(!assignment(Scope::Tenant, None).is_well_formed());
    }
}
