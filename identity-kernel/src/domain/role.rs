//! # Role Entity

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::permissions::Scope;

/// A named permission set scoped to platform, tenant, or client (spec §3
/// `Role`). `(name, scope)` is unique; permissions are drawn from the
/// permission catalog or the wildcard `*`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub scope: Scope,
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl Role {
    /// Whether this role's permission list satisfies `permission` - either
    /// by exact match or via the wildcard (spec §4.4 step 3).
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p == super::permissions::WILDCARD_PERMISSION || p == permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(permissions: &[&str]) -> Role {
        Role {
            id: Uuid::now_v7(),
            name: "test".into(),
            scope: Scope::Tenant,
            description: None,
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn wildcard_grants_any_permission() {
        assert!(role(&["*"]).grants("anything:at_all"));
    }

    #[test]
    fn exact_match_grants_listed_permission() {
        let r = role(&["edit:stuff"]);
        assert!(r.grants("edit:stuff"));
        assert!(!r.grants("delete:stuff"));
    }
}
