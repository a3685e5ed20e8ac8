//! # Seeded Role Data
//!
//! spec §9 flags the orchestrator's role-name → role-id mapping as
//! something that "SHOULD be configuration/seed data rather than hardcoded
//! identifiers." This module resolves that Open Question in favor of seed
//! data: the three well-known tenant roles get stable, deterministic
//! UUIDv5 ids derived from a fixed kernel namespace, so they're
//! reproducible without a database round-trip yet never collide with a
//! caller-created role's random UUIDv7 id.

use uuid::Uuid;

use crate::domain::permissions::Scope;
use crate::domain::role::Role;

/// Namespace UUID this kernel's seeded role ids are derived under. Picked
/// once and never changed - changing it would reassign every deployment's
/// `tenant_owner`/`tenant_admin`/`tenant_member` role ids.
const KERNEL_ROLE_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6b, 0x65, 0x72, 0x6e, 0x65, 0x6c, 0x2d, 0x72, 0x6f, 0x6c, 0x65, 0x2d, 0x6e, 0x73, 0x00, 0x00,
]);

/// Deterministically derives the seeded id for a well-known role name.
pub fn seeded_role_id(name: &str) -> Uuid {
    Uuid::new_v5(&KERNEL_ROLE_NAMESPACE, name.as_bytes())
}

pub const TENANT_OWNER: &str = "tenant_owner";
pub const TENANT_ADMIN: &str = "tenant_admin";
pub const TENANT_MEMBER: &str = "tenant_member";

/// The three seeded tenant-scope roles, ready to persist on first boot via
/// a store-specific seeding step (outside this kernel's scope - it only
/// supplies the data).
pub fn seeded_tenant_roles() -> Vec<Role> {
    vec![
        Role {
            id: seeded_role_id(TENANT_OWNER),
            name: TENANT_OWNER.to_string(),
            scope: Scope::Tenant,
            description: Some("Full control over a tenant, including ownership transfer".to_string()),
            permissions: vec!["*".to_string()],
        },
        Role {
            id: seeded_role_id(TENANT_ADMIN),
            name: TENANT_ADMIN.to_string(),
            scope: Scope::Tenant,
            description: Some("Administrative access within a tenant, excluding ownership".to_string()),
            permissions: vec!["tenant:manage_users".to_string(), "tenant:manage_clients".to_string()],
        },
        Role {
            id: seeded_role_id(TENANT_MEMBER),
            name: TENANT_MEMBER.to_string(),
            scope: Scope::Tenant,
            description: Some("Standard member access within a tenant".to_string()),
            permissions: vec!["tenant:read".to_string()],
        },
    ]
}

/// Resolves one of the three well-known role names to its seeded id.
/// Anything else is not a seeded role - the orchestrator rejects it before
/// calling this (spec §4.5 `assign_role` step 1).
pub fn role_id_for_name(name: &str) -> Option<Uuid> {
    match name {
        TENANT_OWNER | TENANT_ADMIN | TENANT_MEMBER => Some(seeded_role_id(name)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_role_ids_are_deterministic() {
        assert_eq!(seeded_role_id(TENANT_OWNER), seeded_role_id(TENANT_OWNER));
    }

    #[test]
    fn seeded_role_ids_differ_by_name() {
        assert_ne!(seeded_role_id(TENANT_OWNER), seeded_role_id(TENANT_ADMIN));
    }

    #[test]
    fn role_id_for_name_rejects_unknown_names() {
        assert!(role_id_for_name("not_a_role").is_none());
        assert!(role_id_for_name(TENANT_MEMBER).is_some());
    }

    #[test]
    fn seeded_tenant_roles_match_seeded_ids() {
        for role in seeded_tenant_roles() {
            assert_eq!(role_id_for_name(&role.name), Some(role.id));
        }
    }
}
