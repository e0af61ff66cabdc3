//! Permission strings and role grants.
//!
//! Permissions are `resource:action` strings checked by the permission
//! middleware. Users get their set from their role; API tokens carry an
//! explicit set chosen when the token is minted.

use super::user::Role;

/// Permission string constants for compile-time safety
pub mod consts {
    // Clients (covers client objects)
    pub const CLIENTS_READ: &str = "clients:read";
    pub const CLIENTS_WRITE: &str = "clients:write";

    // Bids
    pub const BIDS_READ: &str = "bids:read";
    pub const BIDS_WRITE: &str = "bids:write";

    // Equipment catalog and serialized items
    pub const EQUIPMENT_READ: &str = "equipment:read";
    pub const EQUIPMENT_WRITE: &str = "equipment:write";

    // Bid type workflow administration
    pub const WORKFLOW_MANAGE: &str = "workflow:manage";

    // Warehouses and suppliers
    pub const WAREHOUSES_MANAGE: &str = "warehouses:manage";
    pub const SUPPLIERS_MANAGE: &str = "suppliers:manage";

    // Kanban notes
    pub const NOTES_READ: &str = "notes:read";
    pub const NOTES_WRITE: &str = "notes:write";

    // Analytics
    pub const ANALYTICS_READ: &str = "analytics:read";

    // API tokens
    pub const TOKENS_MANAGE: &str = "tokens:manage";

    // User administration
    pub const USERS_MANAGE: &str = "users:manage";
}

/// All known permission strings, used to validate token grants.
pub const ALL_PERMISSIONS: &[&str] = &[
    consts::CLIENTS_READ,
    consts::CLIENTS_WRITE,
    consts::BIDS_READ,
    consts::BIDS_WRITE,
    consts::EQUIPMENT_READ,
    consts::EQUIPMENT_WRITE,
    consts::WORKFLOW_MANAGE,
    consts::WAREHOUSES_MANAGE,
    consts::SUPPLIERS_MANAGE,
    consts::NOTES_READ,
    consts::NOTES_WRITE,
    consts::ANALYTICS_READ,
    consts::TOKENS_MANAGE,
    consts::USERS_MANAGE,
];

/// Permissions granted by a role. Admins bypass permission checks entirely,
/// so their set is only used for display.
pub fn role_permissions(role: Role) -> Vec<String> {
    use consts::*;

    let grants: &[&str] = match role {
        Role::Admin => ALL_PERMISSIONS,
        Role::Manager => &[
            CLIENTS_READ,
            CLIENTS_WRITE,
            BIDS_READ,
            BIDS_WRITE,
            EQUIPMENT_READ,
            EQUIPMENT_WRITE,
            WORKFLOW_MANAGE,
            WAREHOUSES_MANAGE,
            SUPPLIERS_MANAGE,
            NOTES_READ,
            NOTES_WRITE,
            ANALYTICS_READ,
        ],
        Role::Technician => &[
            CLIENTS_READ,
            BIDS_READ,
            BIDS_WRITE,
            EQUIPMENT_READ,
            EQUIPMENT_WRITE,
            NOTES_READ,
            NOTES_WRITE,
        ],
    };

    grants.iter().map(|s| s.to_string()).collect()
}

pub fn is_known_permission(permission: &str) -> bool {
    ALL_PERMISSIONS.contains(&permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_every_permission() {
        let perms = role_permissions(Role::Admin);
        for p in ALL_PERMISSIONS {
            assert!(perms.iter().any(|x| x == p), "missing {}", p);
        }
    }

    #[test]
    fn technician_cannot_manage_workflow_or_tokens() {
        let perms = role_permissions(Role::Technician);
        assert!(!perms.contains(&consts::WORKFLOW_MANAGE.to_string()));
        assert!(!perms.contains(&consts::TOKENS_MANAGE.to_string()));
        assert!(perms.contains(&consts::BIDS_WRITE.to_string()));
    }

    #[test]
    fn unknown_permission_rejected() {
        assert!(is_known_permission("bids:read"));
        assert!(!is_known_permission("bids:explode"));
    }
}
