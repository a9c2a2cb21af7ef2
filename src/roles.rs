/// Role authorization gate.
///
/// Roles form a total order `USER < ADMIN < SUPER_ADMIN`; a higher role
/// always satisfies a lower requirement. The gate is a pure decision over a
/// verified identity's role, it never touches a store.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// True iff this role satisfies `required`.
    pub fn allows(self, required: Role) -> bool {
        self >= required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Parses the stored representation; unknown strings are rejected rather
    /// than defaulted so a corrupted record cannot silently gain or lose
    /// privileges.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_order_is_total() {
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::SuperAdmin);
    }

    #[test]
    fn higher_role_satisfies_lower_requirement() {
        assert!(Role::SuperAdmin.allows(Role::User));
        assert!(Role::SuperAdmin.allows(Role::Admin));
        assert!(Role::Admin.allows(Role::User));
        assert!(Role::Admin.allows(Role::Admin));
    }

    #[test]
    fn lower_role_never_satisfies_higher_requirement() {
        assert!(!Role::User.allows(Role::Admin));
        assert!(!Role::User.allows(Role::SuperAdmin));
        assert!(!Role::Admin.allows(Role::SuperAdmin));
    }

    #[test]
    fn parse_roundtrip() {
        for role in [Role::User, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("ROOT"), None);
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
    }
}
