//! Role Value Object
//!
//! Roles form a fixed ladder: `user < admin < superadmin`. Endpoints never
//! compare ranks though; they declare an explicit set of allowed roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Role {
    /// Regular account
    #[default]
    User = 0,
    /// Can manage regular and admin accounts
    Admin = 1,
    /// Protected top-level account
    SuperAdmin = 2,
}

impl Role {
    /// Every role; for endpoints open to any signed-in account
    pub const ALL: &'static [Role] = &[Role::User, Role::Admin, Role::SuperAdmin];

    /// Roles allowed on administrative endpoints
    pub const ADMINS: &'static [Role] = &[Role::Admin, Role::SuperAdmin];

    pub const SUPERADMIN_ONLY: &'static [Role] = &[Role::SuperAdmin];

    /// Roles that appear in ordinary account listings
    pub const LISTABLE: &'static [Role] = &[Role::User, Role::Admin];

    /// Database representation
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Role::User),
            1 => Some(Role::Admin),
            2 => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    /// Wire representation
    pub fn code(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn is_admin_or_higher(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ladder() {
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::SuperAdmin);
        assert!(!Role::User.is_admin_or_higher());
        assert!(Role::Admin.is_admin_or_higher());
        assert!(Role::SuperAdmin.is_super_admin());
    }

    #[test]
    fn test_role_codes() {
        for role in Role::ALL {
            assert_eq!(Role::from_code(role.code()), Some(*role));
            assert_eq!(Role::from_id(role.id()), Some(*role));
        }
        assert_eq!(Role::from_code("Admin"), Some(Role::Admin));
        assert_eq!(Role::from_code("moderator"), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"superadmin\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_listable_excludes_superadmin() {
        assert!(!Role::LISTABLE.contains(&Role::SuperAdmin));
    }
}
