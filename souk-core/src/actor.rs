use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marketplace roles carried in JWT claims.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Platform-operator plane: bypasses seller-ownership checks on order
    /// review, but never on stock mutation.
    pub fn is_operator(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "BUYER",
            Role::Seller => "SELLER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUYER" => Ok(Role::Buyer),
            "SELLER" => Ok(Role::Seller),
            "ADMIN" => Ok(Role::Admin),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The authenticated identity acting on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_operator(&self) -> bool {
        self.role.is_operator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn operator_plane_is_admin_and_super_admin() {
        assert!(!Role::Buyer.is_operator());
        assert!(!Role::Seller.is_operator());
        assert!(Role::Admin.is_operator());
        assert!(Role::SuperAdmin.is_operator());
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Buyer, Role::Seller, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert!(Role::from_str("DRIVER").is_err());
    }
}
