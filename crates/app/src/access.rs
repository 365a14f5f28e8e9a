//! Roles and capabilities
//!
//! Identity is asserted upstream; this module only decides what an asserted
//! role may do.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Marker for user ids.
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Closed set of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Seller,
    Admin,
}

/// Actions that need more than a customer role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Write the stored metal rate table.
    ManageMetalRates,

    /// Create and update inventory items.
    ManageInventory,

    /// Move orders through fulfilment.
    ManageOrders,

    /// Read the stock reconciliation queue.
    ReviewAnomalies,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }

    /// Whether this role grants `capability`.
    #[must_use]
    pub const fn allows(self, capability: Capability) -> bool {
        match self {
            Self::Admin => true,
            Self::Seller => matches!(capability, Capability::ManageInventory),
            Self::Customer => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role \"{0}\"")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" | "user" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("role {role} may not {capability:?}")]
pub struct AccessDenied {
    pub role: Role,
    pub capability: Capability,
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user: UserUuid,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(user: UserUuid, role: Role) -> Self {
        Self { user, role }
    }

    /// Fails unless the actor's role grants `capability`.
    ///
    /// # Errors
    ///
    /// [`AccessDenied`] naming the role and capability.
    pub const fn require(&self, capability: Capability) -> Result<(), AccessDenied> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(AccessDenied {
                role: self.role,
                capability,
            })
        }
    }

    /// Like [`Actor::require`], but sellers only pass for records they own.
    ///
    /// # Errors
    ///
    /// [`AccessDenied`] when the role lacks `capability`, or when a seller is
    /// not `owner`.
    pub fn require_owned(&self, capability: Capability, owner: UserUuid) -> Result<(), AccessDenied> {
        self.require(capability)?;

        if self.role == Role::Seller && self.user != owner {
            return Err(AccessDenied {
                role: self.role,
                capability,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn admin_holds_every_capability() {
        for capability in [
            Capability::ManageMetalRates,
            Capability::ManageInventory,
            Capability::ManageOrders,
            Capability::ReviewAnomalies,
        ] {
            assert!(Role::Admin.allows(capability), "{capability:?}");
        }
    }

    #[test]
    fn seller_only_manages_inventory() {
        assert!(Role::Seller.allows(Capability::ManageInventory));
        assert!(!Role::Seller.allows(Capability::ManageMetalRates));
        assert!(!Role::Seller.allows(Capability::ManageOrders));
    }

    #[test]
    fn customer_is_denied_with_detail() {
        let actor = Actor::new(UserUuid::new(), Role::Customer);

        assert_eq!(
            actor.require(Capability::ManageMetalRates),
            Err(AccessDenied {
                role: Role::Customer,
                capability: Capability::ManageMetalRates,
            })
        );
    }

    #[test]
    fn sellers_only_pass_ownership_for_their_own_records() {
        let owner = UserUuid::new();
        let seller = Actor::new(owner, Role::Seller);
        let other_seller = Actor::new(UserUuid::new(), Role::Seller);
        let admin = Actor::new(UserUuid::new(), Role::Admin);

        assert_eq!(seller.require_owned(Capability::ManageInventory, owner), Ok(()));
        assert_eq!(admin.require_owned(Capability::ManageInventory, owner), Ok(()));
        assert_eq!(
            other_seller.require_owned(Capability::ManageInventory, owner),
            Err(AccessDenied {
                role: Role::Seller,
                capability: Capability::ManageInventory,
            })
        );
    }

    #[test]
    fn parses_roles_case_insensitively() -> TestResult {
        assert_eq!("Admin".parse::<Role>()?, Role::Admin);
        assert_eq!("user".parse::<Role>()?, Role::Customer);
        assert!("root".parse::<Role>().is_err());

        Ok(())
    }
}
