// crates/sm-authz-core/src/core/access.rs
// ============================================================================
// Module: Access Classification
// Description: Caller classes, access-client types, and read/write bits.
// Purpose: Classify the acting caller and carry resolved access bits.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A caller arrives with a raw [`ClientClass`]. Combined with the caller's
//! admin status in the target organization it becomes an
//! [`AccessClientType`], which selects the lookup branch in the backing
//! store and decides whether the caller is even eligible to mutate grants.
//!
//! ## Invariants
//! - Only [`AccessClientType::User`] and [`AccessClientType::NoAccessCheck`]
//!   may mutate access policies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Client Classes
// ============================================================================

/// Raw class of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientClass {
    /// Interactive user session.
    User,
    /// Machine caller authenticated as a service account.
    ServiceAccount,
    /// Organization-level API key.
    Organization,
}

impl ClientClass {
    /// Returns a stable label for audit output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::ServiceAccount => "service_account",
            Self::Organization => "organization",
        }
    }
}

/// Access-client type used to select the lookup branch.
///
/// # Invariants
/// - `NoAccessCheck` is only produced for organization admins of the target
///   organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessClientType {
    /// Organization admin; the store grants full access without checks.
    NoAccessCheck,
    /// Ordinary user; access comes from explicit grants.
    User,
    /// Service-account caller.
    ServiceAccount,
    /// Organization API key caller.
    Organization,
}

impl AccessClientType {
    /// Maps a raw caller class and admin status to an access-client type.
    #[must_use]
    pub const fn from_client_class(class: ClientClass, organization_admin: bool) -> Self {
        match class {
            ClientClass::User if organization_admin => Self::NoAccessCheck,
            ClientClass::User => Self::User,
            ClientClass::ServiceAccount => Self::ServiceAccount,
            ClientClass::Organization => Self::Organization,
        }
    }

    /// Returns true when this client type may mutate access policies.
    #[must_use]
    pub const fn may_mutate_policies(self) -> bool {
        matches!(self, Self::NoAccessCheck | Self::User)
    }

    /// Returns a stable label for audit output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAccessCheck => "no_access_check",
            Self::User => "user",
            Self::ServiceAccount => "service_account",
            Self::Organization => "organization",
        }
    }
}

// ============================================================================
// SECTION: Access Bits
// ============================================================================

/// Read/write bits resolved for a caller against one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AccessBits {
    /// Caller may read the resource.
    pub read: bool,
    /// Caller may write the resource.
    pub write: bool,
}

impl AccessBits {
    /// No access.
    pub const NONE: Self = Self {
        read: false,
        write: false,
    };
    /// Full access.
    pub const FULL: Self = Self {
        read: true,
        write: true,
    };

    /// Builds access bits from explicit values.
    #[must_use]
    pub const fn new(read: bool, write: bool) -> Self {
        Self {
            read,
            write,
        }
    }

    /// Combines two bit sets with logical AND.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        Self {
            read: self.read && other.read,
            write: self.write && other.write,
        }
    }
}

impl From<(bool, bool)> for AccessBits {
    fn from((read, write): (bool, bool)) -> Self {
        Self::new(read, write)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
