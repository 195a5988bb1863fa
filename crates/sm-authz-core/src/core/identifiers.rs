// crates/sm-authz-core/src/core/identifiers.rs
// ============================================================================
// Module: Secrets Manager Identifiers
// Description: Opaque identifiers for organizations, principals, and resources.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Every entity the engine reasons about is identified by a UUID. Each kind of
//! entity gets its own newtype so a project id can never be handed to a
//! service-account lookup by accident. Identifiers serialize transparently as
//! the hyphenated UUID string.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares a `Copy` UUID newtype with the shared constructor/accessor surface.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

uuid_identifier! {
    /// Organization (tenant) identifier.
    ///
    /// # Invariants
    /// - Every grant edge's principal and resource resolve to one organization.
    OrganizationId
}

uuid_identifier! {
    /// Organization membership identifier for a user grantee.
    OrganizationUserId
}

uuid_identifier! {
    /// Group identifier for a group grantee.
    GroupId
}

uuid_identifier! {
    /// Service account identifier. Service accounts act both as grantees and as
    /// granted resources.
    ServiceAccountId
}

uuid_identifier! {
    /// Project identifier.
    ProjectId
}

uuid_identifier! {
    /// Secret identifier.
    SecretId
}

uuid_identifier! {
    /// Identity of the acting caller as used in access lookups.
    CallerId
}
