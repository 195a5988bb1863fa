// crates/sm-authz-core/src/core/policies.rs
// ============================================================================
// Module: Access Policies
// Description: Principals, resources, entity snapshots, and single grant edges.
// Purpose: Model one principal -> resource grant carrying read/write bits.
// Dependencies: crate::core::{access, identifiers}, serde
// ============================================================================

//! ## Overview
//! An access policy is one grant edge from a [`Principal`] to a protected
//! [`Resource`]. Only the six principal/resource combinations modeled by
//! [`AccessPolicy`] exist. Edges may carry a pre-loaded snapshot of the
//! entities they reference; when a snapshot is missing the single-policy
//! handler loads it from the read-only stores.
//!
//! ## Invariants
//! - A principal and the resource it is granted must belong to the same
//!   organization. Nothing in this module assumes it; handlers enforce it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::access::AccessBits;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::OrganizationUserId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::SecretId;
use crate::core::identifiers::ServiceAccountId;

// ============================================================================
// SECTION: Entity Snapshots
// ============================================================================

/// Project snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier.
    pub id: ProjectId,
    /// Owning organization.
    pub organization_id: OrganizationId,
}

/// Service account snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    /// Service account identifier.
    pub id: ServiceAccountId,
    /// Owning organization.
    pub organization_id: OrganizationId,
}

/// Secret snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Secret identifier.
    pub id: SecretId,
    /// Owning organization.
    pub organization_id: OrganizationId,
}

/// Organization membership row for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUser {
    /// Membership identifier.
    pub id: OrganizationUserId,
    /// Organization the membership belongs to.
    pub organization_id: OrganizationId,
}

/// Group row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier.
    pub id: GroupId,
    /// Organization the group belongs to.
    pub organization_id: OrganizationId,
}

// ============================================================================
// SECTION: Principals and Resources
// ============================================================================

/// Identity that can be granted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Principal {
    /// Organization user.
    User(OrganizationUserId),
    /// Group of organization users.
    Group(GroupId),
    /// Service account.
    ServiceAccount(ServiceAccountId),
}

/// Protected entity that access is granted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    /// Project resource.
    Project {
        /// Project identifier.
        id: ProjectId,
        /// Owning organization.
        organization_id: OrganizationId,
    },
    /// Service account resource.
    ServiceAccount {
        /// Service account identifier.
        id: ServiceAccountId,
        /// Owning organization.
        organization_id: OrganizationId,
    },
    /// Secret resource.
    Secret {
        /// Secret identifier.
        id: SecretId,
        /// Owning organization.
        organization_id: OrganizationId,
    },
}

impl Resource {
    /// Returns the organization owning the resource.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        match self {
            Self::Project {
                organization_id, ..
            }
            | Self::ServiceAccount {
                organization_id, ..
            }
            | Self::Secret {
                organization_id, ..
            } => *organization_id,
        }
    }
}

impl From<Project> for Resource {
    fn from(value: Project) -> Self {
        Self::Project {
            id: value.id,
            organization_id: value.organization_id,
        }
    }
}

impl From<ServiceAccount> for Resource {
    fn from(value: ServiceAccount) -> Self {
        Self::ServiceAccount {
            id: value.id,
            organization_id: value.organization_id,
        }
    }
}

impl From<Secret> for Resource {
    fn from(value: Secret) -> Self {
        Self::Secret {
            id: value.id,
            organization_id: value.organization_id,
        }
    }
}

// ============================================================================
// SECTION: Grant Edges
// ============================================================================

/// User -> project grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProjectAccessPolicy {
    /// Grantee membership.
    pub organization_user_id: OrganizationUserId,
    /// Granted project.
    pub granted_project_id: ProjectId,
    /// Pre-loaded project snapshot, when available.
    #[serde(default)]
    pub granted_project: Option<Project>,
    /// Granted bits.
    pub access: AccessBits,
}

/// Group -> project grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProjectAccessPolicy {
    /// Grantee group.
    pub group_id: GroupId,
    /// Granted project.
    pub granted_project_id: ProjectId,
    /// Pre-loaded project snapshot, when available.
    #[serde(default)]
    pub granted_project: Option<Project>,
    /// Granted bits.
    pub access: AccessBits,
}

/// Service account -> project grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountProjectAccessPolicy {
    /// Grantee service account.
    pub service_account_id: ServiceAccountId,
    /// Pre-loaded service account snapshot, when available.
    #[serde(default)]
    pub service_account: Option<ServiceAccount>,
    /// Granted project.
    pub granted_project_id: ProjectId,
    /// Pre-loaded project snapshot, when available.
    #[serde(default)]
    pub granted_project: Option<Project>,
    /// Granted bits.
    pub access: AccessBits,
}

/// User -> service account grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserServiceAccountAccessPolicy {
    /// Grantee membership.
    pub organization_user_id: OrganizationUserId,
    /// Granted service account.
    pub granted_service_account_id: ServiceAccountId,
    /// Pre-loaded service account snapshot, when available.
    #[serde(default)]
    pub granted_service_account: Option<ServiceAccount>,
    /// Granted bits.
    pub access: AccessBits,
}

/// Group -> service account grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupServiceAccountAccessPolicy {
    /// Grantee group.
    pub group_id: GroupId,
    /// Granted service account.
    pub granted_service_account_id: ServiceAccountId,
    /// Pre-loaded service account snapshot, when available.
    #[serde(default)]
    pub granted_service_account: Option<ServiceAccount>,
    /// Granted bits.
    pub access: AccessBits,
}

/// Service account -> secret grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountSecretAccessPolicy {
    /// Grantee service account.
    pub service_account_id: ServiceAccountId,
    /// Pre-loaded service account snapshot, when available.
    #[serde(default)]
    pub service_account: Option<ServiceAccount>,
    /// Granted secret.
    pub granted_secret_id: SecretId,
    /// Pre-loaded secret snapshot, when available.
    #[serde(default)]
    pub granted_secret: Option<Secret>,
    /// Granted bits.
    pub access: AccessBits,
}

/// One supported grant edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessPolicy {
    /// User -> project.
    UserProject(UserProjectAccessPolicy),
    /// Group -> project.
    GroupProject(GroupProjectAccessPolicy),
    /// Service account -> project.
    ServiceAccountProject(ServiceAccountProjectAccessPolicy),
    /// User -> service account.
    UserServiceAccount(UserServiceAccountAccessPolicy),
    /// Group -> service account.
    GroupServiceAccount(GroupServiceAccountAccessPolicy),
    /// Service account -> secret.
    ServiceAccountSecret(ServiceAccountSecretAccessPolicy),
}

impl AccessPolicy {
    /// Returns the grantee of the edge.
    #[must_use]
    pub const fn principal(&self) -> Principal {
        match self {
            Self::UserProject(policy) => Principal::User(policy.organization_user_id),
            Self::UserServiceAccount(policy) => Principal::User(policy.organization_user_id),
            Self::GroupProject(policy) => Principal::Group(policy.group_id),
            Self::GroupServiceAccount(policy) => Principal::Group(policy.group_id),
            Self::ServiceAccountProject(policy) => {
                Principal::ServiceAccount(policy.service_account_id)
            }
            Self::ServiceAccountSecret(policy) => {
                Principal::ServiceAccount(policy.service_account_id)
            }
        }
    }

    /// Returns the granted resource when its snapshot is loaded.
    #[must_use]
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Self::UserProject(policy) => policy.granted_project.map(Resource::from),
            Self::GroupProject(policy) => policy.granted_project.map(Resource::from),
            Self::ServiceAccountProject(policy) => policy.granted_project.map(Resource::from),
            Self::UserServiceAccount(policy) => policy.granted_service_account.map(Resource::from),
            Self::GroupServiceAccount(policy) => policy.granted_service_account.map(Resource::from),
            Self::ServiceAccountSecret(policy) => policy.granted_secret.map(Resource::from),
        }
    }

    /// Returns the granted bits.
    #[must_use]
    pub const fn access(&self) -> AccessBits {
        match self {
            Self::UserProject(policy) => policy.access,
            Self::GroupProject(policy) => policy.access,
            Self::ServiceAccountProject(policy) => policy.access,
            Self::UserServiceAccount(policy) => policy.access,
            Self::GroupServiceAccount(policy) => policy.access,
            Self::ServiceAccountSecret(policy) => policy.access,
        }
    }

    /// Returns a stable label for the edge shape.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::UserProject(_) => "user_project",
            Self::GroupProject(_) => "group_project",
            Self::ServiceAccountProject(_) => "service_account_project",
            Self::UserServiceAccount(_) => "user_service_account",
            Self::GroupServiceAccount(_) => "group_service_account",
            Self::ServiceAccountSecret(_) => "service_account_secret",
        }
    }
}
