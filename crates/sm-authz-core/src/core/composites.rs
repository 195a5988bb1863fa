// crates/sm-authz-core/src/core/composites.rs
// ============================================================================
// Module: Composite Grant Requests
// Description: Bulk grant sets anchored on one project, service account, or secret.
// Purpose: Carry the full desired grant set that a handler authorizes as a unit.
// Dependencies: crate::core::{access, identifiers}, serde
// ============================================================================

//! ## Overview
//! Composites describe the desired state of every grant around one anchor.
//! Replace composites list the complete desired edge set; the secret update
//! composite lists tagged edge changes instead. Each composite exposes the
//! distinct identifier sets it references in [`BTreeSet`] order so lookups
//! and audit output are deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

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
// SECTION: Grant Entries
// ============================================================================

/// Grant to an organization user within a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGrant {
    /// Grantee membership.
    pub organization_user_id: OrganizationUserId,
    /// Granted bits.
    pub access: AccessBits,
}

/// Grant to a group within a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupGrant {
    /// Grantee group.
    pub group_id: GroupId,
    /// Granted bits.
    pub access: AccessBits,
}

/// Grant to a service account within a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountGrant {
    /// Grantee service account.
    pub service_account_id: ServiceAccountId,
    /// Granted bits.
    pub access: AccessBits,
}

/// Grant of a project to the anchor service account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectGrant {
    /// Granted project.
    pub project_id: ProjectId,
    /// Granted bits.
    pub access: AccessBits,
}

/// Change tag carried by one secret grant edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicyChange {
    /// New edge.
    Create,
    /// Existing edge with new bits.
    Update,
    /// Edge removal.
    Delete,
}

/// Tagged edge change used by [`SecretAccessPoliciesUpdates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicyUpdate<T> {
    /// Change kind.
    pub change: AccessPolicyChange,
    /// Affected grant.
    pub grant: T,
}

impl<T> AccessPolicyUpdate<T> {
    /// Tags a grant as newly created.
    #[must_use]
    pub const fn create(grant: T) -> Self {
        Self {
            change: AccessPolicyChange::Create,
            grant,
        }
    }

    /// Tags a grant as updated in place.
    #[must_use]
    pub const fn update(grant: T) -> Self {
        Self {
            change: AccessPolicyChange::Update,
            grant,
        }
    }

    /// Tags a grant as deleted.
    #[must_use]
    pub const fn delete(grant: T) -> Self {
        Self {
            change: AccessPolicyChange::Delete,
            grant,
        }
    }

    /// Returns true when the change creates a new edge.
    #[must_use]
    pub fn is_create(&self) -> bool {
        self.change == AccessPolicyChange::Create
    }
}

// ============================================================================
// SECTION: Replace Composites
// ============================================================================

/// Desired user and group grants on a project.
///
/// Used by both people-replace handler variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleAccessPolicies {
    /// Anchor project.
    pub project_id: ProjectId,
    /// Organization owning the anchor project.
    pub organization_id: OrganizationId,
    /// Desired user grants.
    #[serde(default)]
    pub user_grants: Vec<UserGrant>,
    /// Desired group grants.
    #[serde(default)]
    pub group_grants: Vec<GroupGrant>,
}

impl PeopleAccessPolicies {
    /// Returns the distinct organization user ids.
    #[must_use]
    pub fn organization_user_ids(&self) -> BTreeSet<OrganizationUserId> {
        self.user_grants.iter().map(|grant| grant.organization_user_id).collect()
    }

    /// Returns the distinct group ids.
    #[must_use]
    pub fn group_ids(&self) -> BTreeSet<GroupId> {
        self.group_grants.iter().map(|grant| grant.group_id).collect()
    }

    /// Returns the number of grant edges carried.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.user_grants.len() + self.group_grants.len()
    }
}

/// Desired service-account grants on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectServiceAccountsAccessPolicies {
    /// Anchor project.
    pub project_id: ProjectId,
    /// Organization owning the anchor project.
    pub organization_id: OrganizationId,
    /// Desired service-account grants.
    #[serde(default)]
    pub service_account_grants: Vec<ServiceAccountGrant>,
}

impl ProjectServiceAccountsAccessPolicies {
    /// Returns the distinct service account ids.
    #[must_use]
    pub fn service_account_ids(&self) -> BTreeSet<ServiceAccountId> {
        self.service_account_grants.iter().map(|grant| grant.service_account_id).collect()
    }

    /// Returns the number of grant edges carried.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.service_account_grants.len()
    }
}

/// Desired project grants held by a service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountGrantedPolicies {
    /// Anchor service account (source of every edge).
    pub service_account_id: ServiceAccountId,
    /// Organization owning the anchor service account.
    pub organization_id: OrganizationId,
    /// Desired project grants.
    #[serde(default)]
    pub project_grants: Vec<ProjectGrant>,
}

impl ServiceAccountGrantedPolicies {
    /// Returns the distinct project ids.
    #[must_use]
    pub fn project_ids(&self) -> BTreeSet<ProjectId> {
        self.project_grants.iter().map(|grant| grant.project_id).collect()
    }

    /// Returns the number of grant edges carried.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.project_grants.len()
    }
}

/// Desired user and group grants on a service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountPeopleAccessPolicies {
    /// Anchor service account.
    pub service_account_id: ServiceAccountId,
    /// Organization owning the anchor service account.
    pub organization_id: OrganizationId,
    /// Desired user grants.
    #[serde(default)]
    pub user_grants: Vec<UserGrant>,
    /// Desired group grants.
    #[serde(default)]
    pub group_grants: Vec<GroupGrant>,
}

impl ServiceAccountPeopleAccessPolicies {
    /// Returns the distinct organization user ids.
    #[must_use]
    pub fn organization_user_ids(&self) -> BTreeSet<OrganizationUserId> {
        self.user_grants.iter().map(|grant| grant.organization_user_id).collect()
    }

    /// Returns the distinct group ids.
    #[must_use]
    pub fn group_ids(&self) -> BTreeSet<GroupId> {
        self.group_grants.iter().map(|grant| grant.group_id).collect()
    }

    /// Returns the number of grant edges carried.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.user_grants.len() + self.group_grants.len()
    }
}

// ============================================================================
// SECTION: Secret Updates
// ============================================================================

/// Tagged grant changes on one secret.
///
/// # Invariants
/// - An update with no edge changes at all is not a valid request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretAccessPoliciesUpdates {
    /// Anchor secret.
    pub secret_id: SecretId,
    /// Organization owning the anchor secret.
    pub organization_id: OrganizationId,
    /// User edge changes.
    #[serde(default)]
    pub user_updates: Vec<AccessPolicyUpdate<UserGrant>>,
    /// Group edge changes.
    #[serde(default)]
    pub group_updates: Vec<AccessPolicyUpdate<GroupGrant>>,
    /// Service-account edge changes.
    #[serde(default)]
    pub service_account_updates: Vec<AccessPolicyUpdate<ServiceAccountGrant>>,
}

impl SecretAccessPoliciesUpdates {
    /// Returns the distinct organization user ids touched by any change.
    #[must_use]
    pub fn organization_user_ids(&self) -> BTreeSet<OrganizationUserId> {
        self.user_updates.iter().map(|update| update.grant.organization_user_id).collect()
    }

    /// Returns the distinct group ids touched by any change.
    #[must_use]
    pub fn group_ids(&self) -> BTreeSet<GroupId> {
        self.group_updates.iter().map(|update| update.grant.group_id).collect()
    }

    /// Returns the distinct service account ids touched by any change.
    #[must_use]
    pub fn service_account_ids(&self) -> BTreeSet<ServiceAccountId> {
        self.service_account_updates.iter().map(|update| update.grant.service_account_id).collect()
    }

    /// Returns the distinct service account ids introduced by `Create` changes.
    #[must_use]
    pub fn created_service_account_ids(&self) -> BTreeSet<ServiceAccountId> {
        self.service_account_updates
            .iter()
            .filter(|update| update.is_create())
            .map(|update| update.grant.service_account_id)
            .collect()
    }

    /// Returns true when every change in the batch is tagged `Create`.
    #[must_use]
    pub fn all_creates(&self) -> bool {
        self.user_updates.iter().all(AccessPolicyUpdate::is_create)
            && self.group_updates.iter().all(AccessPolicyUpdate::is_create)
            && self.service_account_updates.iter().all(AccessPolicyUpdate::is_create)
    }

    /// Returns the number of edge changes carried.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.user_updates.len() + self.group_updates.len() + self.service_account_updates.len()
    }

    /// Returns true when the batch carries no edge changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
