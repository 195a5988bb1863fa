// crates/sm-authz-core/src/runtime/membership.rs
// ============================================================================
// Module: Organization Membership Validation
// Description: Strategies that confirm grantees belong to the anchor organization.
// Purpose: Enforce the same-organization invariant on every grant edge.
// Dependencies: crate::{core, interfaces}, async-trait
// ============================================================================

//! ## Overview
//! Two strategies validate user and group grantees:
//! - [`RowComparisonMembership`] loads the rows and compares counts and
//!   organization ids.
//! - [`SameOrganizationMembership`] asks a single predicate collaborator.
//!
//! Both must agree on every input. Empty id sets are trivially valid and
//! never reach a collaborator. Service accounts and projects are always
//! checked through their access collaborators.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::identifiers::GroupId;
use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::OrganizationUserId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::ServiceAccountId;
use crate::interfaces::Collaborators;
use crate::interfaces::GroupDirectory;
use crate::interfaces::LookupError;
use crate::interfaces::OrgMembership;
use crate::interfaces::OrganizationUserDirectory;
use crate::interfaces::ProjectAccess;
use crate::interfaces::ServiceAccountAccess;

// ============================================================================
// SECTION: Validator Contract
// ============================================================================

/// Confirms user and group grantees belong to an organization.
#[async_trait]
pub trait OrganizationMembershipValidator: Send + Sync {
    /// Returns true when every organization user belongs to the organization.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn users_in_organization(
        &self,
        organization_user_ids: &BTreeSet<OrganizationUserId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError>;

    /// Returns true when every group belongs to the organization.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn groups_in_organization(
        &self,
        group_ids: &BTreeSet<GroupId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError>;
}

// ============================================================================
// SECTION: Row Comparison
// ============================================================================

/// Loads grantee rows and compares their organization ids.
#[derive(Clone)]
pub struct RowComparisonMembership {
    /// Organization user rows.
    users: Arc<dyn OrganizationUserDirectory>,
    /// Group rows.
    groups: Arc<dyn GroupDirectory>,
}

impl RowComparisonMembership {
    /// Builds the validator from the collaborator bundle.
    #[must_use]
    pub fn new(collaborators: &Collaborators) -> Self {
        Self {
            users: Arc::clone(&collaborators.organization_users),
            groups: Arc::clone(&collaborators.groups),
        }
    }
}

#[async_trait]
impl OrganizationMembershipValidator for RowComparisonMembership {
    async fn users_in_organization(
        &self,
        organization_user_ids: &BTreeSet<OrganizationUserId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        if organization_user_ids.is_empty() {
            return Ok(true);
        }
        let rows = self.users.get_many(organization_user_ids).await?;
        let found: BTreeSet<OrganizationUserId> = rows
            .iter()
            .filter(|row| row.organization_id == organization_id)
            .map(|row| row.id)
            .collect();
        Ok(rows.len() == organization_user_ids.len() && found == *organization_user_ids)
    }

    async fn groups_in_organization(
        &self,
        group_ids: &BTreeSet<GroupId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        if group_ids.is_empty() {
            return Ok(true);
        }
        let rows = self.groups.get_many(group_ids).await?;
        let found: BTreeSet<GroupId> = rows
            .iter()
            .filter(|row| row.organization_id == organization_id)
            .map(|row| row.id)
            .collect();
        Ok(rows.len() == group_ids.len() && found == *group_ids)
    }
}

// ============================================================================
// SECTION: Same-Organization Predicate
// ============================================================================

/// Delegates to the consolidated same-organization predicates.
#[derive(Clone)]
pub struct SameOrganizationMembership {
    /// Predicate collaborator.
    membership: Arc<dyn OrgMembership>,
}

impl SameOrganizationMembership {
    /// Builds the validator from the collaborator bundle.
    #[must_use]
    pub fn new(collaborators: &Collaborators) -> Self {
        Self {
            membership: Arc::clone(&collaborators.membership),
        }
    }
}

#[async_trait]
impl OrganizationMembershipValidator for SameOrganizationMembership {
    async fn users_in_organization(
        &self,
        organization_user_ids: &BTreeSet<OrganizationUserId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        if organization_user_ids.is_empty() {
            return Ok(true);
        }
        self.membership.users_belong_to_org(organization_user_ids, organization_id).await
    }

    async fn groups_in_organization(
        &self,
        group_ids: &BTreeSet<GroupId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        if group_ids.is_empty() {
            return Ok(true);
        }
        self.membership.groups_belong_to_org(group_ids, organization_id).await
    }
}

// ============================================================================
// SECTION: Service Accounts and Projects
// ============================================================================

/// Returns true when every service account belongs to the organization.
///
/// # Errors
///
/// Returns [`LookupError`] when the lookup fails.
pub async fn service_accounts_in_organization(
    service_accounts: &dyn ServiceAccountAccess,
    service_account_ids: &BTreeSet<ServiceAccountId>,
    organization_id: OrganizationId,
) -> Result<bool, LookupError> {
    if service_account_ids.is_empty() {
        return Ok(true);
    }
    service_accounts.all_belong_to_org(service_account_ids, organization_id).await
}

/// Returns true when every project belongs to the organization.
///
/// # Errors
///
/// Returns [`LookupError`] when the lookup fails.
pub async fn projects_in_organization(
    projects: &dyn ProjectAccess,
    project_ids: &BTreeSet<ProjectId>,
    organization_id: OrganizationId,
) -> Result<bool, LookupError> {
    if project_ids.is_empty() {
        return Ok(true);
    }
    projects.all_belong_to_org(project_ids, organization_id).await
}
