// crates/sm-authz-core/src/core/operations.rs
// ============================================================================
// Module: Operation Registry
// Description: Closed operation tokens per composite shape and request bundles.
// Purpose: Let the dispatcher match operations exhaustively at compile time.
// Dependencies: crate::core::{composites, policies}, serde
// ============================================================================

//! ## Overview
//! Each composite shape has its own closed operation enum. The cross-shape
//! [`OperationToken`] and [`AuthorizationTarget`] wrap those enums and
//! shapes so a single entry point can accept any request. Pairing a token
//! with a target of another shape is a wiring bug and is reported as an
//! error by the authorizer, never as a denial.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::composites::PeopleAccessPolicies;
use crate::core::composites::ProjectServiceAccountsAccessPolicies;
use crate::core::composites::SecretAccessPoliciesUpdates;
use crate::core::composites::ServiceAccountGrantedPolicies;
use crate::core::composites::ServiceAccountPeopleAccessPolicies;
use crate::core::identifiers::OrganizationId;
use crate::core::policies::AccessPolicy;

// ============================================================================
// SECTION: Per-Shape Operations
// ============================================================================

/// Operations on a single access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicyOperation {
    /// Create the edge.
    Create,
    /// Change the edge's bits.
    Update,
    /// Remove the edge.
    Delete,
}

/// Operations on project people grants (legacy membership path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeopleAccessPoliciesOperation {
    /// Replace every user and group grant on the project.
    ReplaceProjectPeople,
}

/// Operations on project people grants (consolidated membership path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectPeopleAccessPoliciesOperation {
    /// Replace every user and group grant on the project.
    Replace,
}

/// Operations on a project's service-account grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectServiceAccountsAccessPoliciesOperation {
    /// Replace every service-account grant on the project.
    Replace,
}

/// Operations on the projects granted to a service account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAccountGrantedPoliciesOperation {
    /// Replace every project granted to the service account.
    Replace,
}

/// Operations on a service account's people grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAccountPeopleAccessPoliciesOperation {
    /// Replace every user and group grant on the service account.
    ReplaceServiceAccountPeople,
}

/// Operations on a secret's grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretAccessPoliciesOperation {
    /// Grants created together with a new secret.
    Create,
    /// Tagged changes on an existing secret.
    Updates,
}

// ============================================================================
// SECTION: Cross-Shape Token
// ============================================================================

/// Operation token accepted by the authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", content = "operation", rename_all = "snake_case")]
pub enum OperationToken {
    /// Single access policy operation.
    AccessPolicy(AccessPolicyOperation),
    /// Legacy project people operation.
    PeopleAccessPolicies(PeopleAccessPoliciesOperation),
    /// Consolidated project people operation.
    ProjectPeopleAccessPolicies(ProjectPeopleAccessPoliciesOperation),
    /// Project service accounts operation.
    ProjectServiceAccountsAccessPolicies(ProjectServiceAccountsAccessPoliciesOperation),
    /// Service account granted projects operation.
    ServiceAccountGrantedPolicies(ServiceAccountGrantedPoliciesOperation),
    /// Service account people operation.
    ServiceAccountPeopleAccessPolicies(ServiceAccountPeopleAccessPoliciesOperation),
    /// Secret grants operation.
    SecretAccessPolicies(SecretAccessPoliciesOperation),
}

impl OperationToken {
    /// Returns a stable label for audit output and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AccessPolicy(AccessPolicyOperation::Create) => "access_policy.create",
            Self::AccessPolicy(AccessPolicyOperation::Update) => "access_policy.update",
            Self::AccessPolicy(AccessPolicyOperation::Delete) => "access_policy.delete",
            Self::PeopleAccessPolicies(PeopleAccessPoliciesOperation::ReplaceProjectPeople) => {
                "people_access_policies.replace_project_people"
            }
            Self::ProjectPeopleAccessPolicies(ProjectPeopleAccessPoliciesOperation::Replace) => {
                "project_people_access_policies.replace"
            }
            Self::ProjectServiceAccountsAccessPolicies(
                ProjectServiceAccountsAccessPoliciesOperation::Replace,
            ) => "project_service_accounts_access_policies.replace",
            Self::ServiceAccountGrantedPolicies(ServiceAccountGrantedPoliciesOperation::Replace) => {
                "service_account_granted_policies.replace"
            }
            Self::ServiceAccountPeopleAccessPolicies(
                ServiceAccountPeopleAccessPoliciesOperation::ReplaceServiceAccountPeople,
            ) => "service_account_people_access_policies.replace_service_account_people",
            Self::SecretAccessPolicies(SecretAccessPoliciesOperation::Create) => {
                "secret_access_policies.create"
            }
            Self::SecretAccessPolicies(SecretAccessPoliciesOperation::Updates) => {
                "secret_access_policies.updates"
            }
        }
    }
}

impl From<AccessPolicyOperation> for OperationToken {
    fn from(value: AccessPolicyOperation) -> Self {
        Self::AccessPolicy(value)
    }
}

impl From<PeopleAccessPoliciesOperation> for OperationToken {
    fn from(value: PeopleAccessPoliciesOperation) -> Self {
        Self::PeopleAccessPolicies(value)
    }
}

impl From<ProjectPeopleAccessPoliciesOperation> for OperationToken {
    fn from(value: ProjectPeopleAccessPoliciesOperation) -> Self {
        Self::ProjectPeopleAccessPolicies(value)
    }
}

impl From<ProjectServiceAccountsAccessPoliciesOperation> for OperationToken {
    fn from(value: ProjectServiceAccountsAccessPoliciesOperation) -> Self {
        Self::ProjectServiceAccountsAccessPolicies(value)
    }
}

impl From<ServiceAccountGrantedPoliciesOperation> for OperationToken {
    fn from(value: ServiceAccountGrantedPoliciesOperation) -> Self {
        Self::ServiceAccountGrantedPolicies(value)
    }
}

impl From<ServiceAccountPeopleAccessPoliciesOperation> for OperationToken {
    fn from(value: ServiceAccountPeopleAccessPoliciesOperation) -> Self {
        Self::ServiceAccountPeopleAccessPolicies(value)
    }
}

impl From<SecretAccessPoliciesOperation> for OperationToken {
    fn from(value: SecretAccessPoliciesOperation) -> Self {
        Self::SecretAccessPolicies(value)
    }
}

// ============================================================================
// SECTION: Targets
// ============================================================================

/// Resource snapshot the operation is applied to.
///
/// Both people-replace variants carry [`PeopleAccessPolicies`]; the variant
/// selects the membership validation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum AuthorizationTarget {
    /// Single access policy edge.
    AccessPolicy(AccessPolicy),
    /// Project people grants, legacy membership path.
    PeopleAccessPolicies(PeopleAccessPolicies),
    /// Project people grants, consolidated membership path.
    ProjectPeopleAccessPolicies(PeopleAccessPolicies),
    /// Project service-account grants.
    ProjectServiceAccountsAccessPolicies(ProjectServiceAccountsAccessPolicies),
    /// Projects granted to a service account.
    ServiceAccountGrantedPolicies(ServiceAccountGrantedPolicies),
    /// Service account people grants.
    ServiceAccountPeopleAccessPolicies(ServiceAccountPeopleAccessPolicies),
    /// Secret grant changes.
    SecretAccessPoliciesUpdates(SecretAccessPoliciesUpdates),
}

impl AuthorizationTarget {
    /// Returns a stable label for the target shape.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::AccessPolicy(_) => "access_policy",
            Self::PeopleAccessPolicies(_) => "people_access_policies",
            Self::ProjectPeopleAccessPolicies(_) => "project_people_access_policies",
            Self::ProjectServiceAccountsAccessPolicies(_) => {
                "project_service_accounts_access_policies"
            }
            Self::ServiceAccountGrantedPolicies(_) => "service_account_granted_policies",
            Self::ServiceAccountPeopleAccessPolicies(_) => {
                "service_account_people_access_policies"
            }
            Self::SecretAccessPoliciesUpdates(_) => "secret_access_policies_updates",
        }
    }

    /// Returns the anchor organization when the target carries it directly.
    ///
    /// Single policies resolve their organization from loaded snapshots, so
    /// this returns `None` for them unless the snapshot is pre-loaded.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self {
            Self::AccessPolicy(policy) => policy.resource().map(|resource| resource.organization_id()),
            Self::PeopleAccessPolicies(value) | Self::ProjectPeopleAccessPolicies(value) => {
                Some(value.organization_id)
            }
            Self::ProjectServiceAccountsAccessPolicies(value) => Some(value.organization_id),
            Self::ServiceAccountGrantedPolicies(value) => Some(value.organization_id),
            Self::ServiceAccountPeopleAccessPolicies(value) => Some(value.organization_id),
            Self::SecretAccessPoliciesUpdates(value) => Some(value.organization_id),
        }
    }

    /// Returns the number of grant edges the target carries.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        match self {
            Self::AccessPolicy(_) => 1,
            Self::PeopleAccessPolicies(value) | Self::ProjectPeopleAccessPolicies(value) => {
                value.edge_count()
            }
            Self::ProjectServiceAccountsAccessPolicies(value) => value.edge_count(),
            Self::ServiceAccountGrantedPolicies(value) => value.edge_count(),
            Self::ServiceAccountPeopleAccessPolicies(value) => value.edge_count(),
            Self::SecretAccessPoliciesUpdates(value) => value.edge_count(),
        }
    }
}

/// One authorization request: an operation applied to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Operation token.
    pub operation: OperationToken,
    /// Target snapshot.
    pub target: AuthorizationTarget,
}

impl AuthorizationRequest {
    /// Bundles an operation and a target.
    #[must_use]
    pub fn new(operation: impl Into<OperationToken>, target: AuthorizationTarget) -> Self {
        Self {
            operation: operation.into(),
            target,
        }
    }
}
