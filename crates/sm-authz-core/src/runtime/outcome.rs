// crates/sm-authz-core/src/runtime/outcome.rs
// ============================================================================
// Module: Handler Outcomes
// Description: Internal allow/deny outcomes with audit-only deny reasons.
// Purpose: Record why a request was denied without exposing it to callers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Handlers return an [`Outcome`]. The authorizer collapses it to a bare
//! decision for the caller and keeps the [`DenyReason`] for audit records.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Failed guard that caused a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Caller lacks secrets manager access in the organization.
    NoSecretsManagerAccess,
    /// Caller has no resolvable identity.
    MissingCallerIdentity,
    /// Caller class may not mutate grants.
    UnsupportedClient,
    /// A referenced entity does not exist.
    ResourceNotFound,
    /// Two referenced entities live in different organizations.
    OrganizationMismatch,
    /// A grantee does not belong to the anchor's organization.
    GranteeOutsideOrganization,
    /// Caller lacks write access.
    InsufficientAccess,
    /// A batch lookup omitted requested ids.
    IncompleteAccessResults,
    /// The request carries no grant changes.
    EmptyRequest,
    /// A create request carries non-create changes.
    NonCreateChange,
    /// The request carries more grant edges than allowed.
    TooManyGrants,
}

impl DenyReason {
    /// Returns a stable label for audit output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoSecretsManagerAccess => "no_secrets_manager_access",
            Self::MissingCallerIdentity => "missing_caller_identity",
            Self::UnsupportedClient => "unsupported_client",
            Self::ResourceNotFound => "resource_not_found",
            Self::OrganizationMismatch => "organization_mismatch",
            Self::GranteeOutsideOrganization => "grantee_outside_organization",
            Self::InsufficientAccess => "insufficient_access",
            Self::IncompleteAccessResults => "incomplete_access_results",
            Self::EmptyRequest => "empty_request",
            Self::NonCreateChange => "non_create_change",
            Self::TooManyGrants => "too_many_grants",
        }
    }
}

/// Handler result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every guard passed.
    Allowed,
    /// A guard failed.
    Denied(DenyReason),
}

impl Outcome {
    /// Returns true for [`Outcome::Allowed`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the deny reason, if any.
    #[must_use]
    pub const fn deny_reason(self) -> Option<DenyReason> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}
