// crates/sm-authz-core/src/runtime/handlers/people.rs
// ============================================================================
// Module: People Replace Handlers
// Description: Replacement of user and group grants on a project or service account.
// Purpose: Validate grantee organizations and require write on the anchor.
// Dependencies: crate::{core, interfaces, runtime}, async-trait
// ============================================================================

//! ## Overview
//! Three handlers share one rule set:
//! - [`PeopleAccessPoliciesHandler`] validates grantees by loading rows.
//! - [`ProjectPeopleAccessPoliciesHandler`] validates grantees through the
//!   same-organization predicate.
//! - [`ServiceAccountPeopleAccessPoliciesHandler`] anchors on a service
//!   account and uses the predicate.
//!
//! The two project variants must reach identical outcomes for identical
//! inputs; they differ only in which collaborator answers membership.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::AuthorizationHandler;
use super::HandlerContext;
use crate::core::composites::PeopleAccessPolicies;
use crate::core::composites::ServiceAccountPeopleAccessPolicies;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::OrganizationUserId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::ServiceAccountId;
use crate::core::operations::PeopleAccessPoliciesOperation;
use crate::core::operations::ProjectPeopleAccessPoliciesOperation;
use crate::core::operations::ServiceAccountPeopleAccessPoliciesOperation;
use crate::interfaces::CurrentCaller;
use crate::interfaces::LookupError;
use crate::runtime::guards::Guard;
use crate::runtime::guards::all3;
use crate::runtime::guards::conclude;
use crate::runtime::guards::ensure;
use crate::runtime::guards::require;
use crate::runtime::membership::OrganizationMembershipValidator;
use crate::runtime::membership::RowComparisonMembership;
use crate::runtime::membership::SameOrganizationMembership;
use crate::runtime::outcome::DenyReason;
use crate::runtime::outcome::Outcome;

// ============================================================================
// SECTION: Shared Rule
// ============================================================================

/// Entity whose write access authorizes the replacement.
#[derive(Debug, Clone, Copy)]
enum Anchor {
    /// Project anchor.
    Project(ProjectId),
    /// Service account anchor.
    ServiceAccount(ServiceAccountId),
}

/// Grantees and anchor of one people replacement.
struct PeopleReplacement<'a> {
    /// Anchor organization.
    organization_id: OrganizationId,
    /// Anchor entity.
    anchor: Anchor,
    /// Proposed user grantees.
    users: &'a BTreeSet<OrganizationUserId>,
    /// Proposed group grantees.
    groups: &'a BTreeSet<GroupId>,
}

/// Runs the people replacement guards.
async fn authorize_people(
    ctx: &HandlerContext,
    validator: &dyn OrganizationMembershipValidator,
    caller: &dyn CurrentCaller,
    replacement: PeopleReplacement<'_>,
) -> Guard {
    let organization_id = replacement.organization_id;
    let client = ctx.mutating_client(caller, organization_id).await?;
    let anchor_write = async {
        let bits = match replacement.anchor {
            Anchor::Project(project_id) => ctx.resolver.project(client, project_id).await?,
            Anchor::ServiceAccount(service_account_id) => {
                ctx.resolver.service_account(client, service_account_id).await?
            }
        };
        ensure(bits.write, DenyReason::InsufficientAccess)
    };
    all3(
        ctx.mode,
        require(
            validator.users_in_organization(replacement.users, organization_id),
            DenyReason::GranteeOutsideOrganization,
        ),
        require(
            validator.groups_in_organization(replacement.groups, organization_id),
            DenyReason::GranteeOutsideOrganization,
        ),
        anchor_write,
    )
    .await
}

/// Runs the project people guards with the given validator.
async fn authorize_project_people(
    ctx: &HandlerContext,
    validator: &dyn OrganizationMembershipValidator,
    caller: &dyn CurrentCaller,
    target: &PeopleAccessPolicies,
) -> Result<Outcome, LookupError> {
    let users = target.organization_user_ids();
    let groups = target.group_ids();
    let replacement = PeopleReplacement {
        organization_id: target.organization_id,
        anchor: Anchor::Project(target.project_id),
        users: &users,
        groups: &groups,
    };
    conclude(authorize_people(ctx, validator, caller, replacement).await)
}

// ============================================================================
// SECTION: Project People (row comparison)
// ============================================================================

/// Project people replacement validated by loading grantee rows.
#[derive(Clone)]
pub struct PeopleAccessPoliciesHandler {
    /// Shared handler state.
    ctx: HandlerContext,
    /// Row comparison membership.
    membership: RowComparisonMembership,
}

impl PeopleAccessPoliciesHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(ctx: HandlerContext) -> Self {
        let membership = RowComparisonMembership::new(&ctx.collaborators);
        Self {
            ctx,
            membership,
        }
    }
}

#[async_trait]
impl AuthorizationHandler for PeopleAccessPoliciesHandler {
    type Operation = PeopleAccessPoliciesOperation;
    type Target = PeopleAccessPolicies;

    async fn handle(
        &self,
        caller: &dyn CurrentCaller,
        operation: PeopleAccessPoliciesOperation,
        target: &PeopleAccessPolicies,
    ) -> Result<Outcome, LookupError> {
        match operation {
            PeopleAccessPoliciesOperation::ReplaceProjectPeople => {
                authorize_project_people(&self.ctx, &self.membership, caller, target).await
            }
        }
    }
}

// ============================================================================
// SECTION: Project People (predicate)
// ============================================================================

/// Project people replacement validated by the same-organization predicate.
#[derive(Clone)]
pub struct ProjectPeopleAccessPoliciesHandler {
    /// Shared handler state.
    ctx: HandlerContext,
    /// Predicate membership.
    membership: SameOrganizationMembership,
}

impl ProjectPeopleAccessPoliciesHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(ctx: HandlerContext) -> Self {
        let membership = SameOrganizationMembership::new(&ctx.collaborators);
        Self {
            ctx,
            membership,
        }
    }
}

#[async_trait]
impl AuthorizationHandler for ProjectPeopleAccessPoliciesHandler {
    type Operation = ProjectPeopleAccessPoliciesOperation;
    type Target = PeopleAccessPolicies;

    async fn handle(
        &self,
        caller: &dyn CurrentCaller,
        operation: ProjectPeopleAccessPoliciesOperation,
        target: &PeopleAccessPolicies,
    ) -> Result<Outcome, LookupError> {
        match operation {
            ProjectPeopleAccessPoliciesOperation::Replace => {
                authorize_project_people(&self.ctx, &self.membership, caller, target).await
            }
        }
    }
}

// ============================================================================
// SECTION: Service Account People
// ============================================================================

/// Service account people replacement.
#[derive(Clone)]
pub struct ServiceAccountPeopleAccessPoliciesHandler {
    /// Shared handler state.
    ctx: HandlerContext,
    /// Predicate membership.
    membership: SameOrganizationMembership,
}

impl ServiceAccountPeopleAccessPoliciesHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(ctx: HandlerContext) -> Self {
        let membership = SameOrganizationMembership::new(&ctx.collaborators);
        Self {
            ctx,
            membership,
        }
    }
}

#[async_trait]
impl AuthorizationHandler for ServiceAccountPeopleAccessPoliciesHandler {
    type Operation = ServiceAccountPeopleAccessPoliciesOperation;
    type Target = ServiceAccountPeopleAccessPolicies;

    async fn handle(
        &self,
        caller: &dyn CurrentCaller,
        operation: ServiceAccountPeopleAccessPoliciesOperation,
        target: &ServiceAccountPeopleAccessPolicies,
    ) -> Result<Outcome, LookupError> {
        match operation {
            ServiceAccountPeopleAccessPoliciesOperation::ReplaceServiceAccountPeople => {
                let users = target.organization_user_ids();
                let groups = target.group_ids();
                let replacement = PeopleReplacement {
                    organization_id: target.organization_id,
                    anchor: Anchor::ServiceAccount(target.service_account_id),
                    users: &users,
                    groups: &groups,
                };
                conclude(
                    authorize_people(&self.ctx, &self.membership, caller, replacement)
                        .await,
                )
            }
        }
    }
}
