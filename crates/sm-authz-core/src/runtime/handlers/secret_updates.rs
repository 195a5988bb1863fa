// crates/sm-authz-core/src/runtime/handlers/secret_updates.rs
// ============================================================================
// Module: Secret Access Policies Updates Handler
// Description: Tagged grant changes on one secret across users, groups, service accounts.
// Purpose: Validate grantee organizations, secret write, and new service-account grants.
// Dependencies: crate::{core, interfaces, runtime}, async-trait
// ============================================================================

//! ## Overview
//! Both `Create` and `Updates` run the same machinery; `Create` first
//! requires every change in the batch to be tagged `Create`. A batch with no
//! changes is rejected before any lookup.
//!
//! Guards, joined per the engine's lookup mode:
//! - write on the secret;
//! - every referenced user, group and service account belongs to the
//!   secret's organization;
//! - write on every service account introduced by a `Create` change. When no
//!   change creates a service-account grant, service-account access is
//!   never consulted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;

use super::AuthorizationHandler;
use super::HandlerContext;
use crate::core::composites::SecretAccessPoliciesUpdates;
use crate::core::operations::SecretAccessPoliciesOperation;
use crate::interfaces::CurrentCaller;
use crate::interfaces::LookupError;
use crate::runtime::guards::Guard;
use crate::runtime::guards::GuardFailure;
use crate::runtime::guards::all3;
use crate::runtime::guards::conclude;
use crate::runtime::guards::ensure;
use crate::runtime::guards::require;
use crate::runtime::membership::OrganizationMembershipValidator;
use crate::runtime::membership::SameOrganizationMembership;
use crate::runtime::membership::service_accounts_in_organization;
use crate::runtime::outcome::DenyReason;
use crate::runtime::outcome::Outcome;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Authorizes tagged grant changes on a secret.
#[derive(Clone)]
pub struct SecretAccessPoliciesUpdatesHandler {
    /// Shared handler state.
    ctx: HandlerContext,
    /// Predicate membership.
    membership: SameOrganizationMembership,
}

impl SecretAccessPoliciesUpdatesHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(ctx: HandlerContext) -> Self {
        let membership = SameOrganizationMembership::new(&ctx.collaborators);
        Self {
            ctx,
            membership,
        }
    }

    /// Runs every guard for the batch.
    async fn evaluate(
        &self,
        caller: &dyn CurrentCaller,
        operation: SecretAccessPoliciesOperation,
        target: &SecretAccessPoliciesUpdates,
    ) -> Guard {
        if operation == SecretAccessPoliciesOperation::Create {
            ensure(target.all_creates(), DenyReason::NonCreateChange)?;
        }
        ensure(!target.is_empty(), DenyReason::EmptyRequest)?;

        let organization_id = target.organization_id;
        let client = self.ctx.mutating_client(caller, organization_id).await?;
        let users = target.organization_user_ids();
        let groups = target.group_ids();
        let service_accounts = target.service_account_ids();
        let created_service_accounts = target.created_service_account_ids();

        let secret_write = async {
            let bits = self.ctx.resolver.secret(client, target.secret_id).await?;
            ensure(bits.write, DenyReason::InsufficientAccess)
        };
        let created_write = async {
            if created_service_accounts.is_empty() {
                return Ok(());
            }
            let batch =
                self.ctx.resolver.service_accounts(client, &created_service_accounts).await?;
            batch.require_writable(&created_service_accounts).map_err(GuardFailure::Denied)
        };
        let grantees = all3(
            self.ctx.mode,
            require(
                self.membership.users_in_organization(&users, organization_id),
                DenyReason::GranteeOutsideOrganization,
            ),
            require(
                self.membership.groups_in_organization(&groups, organization_id),
                DenyReason::GranteeOutsideOrganization,
            ),
            require(
                service_accounts_in_organization(
                    self.ctx.collaborators.service_accounts.as_ref(),
                    &service_accounts,
                    organization_id,
                ),
                DenyReason::GranteeOutsideOrganization,
            ),
        );
        all3(self.ctx.mode, secret_write, grantees, created_write).await
    }
}

#[async_trait]
impl AuthorizationHandler for SecretAccessPoliciesUpdatesHandler {
    type Operation = SecretAccessPoliciesOperation;
    type Target = SecretAccessPoliciesUpdates;

    async fn handle(
        &self,
        caller: &dyn CurrentCaller,
        operation: SecretAccessPoliciesOperation,
        target: &SecretAccessPoliciesUpdates,
    ) -> Result<Outcome, LookupError> {
        conclude(self.evaluate(caller, operation, target).await)
    }
}
