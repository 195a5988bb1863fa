// crates/sm-authz-core/src/runtime/handlers/service_account_granted.rs
// ============================================================================
// Module: Service Account Granted Policies Handler
// Description: Replacement of the projects a service account may reach.
// Purpose: Check write only on projects that the replacement newly grants.
// Dependencies: crate::{core, interfaces, runtime}, async-trait
// ============================================================================

//! ## Overview
//! The caller needs write on the service account and every proposed project
//! must belong to the service account's organization. Project write is only
//! checked for projects absent from the stored grant set, so adding one
//! project to a service account with many existing grants costs exactly one
//! project lookup.
//!
//! ## Invariants
//! - The new-grant set is computed before any project access lookup runs.
//! - Unchanged grants are never re-checked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;

use super::AuthorizationHandler;
use super::HandlerContext;
use crate::core::composites::ServiceAccountGrantedPolicies;
use crate::core::operations::ServiceAccountGrantedPoliciesOperation;
use crate::interfaces::CurrentCaller;
use crate::interfaces::LookupError;
use crate::runtime::diff::GrantDiffEngine;
use crate::runtime::guards::Guard;
use crate::runtime::guards::GuardFailure;
use crate::runtime::guards::all3;
use crate::runtime::guards::conclude;
use crate::runtime::guards::ensure;
use crate::runtime::guards::require;
use crate::runtime::membership::projects_in_organization;
use crate::runtime::outcome::DenyReason;
use crate::runtime::outcome::Outcome;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Authorizes replacing the projects granted to a service account.
#[derive(Clone)]
pub struct ServiceAccountGrantedPoliciesHandler {
    /// Shared handler state.
    ctx: HandlerContext,
}

impl ServiceAccountGrantedPoliciesHandler {
    /// Builds the handler.
    #[must_use]
    pub const fn new(ctx: HandlerContext) -> Self {
        Self {
            ctx,
        }
    }

    /// Runs every guard for the replacement.
    async fn evaluate(
        &self,
        caller: &dyn CurrentCaller,
        target: &ServiceAccountGrantedPolicies,
    ) -> Guard {
        let organization_id = target.organization_id;
        let client = self.ctx.mutating_client(caller, organization_id).await?;
        let proposed = target.project_ids();
        let service_account_write = async {
            let bits = self.ctx.resolver.service_account(client, target.service_account_id).await?;
            ensure(bits.write, DenyReason::InsufficientAccess)
        };
        let new_projects_write = async {
            let current = self
                .ctx
                .collaborators
                .grants
                .current_granted_projects(target.service_account_id)
                .await?;
            let introduced = GrantDiffEngine::new_grants(&current, &proposed);
            if introduced.is_empty() {
                return Ok(());
            }
            let batch = self.ctx.resolver.projects(client, &introduced).await?;
            batch.require_writable(&introduced).map_err(GuardFailure::Denied)
        };
        all3(
            self.ctx.mode,
            service_account_write,
            require(
                projects_in_organization(
                    self.ctx.collaborators.projects.as_ref(),
                    &proposed,
                    organization_id,
                ),
                DenyReason::OrganizationMismatch,
            ),
            new_projects_write,
        )
        .await
    }
}

#[async_trait]
impl AuthorizationHandler for ServiceAccountGrantedPoliciesHandler {
    type Operation = ServiceAccountGrantedPoliciesOperation;
    type Target = ServiceAccountGrantedPolicies;

    async fn handle(
        &self,
        caller: &dyn CurrentCaller,
        operation: ServiceAccountGrantedPoliciesOperation,
        target: &ServiceAccountGrantedPolicies,
    ) -> Result<Outcome, LookupError> {
        match operation {
            ServiceAccountGrantedPoliciesOperation::Replace => {
                conclude(self.evaluate(caller, target).await)
            }
        }
    }
}
