// crates/sm-authz-core/src/runtime/handlers/project_service_accounts.rs
// ============================================================================
// Module: Project Service Accounts Handler
// Description: Replacement of the service-account grants on a project.
// Purpose: Require write on the project and on every listed service account.
// Dependencies: crate::{core, interfaces, runtime}, async-trait
// ============================================================================

//! ## Overview
//! Service-account and organization callers are rejected by the caller gate
//! whatever bits they hold. For user callers the project write lookup, the
//! service-account batch lookup and the organization check run as
//! independent guards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;

use super::AuthorizationHandler;
use super::HandlerContext;
use crate::core::composites::ProjectServiceAccountsAccessPolicies;
use crate::core::operations::ProjectServiceAccountsAccessPoliciesOperation;
use crate::interfaces::CurrentCaller;
use crate::interfaces::LookupError;
use crate::runtime::guards::Guard;
use crate::runtime::guards::GuardFailure;
use crate::runtime::guards::all3;
use crate::runtime::guards::conclude;
use crate::runtime::guards::ensure;
use crate::runtime::guards::require;
use crate::runtime::membership::service_accounts_in_organization;
use crate::runtime::outcome::DenyReason;
use crate::runtime::outcome::Outcome;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Authorizes replacing a project's service-account grants.
#[derive(Clone)]
pub struct ProjectServiceAccountsAccessPoliciesHandler {
    /// Shared handler state.
    ctx: HandlerContext,
}

impl ProjectServiceAccountsAccessPoliciesHandler {
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
        target: &ProjectServiceAccountsAccessPolicies,
    ) -> Guard {
        let organization_id = target.organization_id;
        let client = self.ctx.mutating_client(caller, organization_id).await?;
        let service_account_ids = target.service_account_ids();
        let project_write = async {
            let bits = self.ctx.resolver.project(client, target.project_id).await?;
            ensure(bits.write, DenyReason::InsufficientAccess)
        };
        let service_accounts_write = async {
            if service_account_ids.is_empty() {
                return Ok(());
            }
            let batch = self.ctx.resolver.service_accounts(client, &service_account_ids).await?;
            batch.require_writable(&service_account_ids).map_err(GuardFailure::Denied)
        };
        all3(
            self.ctx.mode,
            project_write,
            service_accounts_write,
            require(
                service_accounts_in_organization(
                    self.ctx.collaborators.service_accounts.as_ref(),
                    &service_account_ids,
                    organization_id,
                ),
                DenyReason::GranteeOutsideOrganization,
            ),
        )
        .await
    }
}

#[async_trait]
impl AuthorizationHandler for ProjectServiceAccountsAccessPoliciesHandler {
    type Operation = ProjectServiceAccountsAccessPoliciesOperation;
    type Target = ProjectServiceAccountsAccessPolicies;

    async fn handle(
        &self,
        caller: &dyn CurrentCaller,
        operation: ProjectServiceAccountsAccessPoliciesOperation,
        target: &ProjectServiceAccountsAccessPolicies,
    ) -> Result<Outcome, LookupError> {
        match operation {
            ProjectServiceAccountsAccessPoliciesOperation::Replace => {
                conclude(self.evaluate(caller, target).await)
            }
        }
    }
}
