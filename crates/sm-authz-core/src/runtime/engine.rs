// crates/sm-authz-core/src/runtime/engine.rs
// ============================================================================
// Module: Access Policy Authorizer
// Description: Single entry point dispatching requests to per-shape handlers.
// Purpose: Answer allow/deny for grant mutations and surface wiring bugs loudly.
// Dependencies: crate::{core, interfaces, runtime}, serde, thiserror
// ============================================================================

//! ## Overview
//! [`AccessPolicyAuthorizer::authorize`] matches the operation token against
//! the target shape and runs the matching handler. The caller only ever
//! sees [`AuthorizationDecision::Allow`] or [`AuthorizationDecision::Deny`];
//! the reason for a denial goes to the audit sink.
//!
//! ## Invariants
//! - A token paired with a target of another shape is
//!   [`AuthzError::UnsupportedOperation`], never a denial.
//! - Lookup failures surface as [`AuthzError::Lookup`], never as an allow.
//! - Requests over the grant limit are denied before any lookup.
//! - Dropping the returned future cancels every in-flight lookup; a
//!   cancelled decision produces no result at all.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::operations::AuthorizationRequest;
use crate::core::operations::AuthorizationTarget;
use crate::core::operations::OperationToken;
use crate::interfaces::Collaborators;
use crate::interfaces::CurrentCaller;
use crate::interfaces::LookupError;
use crate::runtime::audit::AuthzAuditEvent;
use crate::runtime::audit::AuthzAuditEventParams;
use crate::runtime::audit::AuthzAuditSink;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::handlers::AccessPolicyHandler;
use crate::runtime::handlers::AuthorizationHandler;
use crate::runtime::handlers::HandlerContext;
use crate::runtime::handlers::PeopleAccessPoliciesHandler;
use crate::runtime::handlers::ProjectPeopleAccessPoliciesHandler;
use crate::runtime::handlers::ProjectServiceAccountsAccessPoliciesHandler;
use crate::runtime::handlers::SecretAccessPoliciesUpdatesHandler;
use crate::runtime::handlers::ServiceAccountGrantedPoliciesHandler;
use crate::runtime::handlers::ServiceAccountPeopleAccessPoliciesHandler;
use crate::runtime::outcome::DenyReason;
use crate::runtime::outcome::Outcome;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Default upper bound on grant edges per request.
pub const DEFAULT_MAX_GRANTS_PER_REQUEST: usize = 1_000;

/// How independent lookups inside one decision are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// Issue together and stop at the first failing guard.
    #[default]
    Concurrent,
    /// Issue one after another in guard order.
    Sequential,
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Lookup join strategy.
    pub lookup_mode: LookupMode,
    /// Requests carrying more grant edges are denied.
    pub max_grants_per_request: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            lookup_mode: LookupMode::default(),
            max_grants_per_request: DEFAULT_MAX_GRANTS_PER_REQUEST,
        }
    }
}

// ============================================================================
// SECTION: Decisions and Errors
// ============================================================================

/// Decision returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationDecision {
    /// The mutation may proceed.
    Allow,
    /// The mutation is forbidden.
    Deny,
}

impl AuthorizationDecision {
    /// Returns true for [`AuthorizationDecision::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl From<Outcome> for AuthorizationDecision {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Allowed => Self::Allow,
            Outcome::Denied(_) => Self::Deny,
        }
    }
}

/// Authorization failures that are not decisions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// The operation token does not apply to the target shape.
    #[error("operation {operation} is not supported for {target}")]
    UnsupportedOperation {
        /// Operation label.
        operation: &'static str,
        /// Target shape label.
        target: &'static str,
    },
    /// A collaborator lookup failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

// ============================================================================
// SECTION: Authorizer
// ============================================================================

/// Access-policy authorization engine.
pub struct AccessPolicyAuthorizer {
    /// Single policy handler.
    access_policy: AccessPolicyHandler,
    /// Project people handler (row comparison).
    people: PeopleAccessPoliciesHandler,
    /// Project people handler (predicate).
    project_people: ProjectPeopleAccessPoliciesHandler,
    /// Project service accounts handler.
    project_service_accounts: ProjectServiceAccountsAccessPoliciesHandler,
    /// Service account granted projects handler.
    service_account_granted: ServiceAccountGrantedPoliciesHandler,
    /// Service account people handler.
    service_account_people: ServiceAccountPeopleAccessPoliciesHandler,
    /// Secret updates handler.
    secret_updates: SecretAccessPoliciesUpdatesHandler,
    /// Engine settings.
    settings: EngineSettings,
    /// Decision audit sink.
    audit: Arc<dyn AuthzAuditSink>,
}

impl AccessPolicyAuthorizer {
    /// Builds an authorizer with a no-op audit sink.
    #[must_use]
    pub fn new(collaborators: Collaborators, settings: EngineSettings) -> Self {
        let ctx = HandlerContext::new(collaborators, settings.lookup_mode);
        Self {
            access_policy: AccessPolicyHandler::new(ctx.clone()),
            people: PeopleAccessPoliciesHandler::new(ctx.clone()),
            project_people: ProjectPeopleAccessPoliciesHandler::new(ctx.clone()),
            project_service_accounts: ProjectServiceAccountsAccessPoliciesHandler::new(
                ctx.clone(),
            ),
            service_account_granted: ServiceAccountGrantedPoliciesHandler::new(ctx.clone()),
            service_account_people: ServiceAccountPeopleAccessPoliciesHandler::new(ctx.clone()),
            secret_updates: SecretAccessPoliciesUpdatesHandler::new(ctx),
            settings,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuthzAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the engine settings.
    #[must_use]
    pub const fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Decides whether the caller may perform the requested mutation.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::UnsupportedOperation`] when the token does not
    /// apply to the target shape and [`AuthzError::Lookup`] when a
    /// collaborator lookup fails.
    pub async fn authorize(
        &self,
        caller: &dyn CurrentCaller,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, AuthzError> {
        let edge_count = request.target.edge_count();
        let outcome = if edge_count > self.settings.max_grants_per_request {
            ensure_supported(request.operation, &request.target)?;
            Outcome::Denied(DenyReason::TooManyGrants)
        } else {
            self.dispatch(caller, request.operation, &request.target).await?
        };
        self.audit.record(&AuthzAuditEvent::new(AuthzAuditEventParams {
            operation: request.operation.name(),
            target: request.target.shape(),
            organization_id: request.target.organization_id(),
            edge_count,
            client_class: caller.client_class(),
            outcome,
        }));
        Ok(AuthorizationDecision::from(outcome))
    }

    /// Routes the request to the handler for its shape.
    async fn dispatch(
        &self,
        caller: &dyn CurrentCaller,
        operation: OperationToken,
        target: &AuthorizationTarget,
    ) -> Result<Outcome, AuthzError> {
        let outcome = match (operation, target) {
            (OperationToken::AccessPolicy(op), AuthorizationTarget::AccessPolicy(value)) => {
                self.access_policy.handle(caller, op, value).await?
            }
            (
                OperationToken::PeopleAccessPolicies(op),
                AuthorizationTarget::PeopleAccessPolicies(value),
            ) => self.people.handle(caller, op, value).await?,
            (
                OperationToken::ProjectPeopleAccessPolicies(op),
                AuthorizationTarget::ProjectPeopleAccessPolicies(value),
            ) => self.project_people.handle(caller, op, value).await?,
            (
                OperationToken::ProjectServiceAccountsAccessPolicies(op),
                AuthorizationTarget::ProjectServiceAccountsAccessPolicies(value),
            ) => self.project_service_accounts.handle(caller, op, value).await?,
            (
                OperationToken::ServiceAccountGrantedPolicies(op),
                AuthorizationTarget::ServiceAccountGrantedPolicies(value),
            ) => self.service_account_granted.handle(caller, op, value).await?,
            (
                OperationToken::ServiceAccountPeopleAccessPolicies(op),
                AuthorizationTarget::ServiceAccountPeopleAccessPolicies(value),
            ) => self.service_account_people.handle(caller, op, value).await?,
            (
                OperationToken::SecretAccessPolicies(op),
                AuthorizationTarget::SecretAccessPoliciesUpdates(value),
            ) => self.secret_updates.handle(caller, op, value).await?,
            (operation, target) => return Err(unsupported(operation, target)),
        };
        Ok(outcome)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the wiring error for a mismatched token and target.
const fn unsupported(operation: OperationToken, target: &AuthorizationTarget) -> AuthzError {
    AuthzError::UnsupportedOperation {
        operation: operation.name(),
        target: target.shape(),
    }
}

/// Fails when the token does not apply to the target shape.
fn ensure_supported(
    operation: OperationToken,
    target: &AuthorizationTarget,
) -> Result<(), AuthzError> {
    let supported = matches!(
        (operation, target),
        (OperationToken::AccessPolicy(_), AuthorizationTarget::AccessPolicy(_))
            | (
                OperationToken::PeopleAccessPolicies(_),
                AuthorizationTarget::PeopleAccessPolicies(_)
            )
            | (
                OperationToken::ProjectPeopleAccessPolicies(_),
                AuthorizationTarget::ProjectPeopleAccessPolicies(_)
            )
            | (
                OperationToken::ProjectServiceAccountsAccessPolicies(_),
                AuthorizationTarget::ProjectServiceAccountsAccessPolicies(_)
            )
            | (
                OperationToken::ServiceAccountGrantedPolicies(_),
                AuthorizationTarget::ServiceAccountGrantedPolicies(_)
            )
            | (
                OperationToken::ServiceAccountPeopleAccessPolicies(_),
                AuthorizationTarget::ServiceAccountPeopleAccessPolicies(_)
            )
            | (
                OperationToken::SecretAccessPolicies(_),
                AuthorizationTarget::SecretAccessPoliciesUpdates(_)
            )
    );
    if supported { Ok(()) } else { Err(unsupported(operation, target)) }
}
