// crates/sm-authz-core/src/runtime/handlers/mod.rs
// ============================================================================
// Module: Authorization Handlers
// Description: One handler per grant request shape plus shared caller gating.
// Purpose: Compose resolver, membership, and diff blocks into per-shape rules.
// Dependencies: crate::{core, interfaces, runtime}, async-trait
// ============================================================================

//! ## Overview
//! Every request shape has a handler implementing [`AuthorizationHandler`].
//! Handlers share a [`HandlerContext`] that owns the collaborator bundle,
//! the [`PermissionResolver`] and the lookup mode, and they all start with
//! the same caller gate:
//! 1. The caller must have secrets manager access in the organization.
//! 2. The caller must resolve to an access client.
//! 3. Only user and admin access clients may mutate grants.
//!
//! A handler reaches [`Outcome::Allowed`] only after every guard passes.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod access_policy;
pub mod people;
pub mod project_service_accounts;
pub mod secret_updates;
pub mod service_account_granted;

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;

use crate::core::identifiers::OrganizationId;
use crate::interfaces::AccessClient;
use crate::interfaces::Collaborators;
use crate::interfaces::CurrentCaller;
use crate::interfaces::LookupError;
use crate::runtime::engine::LookupMode;
use crate::runtime::guards::GuardFailure;
use crate::runtime::guards::ensure;
use crate::runtime::outcome::DenyReason;
use crate::runtime::outcome::Outcome;
use crate::runtime::resolver::PermissionResolver;

pub use access_policy::AccessPolicyHandler;
pub use people::PeopleAccessPoliciesHandler;
pub use people::ProjectPeopleAccessPoliciesHandler;
pub use people::ServiceAccountPeopleAccessPoliciesHandler;
pub use project_service_accounts::ProjectServiceAccountsAccessPoliciesHandler;
pub use secret_updates::SecretAccessPoliciesUpdatesHandler;
pub use service_account_granted::ServiceAccountGrantedPoliciesHandler;

// ============================================================================
// SECTION: Handler Contract
// ============================================================================

/// Authorizes one operation against one request shape.
#[async_trait]
pub trait AuthorizationHandler: Send + Sync {
    /// Operation enum accepted by the handler.
    type Operation: Copy + Send + Sync;
    /// Request shape authorized by the handler.
    type Target: Send + Sync;

    /// Evaluates every guard for the request.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when a collaborator lookup fails.
    async fn handle(
        &self,
        caller: &dyn CurrentCaller,
        operation: Self::Operation,
        target: &Self::Target,
    ) -> Result<Outcome, LookupError>;
}

// ============================================================================
// SECTION: Shared Context
// ============================================================================

/// State shared by every handler.
#[derive(Clone)]
pub struct HandlerContext {
    /// Collaborator bundle.
    collaborators: Collaborators,
    /// Access resolution.
    resolver: PermissionResolver,
    /// Join strategy for independent lookups.
    mode: LookupMode,
}

impl HandlerContext {
    /// Builds the shared context.
    #[must_use]
    pub fn new(collaborators: Collaborators, mode: LookupMode) -> Self {
        let resolver = PermissionResolver::new(&collaborators);
        Self {
            collaborators,
            resolver,
            mode,
        }
    }

    /// Applies the caller gate for grant mutations in `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardFailure::Denied`] when the caller fails the gate and
    /// [`GuardFailure::Lookup`] when resolution fails.
    async fn mutating_client(
        &self,
        caller: &dyn CurrentCaller,
        organization_id: OrganizationId,
    ) -> Result<AccessClient, GuardFailure> {
        ensure(
            caller.has_secrets_manager_access(organization_id),
            DenyReason::NoSecretsManagerAccess,
        )?;
        let client = self
            .collaborators
            .access_clients
            .resolve(caller, organization_id)
            .await?
            .ok_or(GuardFailure::Denied(DenyReason::MissingCallerIdentity))?;
        ensure(client.client_type.may_mutate_policies(), DenyReason::UnsupportedClient)?;
        Ok(client)
    }
}
