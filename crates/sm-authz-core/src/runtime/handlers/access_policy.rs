// crates/sm-authz-core/src/runtime/handlers/access_policy.rs
// ============================================================================
// Module: Single Access Policy Handler
// Description: Create, update, and delete authorization for one grant edge.
// Purpose: Gate single-edge mutations on organization, caller class, and write.
// Dependencies: crate::{core, interfaces, runtime}, async-trait
// ============================================================================

//! ## Overview
//! The organization is taken from the granted resource. Edges that join two
//! entities (service account -> project, service account -> secret) require
//! both entities to exist in one organization and require write on both.
//! Creating an edge for a user or group grantee also requires the grantee to
//! belong to that organization; updates and deletes skip that check because
//! the edge already exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;

use super::AuthorizationHandler;
use super::HandlerContext;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::OrganizationUserId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::SecretId;
use crate::core::identifiers::ServiceAccountId;
use crate::core::operations::AccessPolicyOperation;
use crate::core::policies::AccessPolicy;
use crate::core::policies::Project;
use crate::core::policies::Secret;
use crate::core::policies::ServiceAccount;
use crate::interfaces::AccessClient;
use crate::interfaces::CurrentCaller;
use crate::interfaces::LookupError;
use crate::runtime::guards::Guard;
use crate::runtime::guards::GuardFailure;
use crate::runtime::guards::all2;
use crate::runtime::guards::conclude;
use crate::runtime::guards::ensure;
use crate::runtime::guards::pair;
use crate::runtime::outcome::DenyReason;
use crate::runtime::outcome::Outcome;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Authorizes mutations of a single access policy.
#[derive(Clone)]
pub struct AccessPolicyHandler {
    /// Shared handler state.
    ctx: HandlerContext,
}

impl AccessPolicyHandler {
    /// Builds the handler.
    #[must_use]
    pub const fn new(ctx: HandlerContext) -> Self {
        Self {
            ctx,
        }
    }

    /// Runs every guard for the edge.
    async fn evaluate(
        &self,
        caller: &dyn CurrentCaller,
        operation: AccessPolicyOperation,
        policy: &AccessPolicy,
    ) -> Guard {
        let creating = operation == AccessPolicyOperation::Create;
        match policy {
            AccessPolicy::UserProject(edge) => {
                let project = self.load_project(edge.granted_project_id, edge.granted_project).await?;
                let client = self.ctx.mutating_client(caller, project.organization_id).await?;
                all2(
                    self.ctx.mode,
                    self.user_grantee(creating, edge.organization_user_id, project.organization_id),
                    self.project_write(client, project.id),
                )
                .await
            }
            AccessPolicy::GroupProject(edge) => {
                let project = self.load_project(edge.granted_project_id, edge.granted_project).await?;
                let client = self.ctx.mutating_client(caller, project.organization_id).await?;
                all2(
                    self.ctx.mode,
                    self.group_grantee(creating, edge.group_id, project.organization_id),
                    self.project_write(client, project.id),
                )
                .await
            }
            AccessPolicy::ServiceAccountProject(edge) => {
                let (project, service_account) = pair(
                    self.ctx.mode,
                    self.load_project(edge.granted_project_id, edge.granted_project),
                    self.load_service_account(edge.service_account_id, edge.service_account),
                )
                .await?;
                ensure(
                    project.organization_id == service_account.organization_id,
                    DenyReason::OrganizationMismatch,
                )?;
                let client = self.ctx.mutating_client(caller, project.organization_id).await?;
                all2(
                    self.ctx.mode,
                    self.project_write(client, project.id),
                    self.service_account_write(client, service_account.id),
                )
                .await
            }
            AccessPolicy::UserServiceAccount(edge) => {
                let service_account = self
                    .load_service_account(
                        edge.granted_service_account_id,
                        edge.granted_service_account,
                    )
                    .await?;
                let organization_id = service_account.organization_id;
                let client = self.ctx.mutating_client(caller, organization_id).await?;
                all2(
                    self.ctx.mode,
                    self.user_grantee(creating, edge.organization_user_id, organization_id),
                    self.service_account_write(client, service_account.id),
                )
                .await
            }
            AccessPolicy::GroupServiceAccount(edge) => {
                let service_account = self
                    .load_service_account(
                        edge.granted_service_account_id,
                        edge.granted_service_account,
                    )
                    .await?;
                let organization_id = service_account.organization_id;
                let client = self.ctx.mutating_client(caller, organization_id).await?;
                all2(
                    self.ctx.mode,
                    self.group_grantee(creating, edge.group_id, organization_id),
                    self.service_account_write(client, service_account.id),
                )
                .await
            }
            AccessPolicy::ServiceAccountSecret(edge) => {
                let (secret, service_account) = pair(
                    self.ctx.mode,
                    self.load_secret(edge.granted_secret_id, edge.granted_secret),
                    self.load_service_account(edge.service_account_id, edge.service_account),
                )
                .await?;
                ensure(
                    secret.organization_id == service_account.organization_id,
                    DenyReason::OrganizationMismatch,
                )?;
                let client = self.ctx.mutating_client(caller, secret.organization_id).await?;
                all2(
                    self.ctx.mode,
                    self.secret_write(client, secret.id),
                    self.service_account_write(client, service_account.id),
                )
                .await
            }
        }
    }

    // ------------------------------------------------------------------------
    // Snapshot loading
    // ------------------------------------------------------------------------

    /// Uses the pre-loaded project when it matches, otherwise loads it.
    async fn load_project(
        &self,
        project_id: ProjectId,
        snapshot: Option<Project>,
    ) -> Result<Project, GuardFailure> {
        if let Some(project) = snapshot.filter(|project| project.id == project_id) {
            return Ok(project);
        }
        self.ctx
            .collaborators
            .project_store
            .get_by_id(project_id)
            .await?
            .ok_or(GuardFailure::Denied(DenyReason::ResourceNotFound))
    }

    /// Uses the pre-loaded service account when it matches, otherwise loads it.
    async fn load_service_account(
        &self,
        service_account_id: ServiceAccountId,
        snapshot: Option<ServiceAccount>,
    ) -> Result<ServiceAccount, GuardFailure> {
        if let Some(service_account) = snapshot.filter(|sa| sa.id == service_account_id) {
            return Ok(service_account);
        }
        self.ctx
            .collaborators
            .service_account_store
            .get_by_id(service_account_id)
            .await?
            .ok_or(GuardFailure::Denied(DenyReason::ResourceNotFound))
    }

    /// Uses the pre-loaded secret when it matches, otherwise loads it.
    async fn load_secret(
        &self,
        secret_id: SecretId,
        snapshot: Option<Secret>,
    ) -> Result<Secret, GuardFailure> {
        if let Some(secret) = snapshot.filter(|secret| secret.id == secret_id) {
            return Ok(secret);
        }
        self.ctx
            .collaborators
            .secret_store
            .get_by_id(secret_id)
            .await?
            .ok_or(GuardFailure::Denied(DenyReason::ResourceNotFound))
    }

    // ------------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------------

    /// Requires a user grantee to belong to the organization on create.
    async fn user_grantee(
        &self,
        creating: bool,
        organization_user_id: OrganizationUserId,
        organization_id: OrganizationId,
    ) -> Guard {
        if !creating {
            return Ok(());
        }
        let row = self.ctx.collaborators.organization_users.get_by_id(organization_user_id).await?;
        ensure(
            row.is_some_and(|row| row.organization_id == organization_id),
            DenyReason::GranteeOutsideOrganization,
        )
    }

    /// Requires a group grantee to belong to the organization on create.
    async fn group_grantee(
        &self,
        creating: bool,
        group_id: GroupId,
        organization_id: OrganizationId,
    ) -> Guard {
        if !creating {
            return Ok(());
        }
        let row = self.ctx.collaborators.groups.get_by_id(group_id).await?;
        ensure(
            row.is_some_and(|row| row.organization_id == organization_id),
            DenyReason::GranteeOutsideOrganization,
        )
    }

    /// Requires write on the project.
    async fn project_write(&self, client: AccessClient, project_id: ProjectId) -> Guard {
        let bits = self.ctx.resolver.project(client, project_id).await?;
        ensure(bits.write, DenyReason::InsufficientAccess)
    }

    /// Requires write on the service account.
    async fn service_account_write(
        &self,
        client: AccessClient,
        service_account_id: ServiceAccountId,
    ) -> Guard {
        let bits = self.ctx.resolver.service_account(client, service_account_id).await?;
        ensure(bits.write, DenyReason::InsufficientAccess)
    }

    /// Requires write on the secret.
    async fn secret_write(&self, client: AccessClient, secret_id: SecretId) -> Guard {
        let bits = self.ctx.resolver.secret(client, secret_id).await?;
        ensure(bits.write, DenyReason::InsufficientAccess)
    }
}

#[async_trait]
impl AuthorizationHandler for AccessPolicyHandler {
    type Operation = AccessPolicyOperation;
    type Target = AccessPolicy;

    async fn handle(
        &self,
        caller: &dyn CurrentCaller,
        operation: AccessPolicyOperation,
        target: &AccessPolicy,
    ) -> Result<Outcome, LookupError> {
        conclude(self.evaluate(caller, operation, target).await)
    }
}
