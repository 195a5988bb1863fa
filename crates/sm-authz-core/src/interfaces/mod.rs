// crates/sm-authz-core/src/interfaces/mod.rs
// ============================================================================
// Module: Secrets Manager Authz Interfaces
// Description: Collaborator contracts for caller context, access, and directories.
// Purpose: Define the read-only lookup seams the authorization engine consumes.
// Dependencies: crate::core, async-trait, thiserror
// ============================================================================

//! ## Overview
//! The engine never owns data. Every fact it needs (who the caller is, what
//! bits the caller holds on a resource, which organization an entity belongs
//! to) comes from a collaborator defined here. Implementations must fail
//! closed: a lookup that cannot answer returns [`LookupError`], and the
//! engine propagates it unchanged instead of guessing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::access::AccessBits;
use crate::core::access::AccessClientType;
use crate::core::access::ClientClass;
use crate::core::identifiers::CallerId;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::OrganizationUserId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::SecretId;
use crate::core::identifiers::ServiceAccountId;
use crate::core::policies::Group;
use crate::core::policies::OrganizationUser;
use crate::core::policies::Project;
use crate::core::policies::Secret;
use crate::core::policies::ServiceAccount;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Lookup failures raised by collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Backing store could not be reached.
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
    /// Backing store answered with an error.
    #[error("lookup backend error: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Caller Context
// ============================================================================

/// Authenticated caller for the current request.
#[async_trait]
pub trait CurrentCaller: Send + Sync {
    /// Returns true when the caller may use secrets manager in the organization.
    fn has_secrets_manager_access(&self, organization_id: OrganizationId) -> bool;

    /// Returns the raw caller class.
    fn client_class(&self) -> ClientClass;

    /// Returns the principal id used in access lookups, when resolvable.
    fn caller_id(&self) -> Option<CallerId>;

    /// Returns true when the caller administers the organization.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when membership cannot be determined.
    async fn is_organization_admin(&self, organization_id: OrganizationId)
    -> Result<bool, LookupError>;
}

/// Resolved access client for one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessClient {
    /// Lookup branch.
    pub client_type: AccessClientType,
    /// Principal id used in access lookups.
    pub caller_id: CallerId,
}

/// Maps a caller to its access client within an organization.
#[async_trait]
pub trait AccessClientResolver: Send + Sync {
    /// Resolves the caller's access client.
    ///
    /// Returns `Ok(None)` when the caller has no resolvable identity.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the admin lookup fails.
    async fn resolve(
        &self,
        caller: &dyn CurrentCaller,
        organization_id: OrganizationId,
    ) -> Result<Option<AccessClient>, LookupError>;
}

/// Resolver that derives the access client from the caller itself.
///
/// # Invariants
/// - Only user callers are asked about admin status; machine callers keep
///   their own class.
pub struct CurrentCallerAccessClientResolver;

#[async_trait]
impl AccessClientResolver for CurrentCallerAccessClientResolver {
    async fn resolve(
        &self,
        caller: &dyn CurrentCaller,
        organization_id: OrganizationId,
    ) -> Result<Option<AccessClient>, LookupError> {
        let Some(caller_id) = caller.caller_id() else {
            return Ok(None);
        };
        let class = caller.client_class();
        let organization_admin = match class {
            ClientClass::User => caller.is_organization_admin(organization_id).await?,
            ClientClass::ServiceAccount | ClientClass::Organization => false,
        };
        Ok(Some(AccessClient {
            client_type: AccessClientType::from_client_class(class, organization_admin),
            caller_id,
        }))
    }
}

// ============================================================================
// SECTION: Access Lookups
// ============================================================================

/// Caller access to projects.
#[async_trait]
pub trait ProjectAccess: Send + Sync {
    /// Returns the caller's bits on one project.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn check_one(
        &self,
        project_id: ProjectId,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError>;

    /// Returns the caller's bits on many projects.
    ///
    /// The map may omit ids the store does not know.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn check_many(
        &self,
        project_ids: &BTreeSet<ProjectId>,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<BTreeMap<ProjectId, AccessBits>, LookupError>;

    /// Returns true when every project belongs to the organization.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn all_belong_to_org(
        &self,
        project_ids: &BTreeSet<ProjectId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError>;
}

/// Caller access to service accounts.
#[async_trait]
pub trait ServiceAccountAccess: Send + Sync {
    /// Returns the caller's bits on one service account.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn check_one(
        &self,
        service_account_id: ServiceAccountId,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError>;

    /// Returns the caller's bits on many service accounts.
    ///
    /// The map may omit ids the store does not know.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn check_many(
        &self,
        service_account_ids: &BTreeSet<ServiceAccountId>,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<BTreeMap<ServiceAccountId, AccessBits>, LookupError>;

    /// Returns true when every service account belongs to the organization.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn all_belong_to_org(
        &self,
        service_account_ids: &BTreeSet<ServiceAccountId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError>;
}

/// Caller access to secrets.
#[async_trait]
pub trait SecretAccess: Send + Sync {
    /// Returns the caller's bits on one secret.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn check_one(
        &self,
        secret_id: SecretId,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError>;
}

// ============================================================================
// SECTION: Membership and Directories
// ============================================================================

/// Same-organization predicates for grantees.
#[async_trait]
pub trait OrgMembership: Send + Sync {
    /// Returns true when every organization user belongs to the organization.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn users_belong_to_org(
        &self,
        organization_user_ids: &BTreeSet<OrganizationUserId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError>;

    /// Returns true when every group belongs to the organization.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn groups_belong_to_org(
        &self,
        group_ids: &BTreeSet<GroupId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError>;
}

/// Organization user rows.
#[async_trait]
pub trait OrganizationUserDirectory: Send + Sync {
    /// Loads one membership row.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn get_by_id(
        &self,
        organization_user_id: OrganizationUserId,
    ) -> Result<Option<OrganizationUser>, LookupError>;

    /// Loads the membership rows that exist among the ids.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn get_many(
        &self,
        organization_user_ids: &BTreeSet<OrganizationUserId>,
    ) -> Result<Vec<OrganizationUser>, LookupError>;
}

/// Group rows.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Loads one group row.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn get_by_id(&self, group_id: GroupId) -> Result<Option<Group>, LookupError>;

    /// Loads the group rows that exist among the ids.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn get_many(&self, group_ids: &BTreeSet<GroupId>) -> Result<Vec<Group>, LookupError>;
}

// ============================================================================
// SECTION: Entity Stores
// ============================================================================

/// Project snapshots.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Loads one project.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn get_by_id(&self, project_id: ProjectId) -> Result<Option<Project>, LookupError>;
}

/// Service account snapshots.
#[async_trait]
pub trait ServiceAccountStore: Send + Sync {
    /// Loads one service account.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn get_by_id(
        &self,
        service_account_id: ServiceAccountId,
    ) -> Result<Option<ServiceAccount>, LookupError>;
}

/// Secret snapshots.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Loads one secret.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn get_by_id(&self, secret_id: SecretId) -> Result<Option<Secret>, LookupError>;
}

/// Stored service account -> project grants.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Returns the projects currently granted to the service account.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    async fn current_granted_projects(
        &self,
        service_account_id: ServiceAccountId,
    ) -> Result<BTreeSet<ProjectId>, LookupError>;
}

// ============================================================================
// SECTION: Collaborator Bundle
// ============================================================================

/// Every collaborator the handlers draw on.
#[derive(Clone)]
pub struct Collaborators {
    /// Access client resolution.
    pub access_clients: Arc<dyn AccessClientResolver>,
    /// Project access lookups.
    pub projects: Arc<dyn ProjectAccess>,
    /// Service account access lookups.
    pub service_accounts: Arc<dyn ServiceAccountAccess>,
    /// Secret access lookups.
    pub secrets: Arc<dyn SecretAccess>,
    /// Same-organization predicates.
    pub membership: Arc<dyn OrgMembership>,
    /// Organization user rows.
    pub organization_users: Arc<dyn OrganizationUserDirectory>,
    /// Group rows.
    pub groups: Arc<dyn GroupDirectory>,
    /// Project snapshots.
    pub project_store: Arc<dyn ProjectStore>,
    /// Service account snapshots.
    pub service_account_store: Arc<dyn ServiceAccountStore>,
    /// Secret snapshots.
    pub secret_store: Arc<dyn SecretStore>,
    /// Stored grants.
    pub grants: Arc<dyn GrantStore>,
}

impl Collaborators {
    /// Uses one backend for every lookup and the default access client resolver.
    #[must_use]
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProjectAccess
            + ServiceAccountAccess
            + SecretAccess
            + OrgMembership
            + OrganizationUserDirectory
            + GroupDirectory
            + ProjectStore
            + ServiceAccountStore
            + SecretStore
            + GrantStore
            + 'static,
    {
        Self {
            access_clients: Arc::new(CurrentCallerAccessClientResolver),
            projects: backend.clone(),
            service_accounts: backend.clone(),
            secrets: backend.clone(),
            membership: backend.clone(),
            organization_users: backend.clone(),
            groups: backend.clone(),
            project_store: backend.clone(),
            service_account_store: backend.clone(),
            secret_store: backend.clone(),
            grants: backend,
        }
    }

    /// Replaces the project access collaborator.
    #[must_use]
    pub fn with_projects(mut self, projects: Arc<dyn ProjectAccess>) -> Self {
        self.projects = projects;
        self
    }

    /// Replaces the service account access collaborator.
    #[must_use]
    pub fn with_service_accounts(mut self, service_accounts: Arc<dyn ServiceAccountAccess>) -> Self {
        self.service_accounts = service_accounts;
        self
    }

    /// Replaces the access client resolver.
    #[must_use]
    pub fn with_access_clients(mut self, access_clients: Arc<dyn AccessClientResolver>) -> Self {
        self.access_clients = access_clients;
        self
    }
}
