// crates/sm-authz-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Access Store
// Description: Self-contained backend implementing every collaborator lookup.
// Purpose: Back tests and embedders that do not have a persistence layer.
// Dependencies: crate::{core, interfaces}, async-trait
// ============================================================================

//! ## Overview
//! [`InMemoryAccessStore`] keeps entities, per-caller access bits and stored
//! service account -> project grants in `BTreeMap` tables behind a single
//! `RwLock`. Admin lookups ([`AccessClientType::NoAccessCheck`]) return full
//! access for every entity the store knows; every other client type gets the
//! bits configured for its caller id, or none.
//!
//! Batch lookups omit ids the store does not know, exactly as a persistence
//! layer would, so callers must treat a short result as incomplete.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;

use async_trait::async_trait;

use crate::core::access::AccessBits;
use crate::core::access::AccessClientType;
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
use crate::interfaces::GrantStore;
use crate::interfaces::GroupDirectory;
use crate::interfaces::LookupError;
use crate::interfaces::OrgMembership;
use crate::interfaces::OrganizationUserDirectory;
use crate::interfaces::ProjectAccess;
use crate::interfaces::ProjectStore;
use crate::interfaces::SecretAccess;
use crate::interfaces::SecretStore;
use crate::interfaces::ServiceAccountAccess;
use crate::interfaces::ServiceAccountStore;

// ============================================================================
// SECTION: Tables
// ============================================================================

/// Backing tables.
#[derive(Debug, Default)]
struct Tables {
    /// Organization membership rows.
    organization_users: BTreeMap<OrganizationUserId, OrganizationUser>,
    /// Group rows.
    groups: BTreeMap<GroupId, Group>,
    /// Projects.
    projects: BTreeMap<ProjectId, Project>,
    /// Service accounts.
    service_accounts: BTreeMap<ServiceAccountId, ServiceAccount>,
    /// Secrets.
    secrets: BTreeMap<SecretId, Secret>,
    /// Caller bits on projects.
    project_access: BTreeMap<(CallerId, ProjectId), AccessBits>,
    /// Caller bits on service accounts.
    service_account_access: BTreeMap<(CallerId, ServiceAccountId), AccessBits>,
    /// Caller bits on secrets.
    secret_access: BTreeMap<(CallerId, SecretId), AccessBits>,
    /// Stored service account -> project grants.
    granted_projects: BTreeMap<ServiceAccountId, BTreeSet<ProjectId>>,
}

/// Resolves bits for an entity the store knows.
fn resolve_bits<K: Ord + Copy>(
    access: &BTreeMap<(CallerId, K), AccessBits>,
    caller_id: CallerId,
    id: K,
    client_type: AccessClientType,
) -> AccessBits {
    match client_type {
        AccessClientType::NoAccessCheck => AccessBits::FULL,
        AccessClientType::User
        | AccessClientType::ServiceAccount
        | AccessClientType::Organization => {
            access.get(&(caller_id, id)).copied().unwrap_or(AccessBits::NONE)
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// In-memory collaborator backend.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAccessStore {
    /// Tables protected by a read/write lock.
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryAccessStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the tables for reading.
    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, LookupError> {
        self.tables
            .read()
            .map_err(|_| LookupError::Backend("access store lock poisoned".to_string()))
    }

    /// Applies a mutation to the tables.
    fn write(&self, apply: impl FnOnce(&mut Tables)) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut tables);
    }

    /// Adds an organization membership row.
    pub fn add_organization_user(&self, row: OrganizationUser) {
        self.write(|tables| {
            tables.organization_users.insert(row.id, row);
        });
    }

    /// Adds a group row.
    pub fn add_group(&self, row: Group) {
        self.write(|tables| {
            tables.groups.insert(row.id, row);
        });
    }

    /// Adds a project.
    pub fn add_project(&self, project: Project) {
        self.write(|tables| {
            tables.projects.insert(project.id, project);
        });
    }

    /// Adds a service account.
    pub fn add_service_account(&self, service_account: ServiceAccount) {
        self.write(|tables| {
            tables.service_accounts.insert(service_account.id, service_account);
        });
    }

    /// Adds a secret.
    pub fn add_secret(&self, secret: Secret) {
        self.write(|tables| {
            tables.secrets.insert(secret.id, secret);
        });
    }

    /// Sets a caller's bits on a project.
    pub fn set_project_access(&self, caller_id: CallerId, project_id: ProjectId, bits: AccessBits) {
        self.write(|tables| {
            tables.project_access.insert((caller_id, project_id), bits);
        });
    }

    /// Sets a caller's bits on a service account.
    pub fn set_service_account_access(
        &self,
        caller_id: CallerId,
        service_account_id: ServiceAccountId,
        bits: AccessBits,
    ) {
        self.write(|tables| {
            tables.service_account_access.insert((caller_id, service_account_id), bits);
        });
    }

    /// Sets a caller's bits on a secret.
    pub fn set_secret_access(&self, caller_id: CallerId, secret_id: SecretId, bits: AccessBits) {
        self.write(|tables| {
            tables.secret_access.insert((caller_id, secret_id), bits);
        });
    }

    /// Records a stored service account -> project grant.
    pub fn add_granted_project(&self, service_account_id: ServiceAccountId, project_id: ProjectId) {
        self.write(|tables| {
            tables.granted_projects.entry(service_account_id).or_default().insert(project_id);
        });
    }
}

// ============================================================================
// SECTION: Access Lookups
// ============================================================================

#[async_trait]
impl ProjectAccess for InMemoryAccessStore {
    async fn check_one(
        &self,
        project_id: ProjectId,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError> {
        let tables = self.read()?;
        if !tables.projects.contains_key(&project_id) {
            return Ok(AccessBits::NONE);
        }
        Ok(resolve_bits(&tables.project_access, caller_id, project_id, client_type))
    }

    async fn check_many(
        &self,
        project_ids: &BTreeSet<ProjectId>,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<BTreeMap<ProjectId, AccessBits>, LookupError> {
        let tables = self.read()?;
        Ok(project_ids
            .iter()
            .filter(|id| tables.projects.contains_key(id))
            .map(|id| (*id, resolve_bits(&tables.project_access, caller_id, *id, client_type)))
            .collect())
    }

    async fn all_belong_to_org(
        &self,
        project_ids: &BTreeSet<ProjectId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        let tables = self.read()?;
        Ok(project_ids.iter().all(|id| {
            tables.projects.get(id).is_some_and(|project| project.organization_id == organization_id)
        }))
    }
}

#[async_trait]
impl ServiceAccountAccess for InMemoryAccessStore {
    async fn check_one(
        &self,
        service_account_id: ServiceAccountId,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError> {
        let tables = self.read()?;
        if !tables.service_accounts.contains_key(&service_account_id) {
            return Ok(AccessBits::NONE);
        }
        Ok(resolve_bits(
            &tables.service_account_access,
            caller_id,
            service_account_id,
            client_type,
        ))
    }

    async fn check_many(
        &self,
        service_account_ids: &BTreeSet<ServiceAccountId>,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<BTreeMap<ServiceAccountId, AccessBits>, LookupError> {
        let tables = self.read()?;
        Ok(service_account_ids
            .iter()
            .filter(|id| tables.service_accounts.contains_key(id))
            .map(|id| {
                (*id, resolve_bits(&tables.service_account_access, caller_id, *id, client_type))
            })
            .collect())
    }

    async fn all_belong_to_org(
        &self,
        service_account_ids: &BTreeSet<ServiceAccountId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        let tables = self.read()?;
        Ok(service_account_ids.iter().all(|id| {
            tables
                .service_accounts
                .get(id)
                .is_some_and(|service_account| service_account.organization_id == organization_id)
        }))
    }
}

#[async_trait]
impl SecretAccess for InMemoryAccessStore {
    async fn check_one(
        &self,
        secret_id: SecretId,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError> {
        let tables = self.read()?;
        if !tables.secrets.contains_key(&secret_id) {
            return Ok(AccessBits::NONE);
        }
        Ok(resolve_bits(&tables.secret_access, caller_id, secret_id, client_type))
    }
}

// ============================================================================
// SECTION: Membership and Directories
// ============================================================================

#[async_trait]
impl OrgMembership for InMemoryAccessStore {
    async fn users_belong_to_org(
        &self,
        organization_user_ids: &BTreeSet<OrganizationUserId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        let tables = self.read()?;
        Ok(organization_user_ids.iter().all(|id| {
            tables
                .organization_users
                .get(id)
                .is_some_and(|row| row.organization_id == organization_id)
        }))
    }

    async fn groups_belong_to_org(
        &self,
        group_ids: &BTreeSet<GroupId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        let tables = self.read()?;
        Ok(group_ids
            .iter()
            .all(|id| tables.groups.get(id).is_some_and(|row| row.organization_id == organization_id)))
    }
}

#[async_trait]
impl OrganizationUserDirectory for InMemoryAccessStore {
    async fn get_by_id(
        &self,
        organization_user_id: OrganizationUserId,
    ) -> Result<Option<OrganizationUser>, LookupError> {
        Ok(self.read()?.organization_users.get(&organization_user_id).copied())
    }

    async fn get_many(
        &self,
        organization_user_ids: &BTreeSet<OrganizationUserId>,
    ) -> Result<Vec<OrganizationUser>, LookupError> {
        let tables = self.read()?;
        Ok(organization_user_ids
            .iter()
            .filter_map(|id| tables.organization_users.get(id).copied())
            .collect())
    }
}

#[async_trait]
impl GroupDirectory for InMemoryAccessStore {
    async fn get_by_id(&self, group_id: GroupId) -> Result<Option<Group>, LookupError> {
        Ok(self.read()?.groups.get(&group_id).copied())
    }

    async fn get_many(&self, group_ids: &BTreeSet<GroupId>) -> Result<Vec<Group>, LookupError> {
        let tables = self.read()?;
        Ok(group_ids.iter().filter_map(|id| tables.groups.get(id).copied()).collect())
    }
}

// ============================================================================
// SECTION: Entity Stores
// ============================================================================

#[async_trait]
impl ProjectStore for InMemoryAccessStore {
    async fn get_by_id(&self, project_id: ProjectId) -> Result<Option<Project>, LookupError> {
        Ok(self.read()?.projects.get(&project_id).copied())
    }
}

#[async_trait]
impl ServiceAccountStore for InMemoryAccessStore {
    async fn get_by_id(
        &self,
        service_account_id: ServiceAccountId,
    ) -> Result<Option<ServiceAccount>, LookupError> {
        Ok(self.read()?.service_accounts.get(&service_account_id).copied())
    }
}

#[async_trait]
impl SecretStore for InMemoryAccessStore {
    async fn get_by_id(&self, secret_id: SecretId) -> Result<Option<Secret>, LookupError> {
        Ok(self.read()?.secrets.get(&secret_id).copied())
    }
}

#[async_trait]
impl GrantStore for InMemoryAccessStore {
    async fn current_granted_projects(
        &self,
        service_account_id: ServiceAccountId,
    ) -> Result<BTreeSet<ProjectId>, LookupError> {
        Ok(self.read()?.granted_projects.get(&service_account_id).cloned().unwrap_or_default())
    }
}
