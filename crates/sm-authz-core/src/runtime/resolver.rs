// crates/sm-authz-core/src/runtime/resolver.rs
// ============================================================================
// Module: Permission Resolver
// Description: Caller read/write resolution against projects, service accounts, secrets.
// Purpose: Route every access lookup through the caller's access client.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The resolver is a thin delegation layer: it never grants access on its
//! own. Organization admins resolve to
//! [`AccessClientType::NoAccessCheck`](crate::core::AccessClientType) and
//! are still routed to the backing store, which is the authority that grants
//! them full access. Batch lookups return a [`BatchAccess`] that refuses to
//! treat missing ids as writable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::access::AccessBits;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::SecretId;
use crate::core::identifiers::ServiceAccountId;
use crate::interfaces::AccessClient;
use crate::interfaces::Collaborators;
use crate::interfaces::LookupError;
use crate::interfaces::ProjectAccess;
use crate::interfaces::SecretAccess;
use crate::interfaces::ServiceAccountAccess;
use crate::runtime::outcome::DenyReason;

// ============================================================================
// SECTION: Batch Results
// ============================================================================

/// Access bits returned by a batch lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAccess<K> {
    /// Bits keyed by resource id, as returned by the store.
    results: BTreeMap<K, AccessBits>,
}

impl<K: Ord> BatchAccess<K> {
    /// Wraps a store result.
    #[must_use]
    pub const fn new(results: BTreeMap<K, AccessBits>) -> Self {
        Self {
            results,
        }
    }

    /// Checks that every requested id came back writable.
    ///
    /// # Errors
    ///
    /// Returns [`DenyReason::IncompleteAccessResults`] when the result holds
    /// fewer keys than requested or omits a requested id, and
    /// [`DenyReason::InsufficientAccess`] when any returned entry lacks write.
    pub fn require_writable(&self, requested: &BTreeSet<K>) -> Result<(), DenyReason> {
        if self.results.len() < requested.len()
            || requested.iter().any(|id| !self.results.contains_key(id))
        {
            return Err(DenyReason::IncompleteAccessResults);
        }
        if self.results.values().any(|bits| !bits.write) {
            return Err(DenyReason::InsufficientAccess);
        }
        Ok(())
    }

    /// Returns true when every requested id came back writable.
    #[must_use]
    pub fn all_writable(&self, requested: &BTreeSet<K>) -> bool {
        self.require_writable(requested).is_ok()
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves caller access through the lookup collaborators.
#[derive(Clone)]
pub struct PermissionResolver {
    /// Project lookups.
    projects: Arc<dyn ProjectAccess>,
    /// Service account lookups.
    service_accounts: Arc<dyn ServiceAccountAccess>,
    /// Secret lookups.
    secrets: Arc<dyn SecretAccess>,
}

impl PermissionResolver {
    /// Builds a resolver over the collaborator bundle.
    #[must_use]
    pub fn new(collaborators: &Collaborators) -> Self {
        Self {
            projects: Arc::clone(&collaborators.projects),
            service_accounts: Arc::clone(&collaborators.service_accounts),
            secrets: Arc::clone(&collaborators.secrets),
        }
    }

    /// Resolves the caller's bits on one project.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    pub async fn project(
        &self,
        client: AccessClient,
        project_id: ProjectId,
    ) -> Result<AccessBits, LookupError> {
        self.projects.check_one(project_id, client.caller_id, client.client_type).await
    }

    /// Resolves the caller's bits on many projects.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    pub async fn projects(
        &self,
        client: AccessClient,
        project_ids: &BTreeSet<ProjectId>,
    ) -> Result<BatchAccess<ProjectId>, LookupError> {
        let results =
            self.projects.check_many(project_ids, client.caller_id, client.client_type).await?;
        Ok(BatchAccess::new(results))
    }

    /// Resolves the caller's bits on one service account.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    pub async fn service_account(
        &self,
        client: AccessClient,
        service_account_id: ServiceAccountId,
    ) -> Result<AccessBits, LookupError> {
        self.service_accounts
            .check_one(service_account_id, client.caller_id, client.client_type)
            .await
    }

    /// Resolves the caller's bits on many service accounts.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    pub async fn service_accounts(
        &self,
        client: AccessClient,
        service_account_ids: &BTreeSet<ServiceAccountId>,
    ) -> Result<BatchAccess<ServiceAccountId>, LookupError> {
        let results = self
            .service_accounts
            .check_many(service_account_ids, client.caller_id, client.client_type)
            .await?;
        Ok(BatchAccess::new(results))
    }

    /// Resolves the caller's bits on one secret.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup fails.
    pub async fn secret(
        &self,
        client: AccessClient,
        secret_id: SecretId,
    ) -> Result<AccessBits, LookupError> {
        self.secrets.check_one(secret_id, client.caller_id, client.client_type).await
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
