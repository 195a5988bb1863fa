// crates/sm-authz-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared callers, seeded stores, and instrumented collaborators.
// Purpose: Provide reusable infrastructure for authorization engine tests.
// Dependencies: sm-authz-core, async-trait, tokio
// ============================================================================

//! ## Overview
//! The [`Fixture`] seeds an [`InMemoryAccessStore`] with one organization,
//! a project, a service account, a secret and two grantees, plus entities in
//! a foreign organization. Instrumented collaborators record or script the
//! answers of batch access lookups so tests can assert lookup scope and
//! fail-closed handling of partial results.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only helpers use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use sm_authz_core::AccessBits;
use sm_authz_core::AccessClientType;
use sm_authz_core::AccessPolicyAuthorizer;
use sm_authz_core::AuthorizationDecision;
use sm_authz_core::AuthorizationRequest;
use sm_authz_core::AuthorizationTarget;
use sm_authz_core::AuthzAuditEvent;
use sm_authz_core::AuthzAuditSink;
use sm_authz_core::CallerId;
use sm_authz_core::ClientClass;
use sm_authz_core::Collaborators;
use sm_authz_core::CurrentCaller;
use sm_authz_core::EngineSettings;
use sm_authz_core::Group;
use sm_authz_core::GroupId;
use sm_authz_core::InMemoryAccessStore;
use sm_authz_core::LookupError;
use sm_authz_core::OperationToken;
use sm_authz_core::OrganizationId;
use sm_authz_core::OrganizationUser;
use sm_authz_core::OrganizationUserId;
use sm_authz_core::Project;
use sm_authz_core::ProjectAccess;
use sm_authz_core::ProjectId;
use sm_authz_core::Secret;
use sm_authz_core::SecretId;
use sm_authz_core::ServiceAccount;
use sm_authz_core::ServiceAccountAccess;
use sm_authz_core::ServiceAccountId;

// ============================================================================
// SECTION: Callers
// ============================================================================

/// Configurable caller.
#[derive(Debug, Clone, Copy)]
pub struct TestCaller {
    /// Raw caller class.
    pub client_class: ClientClass,
    /// Caller id; `None` models an unresolvable identity.
    pub caller_id: Option<CallerId>,
    /// Secrets manager access in every organization.
    pub secrets_manager_access: bool,
    /// Admin status in every organization.
    pub organization_admin: bool,
}

impl TestCaller {
    /// Ordinary user with secrets manager access.
    pub const fn user(caller_id: CallerId) -> Self {
        Self {
            client_class: ClientClass::User,
            caller_id: Some(caller_id),
            secrets_manager_access: true,
            organization_admin: false,
        }
    }

    /// Organization admin user.
    pub const fn admin(caller_id: CallerId) -> Self {
        Self {
            organization_admin: true,
            ..Self::user(caller_id)
        }
    }

    /// Caller of the given class.
    pub const fn with_class(caller_id: CallerId, client_class: ClientClass) -> Self {
        Self {
            client_class,
            ..Self::user(caller_id)
        }
    }

    /// Same caller without secrets manager access.
    pub const fn without_secrets_manager(self) -> Self {
        Self {
            secrets_manager_access: false,
            ..self
        }
    }

    /// Same caller without a resolvable identity.
    pub const fn anonymous(self) -> Self {
        Self {
            caller_id: None,
            ..self
        }
    }
}

#[async_trait]
impl CurrentCaller for TestCaller {
    fn has_secrets_manager_access(&self, _organization_id: OrganizationId) -> bool {
        self.secrets_manager_access
    }

    fn client_class(&self) -> ClientClass {
        self.client_class
    }

    fn caller_id(&self) -> Option<CallerId> {
        self.caller_id
    }

    async fn is_organization_admin(
        &self,
        _organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        Ok(self.organization_admin)
    }
}

/// Every caller class.
pub fn all_client_classes() -> [ClientClass; 3] {
    [ClientClass::User, ClientClass::ServiceAccount, ClientClass::Organization]
}

/// Every read/write combination.
pub fn all_bits() -> [AccessBits; 4] {
    [
        AccessBits::new(false, false),
        AccessBits::new(false, true),
        AccessBits::new(true, false),
        AccessBits::new(true, true),
    ]
}

// ============================================================================
// SECTION: Seeded Store
// ============================================================================

/// Seeded store with one home organization and one foreign organization.
pub struct Fixture {
    /// Backing store.
    pub store: Arc<InMemoryAccessStore>,
    /// Home organization.
    pub organization_id: OrganizationId,
    /// Foreign organization.
    pub foreign_organization_id: OrganizationId,
    /// Acting caller id.
    pub caller_id: CallerId,
    /// Home project.
    pub project: Project,
    /// Home service account.
    pub service_account: ServiceAccount,
    /// Home secret.
    pub secret: Secret,
    /// Home organization user grantee.
    pub organization_user: OrganizationUser,
    /// Home group grantee.
    pub group: Group,
    /// Foreign organization user.
    pub foreign_user: OrganizationUser,
    /// Foreign group.
    pub foreign_group: Group,
    /// Foreign project.
    pub foreign_project: Project,
    /// Foreign service account.
    pub foreign_service_account: ServiceAccount,
}

impl Fixture {
    /// Seeds the store.
    pub fn seeded() -> Self {
        let store = Arc::new(InMemoryAccessStore::new());
        let organization_id = OrganizationId::new();
        let foreign_organization_id = OrganizationId::new();
        let fixture = Self {
            store,
            organization_id,
            foreign_organization_id,
            caller_id: CallerId::new(),
            project: Project {
                id: ProjectId::new(),
                organization_id,
            },
            service_account: ServiceAccount {
                id: ServiceAccountId::new(),
                organization_id,
            },
            secret: Secret {
                id: SecretId::new(),
                organization_id,
            },
            organization_user: OrganizationUser {
                id: OrganizationUserId::new(),
                organization_id,
            },
            group: Group {
                id: GroupId::new(),
                organization_id,
            },
            foreign_user: OrganizationUser {
                id: OrganizationUserId::new(),
                organization_id: foreign_organization_id,
            },
            foreign_group: Group {
                id: GroupId::new(),
                organization_id: foreign_organization_id,
            },
            foreign_project: Project {
                id: ProjectId::new(),
                organization_id: foreign_organization_id,
            },
            foreign_service_account: ServiceAccount {
                id: ServiceAccountId::new(),
                organization_id: foreign_organization_id,
            },
        };
        fixture.store.add_project(fixture.project);
        fixture.store.add_service_account(fixture.service_account);
        fixture.store.add_secret(fixture.secret);
        fixture.store.add_organization_user(fixture.organization_user);
        fixture.store.add_group(fixture.group);
        fixture.store.add_organization_user(fixture.foreign_user);
        fixture.store.add_group(fixture.foreign_group);
        fixture.store.add_project(fixture.foreign_project);
        fixture.store.add_service_account(fixture.foreign_service_account);
        fixture
    }

    /// Ordinary user caller.
    pub const fn user(&self) -> TestCaller {
        TestCaller::user(self.caller_id)
    }

    /// Admin caller.
    pub const fn admin(&self) -> TestCaller {
        TestCaller::admin(self.caller_id)
    }

    /// Adds a project in the home organization.
    pub fn add_project(&self) -> Project {
        let project = Project {
            id: ProjectId::new(),
            organization_id: self.organization_id,
        };
        self.store.add_project(project);
        project
    }

    /// Adds a service account in the home organization.
    pub fn add_service_account(&self) -> ServiceAccount {
        let service_account = ServiceAccount {
            id: ServiceAccountId::new(),
            organization_id: self.organization_id,
        };
        self.store.add_service_account(service_account);
        service_account
    }

    /// Grants the caller bits on the home project.
    pub fn project_access(&self, bits: AccessBits) {
        self.store.set_project_access(self.caller_id, self.project.id, bits);
    }

    /// Grants the caller bits on the home service account.
    pub fn service_account_access(&self, bits: AccessBits) {
        self.store.set_service_account_access(self.caller_id, self.service_account.id, bits);
    }

    /// Grants the caller bits on the home secret.
    pub fn secret_access(&self, bits: AccessBits) {
        self.store.set_secret_access(self.caller_id, self.secret.id, bits);
    }

    /// Collaborators backed by the store.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::from_backend(Arc::clone(&self.store))
    }

    /// Authorizer with default settings.
    pub fn authorizer(&self) -> AccessPolicyAuthorizer {
        AccessPolicyAuthorizer::new(self.collaborators(), EngineSettings::default())
    }

    /// Authorizer with default settings and a recording audit sink.
    pub fn audited_authorizer(&self) -> (AccessPolicyAuthorizer, Arc<RecordingAuditSink>) {
        audited(self.collaborators(), EngineSettings::default())
    }
}

/// Builds an authorizer that records its audit events.
pub fn audited(
    collaborators: Collaborators,
    settings: EngineSettings,
) -> (AccessPolicyAuthorizer, Arc<RecordingAuditSink>) {
    let sink = Arc::new(RecordingAuditSink::default());
    let authorizer = AccessPolicyAuthorizer::new(collaborators, settings)
        .with_audit_sink(Arc::clone(&sink) as Arc<dyn AuthzAuditSink>);
    (authorizer, sink)
}

/// Runs one request and unwraps the decision.
pub async fn decide(
    authorizer: &AccessPolicyAuthorizer,
    caller: &TestCaller,
    operation: impl Into<OperationToken>,
    target: AuthorizationTarget,
) -> AuthorizationDecision {
    authorizer
        .authorize(caller, &AuthorizationRequest::new(operation, target))
        .await
        .expect("authorization should not error")
}

/// Runs a future to completion on a fresh current-thread runtime.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(future)
}

// ============================================================================
// SECTION: Instrumented Collaborators
// ============================================================================

/// Delegating access collaborator that records batch lookup arguments.
pub struct RecordingAccess {
    /// Store answering the lookups.
    inner: Arc<InMemoryAccessStore>,
    /// Project id sets passed to `check_many`.
    project_batches: Mutex<Vec<BTreeSet<ProjectId>>>,
    /// Service account id sets passed to `check_many`.
    service_account_batches: Mutex<Vec<BTreeSet<ServiceAccountId>>>,
}

impl RecordingAccess {
    /// Wraps a store.
    pub fn new(inner: Arc<InMemoryAccessStore>) -> Self {
        Self {
            inner,
            project_batches: Mutex::new(Vec::new()),
            service_account_batches: Mutex::new(Vec::new()),
        }
    }

    /// Recorded project batches.
    pub fn project_batches(&self) -> Vec<BTreeSet<ProjectId>> {
        self.project_batches.lock().unwrap().clone()
    }

    /// Recorded service account batches.
    pub fn service_account_batches(&self) -> Vec<BTreeSet<ServiceAccountId>> {
        self.service_account_batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectAccess for RecordingAccess {
    async fn check_one(
        &self,
        project_id: ProjectId,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError> {
        ProjectAccess::check_one(self.inner.as_ref(), project_id, caller_id, client_type).await
    }

    async fn check_many(
        &self,
        project_ids: &BTreeSet<ProjectId>,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<BTreeMap<ProjectId, AccessBits>, LookupError> {
        self.project_batches.lock().unwrap().push(project_ids.clone());
        ProjectAccess::check_many(self.inner.as_ref(), project_ids, caller_id, client_type).await
    }

    async fn all_belong_to_org(
        &self,
        project_ids: &BTreeSet<ProjectId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        ProjectAccess::all_belong_to_org(self.inner.as_ref(), project_ids, organization_id).await
    }
}

#[async_trait]
impl ServiceAccountAccess for RecordingAccess {
    async fn check_one(
        &self,
        service_account_id: ServiceAccountId,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError> {
        ServiceAccountAccess::check_one(
            self.inner.as_ref(),
            service_account_id,
            caller_id,
            client_type,
        )
        .await
    }

    async fn check_many(
        &self,
        service_account_ids: &BTreeSet<ServiceAccountId>,
        caller_id: CallerId,
        client_type: AccessClientType,
    ) -> Result<BTreeMap<ServiceAccountId, AccessBits>, LookupError> {
        self.service_account_batches.lock().unwrap().push(service_account_ids.clone());
        ServiceAccountAccess::check_many(
            self.inner.as_ref(),
            service_account_ids,
            caller_id,
            client_type,
        )
        .await
    }

    async fn all_belong_to_org(
        &self,
        service_account_ids: &BTreeSet<ServiceAccountId>,
        organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        ServiceAccountAccess::all_belong_to_org(
            self.inner.as_ref(),
            service_account_ids,
            organization_id,
        )
        .await
    }
}

/// Service account collaborator answering batch lookups from a fixed map.
pub struct ScriptedServiceAccountAccess {
    /// Fixed batch answer.
    pub batch: BTreeMap<ServiceAccountId, AccessBits>,
    /// Number of batch lookups observed.
    pub batch_calls: Mutex<usize>,
}

impl ScriptedServiceAccountAccess {
    /// Builds the collaborator.
    pub fn new(batch: BTreeMap<ServiceAccountId, AccessBits>) -> Self {
        Self {
            batch,
            batch_calls: Mutex::new(0),
        }
    }

    /// Number of batch lookups observed.
    pub fn batch_calls(&self) -> usize {
        *self.batch_calls.lock().unwrap()
    }
}

#[async_trait]
impl ServiceAccountAccess for ScriptedServiceAccountAccess {
    async fn check_one(
        &self,
        service_account_id: ServiceAccountId,
        _caller_id: CallerId,
        _client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError> {
        Ok(self.batch.get(&service_account_id).copied().unwrap_or(AccessBits::NONE))
    }

    async fn check_many(
        &self,
        _service_account_ids: &BTreeSet<ServiceAccountId>,
        _caller_id: CallerId,
        _client_type: AccessClientType,
    ) -> Result<BTreeMap<ServiceAccountId, AccessBits>, LookupError> {
        *self.batch_calls.lock().unwrap() += 1;
        Ok(self.batch.clone())
    }

    async fn all_belong_to_org(
        &self,
        _service_account_ids: &BTreeSet<ServiceAccountId>,
        _organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        Ok(true)
    }
}

/// Project collaborator that always fails.
pub struct FailingProjectAccess;

#[async_trait]
impl ProjectAccess for FailingProjectAccess {
    async fn check_one(
        &self,
        _project_id: ProjectId,
        _caller_id: CallerId,
        _client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError> {
        Err(LookupError::Unavailable("project store offline".to_string()))
    }

    async fn check_many(
        &self,
        _project_ids: &BTreeSet<ProjectId>,
        _caller_id: CallerId,
        _client_type: AccessClientType,
    ) -> Result<BTreeMap<ProjectId, AccessBits>, LookupError> {
        Err(LookupError::Unavailable("project store offline".to_string()))
    }

    async fn all_belong_to_org(
        &self,
        _project_ids: &BTreeSet<ProjectId>,
        _organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        Err(LookupError::Unavailable("project store offline".to_string()))
    }
}

/// Project collaborator whose lookups never complete.
pub struct StalledProjectAccess;

#[async_trait]
impl ProjectAccess for StalledProjectAccess {
    async fn check_one(
        &self,
        _project_id: ProjectId,
        _caller_id: CallerId,
        _client_type: AccessClientType,
    ) -> Result<AccessBits, LookupError> {
        std::future::pending().await
    }

    async fn check_many(
        &self,
        _project_ids: &BTreeSet<ProjectId>,
        _caller_id: CallerId,
        _client_type: AccessClientType,
    ) -> Result<BTreeMap<ProjectId, AccessBits>, LookupError> {
        std::future::pending().await
    }

    async fn all_belong_to_org(
        &self,
        _project_ids: &BTreeSet<ProjectId>,
        _organization_id: OrganizationId,
    ) -> Result<bool, LookupError> {
        std::future::pending().await
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink collecting events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    events: Mutex<Vec<AuthzAuditEvent>>,
}

impl RecordingAuditSink {
    /// Recorded events.
    pub fn events(&self) -> Vec<AuthzAuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Deny reason of the most recent event.
    pub fn last_deny_reason(&self) -> Option<&'static str> {
        self.events.lock().unwrap().last().and_then(|event| event.deny_reason)
    }
}

impl AuthzAuditSink for RecordingAuditSink {
    fn record(&self, event: &AuthzAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
