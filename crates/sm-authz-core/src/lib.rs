// crates/sm-authz-core/src/lib.rs
// ============================================================================
// Module: Secrets Manager Authz Core Library
// Description: Public API surface for the access-policy authorization engine.
// Purpose: Expose core types, collaborator interfaces, and the runtime engine.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! This crate decides whether a caller may create, update, delete or replace
//! grants between principals (users, groups, service accounts) and protected
//! resources (projects, service accounts, secrets). It never writes grants;
//! it answers allow or deny, and it fails closed on anything it cannot
//! prove. Persistence and identity live behind the traits in
//! [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AccessClient;
pub use interfaces::AccessClientResolver;
pub use interfaces::Collaborators;
pub use interfaces::CurrentCaller;
pub use interfaces::CurrentCallerAccessClientResolver;
pub use interfaces::GrantStore;
pub use interfaces::GroupDirectory;
pub use interfaces::LookupError;
pub use interfaces::OrgMembership;
pub use interfaces::OrganizationUserDirectory;
pub use interfaces::ProjectAccess;
pub use interfaces::ProjectStore;
pub use interfaces::SecretAccess;
pub use interfaces::SecretStore;
pub use interfaces::ServiceAccountAccess;
pub use interfaces::ServiceAccountStore;
pub use runtime::AccessPolicyAuthorizer;
pub use runtime::AuthorizationDecision;
pub use runtime::AuthzAuditEvent;
pub use runtime::AuthzAuditSink;
pub use runtime::AuthzError;
pub use runtime::DEFAULT_MAX_GRANTS_PER_REQUEST;
pub use runtime::DenyReason;
pub use runtime::EngineSettings;
pub use runtime::FileAuditSink;
pub use runtime::GrantDiffEngine;
pub use runtime::InMemoryAccessStore;
pub use runtime::LookupMode;
pub use runtime::NoopAuditSink;
pub use runtime::StderrAuditSink;
