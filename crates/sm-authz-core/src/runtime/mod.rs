// crates/sm-authz-core/src/runtime/mod.rs
// ============================================================================
// Module: Secrets Manager Authz Runtime
// Description: Resolver, membership, diffing, handlers, dispatcher, and backends.
// Purpose: Evaluate grant mutations against caller access and organization rules.
// Dependencies: crate::{core, interfaces}, tokio
// ============================================================================

//! ## Overview
//! Runtime modules turn collaborator answers into allow/deny decisions. The
//! building blocks ([`PermissionResolver`], the membership validators and
//! [`GrantDiffEngine`]) are composed by one handler per request shape, and
//! [`AccessPolicyAuthorizer`] is the only entry point callers need.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod diff;
pub mod engine;
mod guards;
pub mod handlers;
pub mod membership;
pub mod outcome;
pub mod resolver;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuthzAuditEvent;
pub use audit::AuthzAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use diff::GrantDiffEngine;
pub use engine::AccessPolicyAuthorizer;
pub use engine::AuthorizationDecision;
pub use engine::AuthzError;
pub use engine::DEFAULT_MAX_GRANTS_PER_REQUEST;
pub use engine::EngineSettings;
pub use engine::LookupMode;
pub use handlers::AuthorizationHandler;
pub use handlers::HandlerContext;
pub use membership::OrganizationMembershipValidator;
pub use membership::RowComparisonMembership;
pub use membership::SameOrganizationMembership;
pub use outcome::DenyReason;
pub use outcome::Outcome;
pub use resolver::BatchAccess;
pub use resolver::PermissionResolver;
pub use store::InMemoryAccessStore;
