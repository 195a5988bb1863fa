// crates/sm-authz-core/src/core/mod.rs
// ============================================================================
// Module: Secrets Manager Authz Core Types
// Description: Identifiers, access classes, grant edges, composites, and tokens.
// Purpose: Provide the stable, serializable vocabulary the engine reasons over.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Core types describe who is being granted access to what, which bits are
//! being granted, and which operation the caller wants to perform. None of
//! these types perform lookups; they are pure data.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod access;
pub mod composites;
pub mod identifiers;
pub mod operations;
pub mod policies;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use access::AccessBits;
pub use access::AccessClientType;
pub use access::ClientClass;
pub use composites::AccessPolicyChange;
pub use composites::AccessPolicyUpdate;
pub use composites::GroupGrant;
pub use composites::PeopleAccessPolicies;
pub use composites::ProjectGrant;
pub use composites::ProjectServiceAccountsAccessPolicies;
pub use composites::SecretAccessPoliciesUpdates;
pub use composites::ServiceAccountGrant;
pub use composites::ServiceAccountGrantedPolicies;
pub use composites::ServiceAccountPeopleAccessPolicies;
pub use composites::UserGrant;
pub use identifiers::CallerId;
pub use identifiers::GroupId;
pub use identifiers::OrganizationId;
pub use identifiers::OrganizationUserId;
pub use identifiers::ProjectId;
pub use identifiers::SecretId;
pub use identifiers::ServiceAccountId;
pub use operations::AccessPolicyOperation;
pub use operations::AuthorizationRequest;
pub use operations::AuthorizationTarget;
pub use operations::OperationToken;
pub use operations::PeopleAccessPoliciesOperation;
pub use operations::ProjectPeopleAccessPoliciesOperation;
pub use operations::ProjectServiceAccountsAccessPoliciesOperation;
pub use operations::SecretAccessPoliciesOperation;
pub use operations::ServiceAccountGrantedPoliciesOperation;
pub use operations::ServiceAccountPeopleAccessPoliciesOperation;
pub use policies::AccessPolicy;
pub use policies::Group;
pub use policies::GroupProjectAccessPolicy;
pub use policies::GroupServiceAccountAccessPolicy;
pub use policies::OrganizationUser;
pub use policies::Principal;
pub use policies::Project;
pub use policies::Resource;
pub use policies::Secret;
pub use policies::ServiceAccount;
pub use policies::ServiceAccountProjectAccessPolicy;
pub use policies::ServiceAccountSecretAccessPolicy;
pub use policies::UserProjectAccessPolicy;
pub use policies::UserServiceAccountAccessPolicy;
