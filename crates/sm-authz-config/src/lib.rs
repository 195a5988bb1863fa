// crates/sm-authz-config/src/lib.rs
// ============================================================================
// Module: Secrets Manager Authz Config Library
// Description: Canonical config model and validation for the authorization engine.
// Purpose: Single source of truth for sm-authz.toml semantics.
// Dependencies: sm-authz-core, serde, toml
// ============================================================================

//! ## Overview
//! `sm-authz-config` defines the TOML configuration for the access-policy
//! authorization engine: lookup mode, per-request grant limit and the audit
//! sink. Loading is strict and fail-closed; a validated config builds a
//! ready-to-use [`sm_authz_core::AccessPolicyAuthorizer`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
