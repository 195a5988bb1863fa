// crates/sm-authz-core/src/runtime/audit.rs
// ============================================================================
// Module: Authorization Audit Logging
// Description: Structured audit events for access-policy authorization decisions.
// Purpose: Record why each decision was reached without returning it to callers.
// Dependencies: crate::{core, runtime}, serde, serde_json
// ============================================================================

//! ## Overview
//! Every decision produces one [`AuthzAuditEvent`], including the deny
//! reason that the caller never sees. Sinks serialize events as JSON lines
//! so deployments can route them to their own logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::access::ClientClass;
use crate::core::identifiers::OrganizationId;
use crate::runtime::engine::AuthorizationDecision;
use crate::runtime::outcome::Outcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Authorization audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AuthzAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation label.
    pub operation: &'static str,
    /// Target shape label.
    pub target: &'static str,
    /// Anchor organization when known without lookups.
    pub organization_id: Option<OrganizationId>,
    /// Number of grant edges in the request.
    pub edge_count: usize,
    /// Raw caller class.
    pub client_class: ClientClass,
    /// Decision returned to the caller.
    pub decision: AuthorizationDecision,
    /// Failed guard label when denied.
    pub deny_reason: Option<&'static str>,
}

/// Inputs required to construct an authorization audit event.
pub struct AuthzAuditEventParams {
    /// Operation label.
    pub operation: &'static str,
    /// Target shape label.
    pub target: &'static str,
    /// Anchor organization when known without lookups.
    pub organization_id: Option<OrganizationId>,
    /// Number of grant edges in the request.
    pub edge_count: usize,
    /// Raw caller class.
    pub client_class: ClientClass,
    /// Handler outcome.
    pub outcome: Outcome,
}

impl AuthzAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: AuthzAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "access_policy_authz",
            timestamp_ms,
            operation: params.operation,
            target: params.target,
            organization_id: params.organization_id,
            edge_count: params.edge_count,
            client_class: params.client_class,
            decision: AuthorizationDecision::from(params.outcome),
            deny_reason: params.outcome.deny_reason().map(|reason| reason.as_str()),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for authorization decisions.
pub trait AuthzAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &AuthzAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuthzAuditSink for StderrAuditSink {
    fn record(&self, event: &AuthzAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuthzAuditSink for FileAuditSink {
    fn record(&self, event: &AuthzAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuthzAuditSink for NoopAuditSink {
    fn record(&self, _event: &AuthzAuditEvent) {}
}
