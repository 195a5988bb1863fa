// crates/sm-authz-config/src/config.rs
// ============================================================================
// Module: Secrets Manager Authz Configuration
// Description: Configuration loading and validation for the authorization engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: sm-authz-core, serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys, oversized files and out-of-range values are rejected rather
//! than ignored. A validated config turns into [`EngineSettings`] and an
//! audit sink for [`AccessPolicyAuthorizer`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use sm_authz_core::AccessPolicyAuthorizer;
use sm_authz_core::AuthzAuditSink;
use sm_authz_core::Collaborators;
use sm_authz_core::DEFAULT_MAX_GRANTS_PER_REQUEST;
use sm_authz_core::EngineSettings;
use sm_authz_core::FileAuditSink;
use sm_authz_core::LookupMode;
use sm_authz_core::NoopAuditSink;
use sm_authz_core::StderrAuditSink;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "sm-authz.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SM_AUTHZ_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound accepted for `engine.max_grants_per_request`.
pub const MAX_GRANTS_PER_REQUEST_LIMIT: usize = 100_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Authorization engine configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmAuthzConfig {
    /// Engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Decision audit output.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl SmAuthzConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: the explicit `path`, then `SM_AUTHZ_CONFIG`, then
    /// `sm-authz.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.audit.validate()
    }

    /// Returns the engine settings described by this config.
    #[must_use]
    pub const fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            lookup_mode: self.engine.lookup_mode,
            max_grants_per_request: self.engine.max_grants_per_request,
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened and
    /// [`ConfigError::Invalid`] when a file sink has no path.
    pub fn build_audit_sink(&self) -> Result<Arc<dyn AuthzAuditSink>, ConfigError> {
        match self.audit.sink {
            AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::File => {
                let path = self.audit.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path is required for the file sink".to_string())
                })?;
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }

    /// Builds an authorizer over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the config is invalid or the audit sink
    /// cannot be built.
    pub fn build_authorizer(
        &self,
        collaborators: Collaborators,
    ) -> Result<AccessPolicyAuthorizer, ConfigError> {
        self.validate()?;
        let audit = self.build_audit_sink()?;
        Ok(AccessPolicyAuthorizer::new(collaborators, self.engine_settings())
            .with_audit_sink(audit))
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// How independent lookups within one decision are issued.
    #[serde(default)]
    pub lookup_mode: LookupMode,
    /// Requests with more grant edges are denied.
    #[serde(default = "default_max_grants_per_request")]
    pub max_grants_per_request: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookup_mode: LookupMode::default(),
            max_grants_per_request: DEFAULT_MAX_GRANTS_PER_REQUEST,
        }
    }
}

impl EngineConfig {
    /// Validates engine limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_grants_per_request == 0 {
            return Err(ConfigError::Invalid(
                "engine.max_grants_per_request must be greater than zero".to_string(),
            ));
        }
        if self.max_grants_per_request > MAX_GRANTS_PER_REQUEST_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "engine.max_grants_per_request must be at most {MAX_GRANTS_PER_REQUEST_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

/// `[audit]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates sink and path consistency.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => Err(ConfigError::Invalid(
                "audit.path is required for the file sink".to_string(),
            )),
            (AuditSinkKind::None | AuditSinkKind::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid with sink = \"file\"".to_string(),
            )),
            (AuditSinkKind::None | AuditSinkKind::Stderr, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default for `engine.max_grants_per_request`.
const fn default_max_grants_per_request() -> usize {
    DEFAULT_MAX_GRANTS_PER_REQUEST
}

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
