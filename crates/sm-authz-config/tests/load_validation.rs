// crates/sm-authz-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: File-based loading, limits, and engine wiring for sm-authz.toml.
// Purpose: Ensure configuration loading fails closed and builds a working engine.
// Dependencies: sm-authz-config, sm-authz-core, tempfile
// ============================================================================

//! Load validation tests for sm-authz-config.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use sm_authz_config::AuditConfig;
use sm_authz_config::AuditSinkKind;
use sm_authz_config::ConfigError;
use sm_authz_config::MAX_CONFIG_FILE_SIZE;
use sm_authz_config::SmAuthzConfig;
use sm_authz_core::Collaborators;
use sm_authz_core::DEFAULT_MAX_GRANTS_PER_REQUEST;
use sm_authz_core::InMemoryAccessStore;
use sm_authz_core::LookupMode;
use tempfile::TempDir;

type TestResult = Result<(), String>;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes `contents` to `sm-authz.toml` in a fresh temp dir.
fn write_config(contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sm-authz.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

/// Assert that a load result is an error containing a specific substring.
fn assert_invalid(result: Result<SmAuthzConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn empty_file_loads_defaults() {
    let (_dir, path) = write_config(b"");
    let config = SmAuthzConfig::load(Some(&path)).unwrap();
    assert_eq!(config, SmAuthzConfig::default());
    let settings = config.engine_settings();
    assert_eq!(settings.lookup_mode, LookupMode::Concurrent);
    assert_eq!(settings.max_grants_per_request, DEFAULT_MAX_GRANTS_PER_REQUEST);
}

#[test]
fn full_file_loads() {
    let (dir, path) = write_config(b"");
    let audit_path = dir.path().join("audit.jsonl");
    let contents = format!(
        "[engine]\nlookup_mode = \"sequential\"\nmax_grants_per_request = 250\n\n\
         [audit]\nsink = \"file\"\npath = \"{}\"\n",
        audit_path.display()
    );
    fs::write(&path, contents).unwrap();

    let config = SmAuthzConfig::load(Some(&path)).unwrap();

    assert_eq!(config.engine.lookup_mode, LookupMode::Sequential);
    assert_eq!(config.engine.max_grants_per_request, 250);
    assert_eq!(config.audit.sink, AuditSinkKind::File);
    assert!(config.build_audit_sink().is_ok());
    assert!(audit_path.exists());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = SmAuthzConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let (_dir, path) = write_config(b"[engine]\nlookup_mode = \"concurrent\"\nretries = 3\n");
    assert_invalid(SmAuthzConfig::load(Some(&path)), "parse error")?;
    let (_dir, path) = write_config(b"[metrics]\nenabled = true\n");
    assert_invalid(SmAuthzConfig::load(Some(&path)), "parse error")
}

#[test]
fn unknown_lookup_mode_is_rejected() -> TestResult {
    let (_dir, path) = write_config(b"[engine]\nlookup_mode = \"parallel\"\n");
    assert_invalid(SmAuthzConfig::load(Some(&path)), "parse error")
}

#[test]
fn oversized_file_is_rejected() -> TestResult {
    let mut contents = b"# padding\n".to_vec();
    contents.resize(MAX_CONFIG_FILE_SIZE + 1, b'#');
    let (_dir, path) = write_config(&contents);
    assert_invalid(SmAuthzConfig::load(Some(&path)), "size limit")
}

#[test]
fn non_utf8_file_is_rejected() -> TestResult {
    let (_dir, path) = write_config(&[0xff, 0xfe, 0x00, 0x41]);
    assert_invalid(SmAuthzConfig::load(Some(&path)), "utf-8")
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn zero_grant_limit_is_rejected() -> TestResult {
    let (_dir, path) = write_config(b"[engine]\nmax_grants_per_request = 0\n");
    assert_invalid(SmAuthzConfig::load(Some(&path)), "greater than zero")
}

#[test]
fn file_sink_requires_path() -> TestResult {
    let (_dir, path) = write_config(b"[audit]\nsink = \"file\"\n");
    assert_invalid(SmAuthzConfig::load(Some(&path)), "audit.path is required")
}

#[test]
fn blank_audit_path_is_rejected() -> TestResult {
    let (_dir, path) = write_config(b"[audit]\nsink = \"file\"\npath = \"  \"\n");
    assert_invalid(SmAuthzConfig::load(Some(&path)), "non-empty")
}

#[test]
fn path_without_file_sink_is_rejected() -> TestResult {
    let (_dir, path) = write_config(b"[audit]\nsink = \"stderr\"\npath = \"audit.jsonl\"\n");
    assert_invalid(SmAuthzConfig::load(Some(&path)), "only valid")
}

// ============================================================================
// SECTION: Engine Wiring
// ============================================================================

#[test]
fn build_authorizer_applies_settings() {
    let (_dir, path) =
        write_config(b"[engine]\nlookup_mode = \"sequential\"\nmax_grants_per_request = 7\n");
    let config = SmAuthzConfig::load(Some(&path)).unwrap();
    let store = Arc::new(InMemoryAccessStore::new());
    let authorizer = config.build_authorizer(Collaborators::from_backend(store)).unwrap();
    assert_eq!(authorizer.settings(), config.engine_settings());
    assert_eq!(authorizer.settings().max_grants_per_request, 7);
}

#[test]
fn unopenable_audit_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = SmAuthzConfig {
        audit: AuditConfig {
            sink: AuditSinkKind::File,
            path: Some(dir.path().join("missing").join("audit.jsonl").display().to_string()),
        },
        ..SmAuthzConfig::default()
    };
    assert!(config.validate().is_ok());
    assert!(matches!(config.build_audit_sink(), Err(ConfigError::Io(_))));
}
