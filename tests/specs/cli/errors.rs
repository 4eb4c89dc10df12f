//! CLI error handling specs
//!
//! Verify error messages and exit codes for bad input.

use crate::prelude::*;

#[test]
fn tool_commands_require_a_user() {
    let ws = Workspace::new();
    ws.prov_anonymous()
        .args(&["list"])
        .fails()
        .code(1)
        .stderr_has("no user given (use --user or PROV_USER)");
    assert!(ws.tool_calls().is_empty());
}

#[test]
fn flags_override_env_credentials() {
    let ws = Workspace::new();
    ws.prov()
        .args(&["list", "--user", "alice", "--password", "pw"])
        .passes();
    assert_eq!(ws.tool_calls(), vec!["list --user alice --password pw --json"]);
}

#[test]
fn unknown_job_exits_with_not_found() {
    let ws = Workspace::new();
    ws.prov()
        .args(&["delete", "99"])
        .fails()
        .code(3)
        .stderr_has("provision not found: 99");
    assert!(ws.tool_calls().is_empty());
}

#[test]
fn missing_request_file_names_it() {
    let ws = Workspace::new();
    ws.prov()
        .args(&["create", "nope.yaml"])
        .fails()
        .stderr_has("failed to read nope.yaml");
}

#[test]
fn unparseable_config_is_reported() {
    let ws = Workspace::new();
    ws.file("config.toml", "lock_timeout_ms = \"soon\"\n");
    ws.prov()
        .args(&["status", "7"])
        .fails()
        .stderr_has("config.toml");
}
