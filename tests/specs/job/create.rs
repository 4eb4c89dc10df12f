//! Create specs
//!
//! A successful create ends with the job directory committed under its
//! permanent id; a failed one keeps the directory with an error mark.

use crate::prelude::*;

#[test]
fn create_commits_directory_under_announced_id() {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);

    ws.prov()
        .args(&["create", "edge.yaml"])
        .passes()
        .stdout_eq("Provision 7 created\n");

    let job = ws.provision_root().join("7");
    assert!(job.join("provision.yaml").is_file());
    assert!(job.join("stdouterr.log").is_file());

    let request = std::fs::read_to_string(job.join("provision.yaml")).unwrap();
    assert!(request.contains("hostname: host-1"));

    let mapping = std::fs::read_to_string(ws.provision_root().join("provision-mapping.yml"))
        .unwrap_or_default();
    assert!(!mapping.contains("'7'"), "entry left behind: {mapping}");
}

#[test]
fn create_passes_request_path_and_flags() {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);
    ws.prov().args(&["create", "edge.yaml"]).passes();

    let calls = ws.tool_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("create "));
    assert!(calls[0].contains("/provision.yaml --user oneadmin --password secret"));
    assert!(calls[0].ends_with("--batch --debug --fail_cleanup"));
}

#[test]
fn follow_streams_tool_output() {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);

    ws.prov()
        .args(&["create", "edge.yaml", "--follow"])
        .passes()
        .stdout_eq("creating hosts\nID: 7\nProvision 7 created\n");
}

#[test]
fn json_output_reports_outcome() {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);

    let run = ws.prov().args(&["create", "edge.yaml", "-o", "json"]).passes();
    let report = run.json();
    assert_eq!(report["job"], "7");
    assert_eq!(report["command"], "create");
    assert_eq!(report["success"], true);
    assert!(report["commandId"].is_string());
}

#[test]
fn failed_create_marks_directory() {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);
    ws.fail_create();

    ws.prov()
        .args(&["create", "edge.yaml"])
        .fails()
        .code(1)
        .stderr_has("create of 7 failed");

    assert!(!ws.provision_root().join("7").exists());
    let failed = ws.provision_root().join("tmp/oneadmin/7.ERROR");
    assert!(failed.join("stdouterr.log").is_file());
}

#[test]
fn unlaunchable_tool_fails_create() {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);

    ws.prov()
        .env("PROV_TOOL", ws.path().join("missing-tool"))
        .args(&["create", "edge.yaml"])
        .fails()
        .stderr_has("missing-tool");
}
