//! Delete and configure specs

use crate::prelude::*;

fn created() -> Workspace {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);
    ws.prov().args(&["create", "edge.yaml"]).passes();
    ws
}

#[test]
fn delete_removes_job_directory() {
    let ws = created();

    ws.prov()
        .args(&["delete", "7"])
        .passes()
        .stdout_eq("Provision 7 deleted\n");

    assert!(!ws.provision_root().join("7").exists());
    assert_eq!(
        ws.tool_calls().last().map(String::as_str),
        Some("delete 7 --user oneadmin --password secret --batch --debug --force")
    );
}

#[test]
fn deleted_job_is_no_longer_found() {
    let ws = created();
    ws.prov().args(&["delete", "7"]).passes();

    ws.prov().args(&["log", "7"]).fails().code(3);
}

#[test]
fn configure_appends_to_job_log() {
    let ws = created();

    ws.prov()
        .args(&["configure", "7", "--follow"])
        .passes()
        .stdout_eq("configuring 7\nconfigure of 7 completed\n");

    ws.prov()
        .args(&["log", "7"])
        .passes()
        .stdout_eq("creating hosts\nID: 7\nconfiguring 7\n");
}

#[test]
fn configure_clears_error_mark() {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);
    std::fs::create_dir_all(ws.provision_root().join("7.ERROR")).unwrap();

    ws.prov()
        .args(&["status", "7"])
        .passes()
        .stdout_has("failed");

    ws.prov().args(&["configure", "7"]).passes();

    assert!(ws.provision_root().join("7").is_dir());
    assert!(!ws.provision_root().join("7.ERROR").exists());
}
