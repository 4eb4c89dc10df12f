//! Query specs: log, list, show, status, defaults

use crate::prelude::*;

#[test]
fn log_json_carries_command_metadata() {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);
    ws.prov().args(&["create", "edge.yaml"]).passes();

    let run = ws.prov().args(&["log", "7", "-o", "json"]).passes();
    let lines = run.json();
    let lines = lines.as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["data"], "creating hosts");
    assert_eq!(lines[0]["command"], "create");
    assert_eq!(lines[1]["data"], "ID: 7");
    assert_eq!(lines[0]["commandId"], lines[1]["commandId"]);
}

#[test]
fn list_prints_tool_json() {
    let ws = Workspace::new();
    let run = ws.prov().args(&["list"]).passes();
    assert_eq!(run.json()[0]["NAME"], "edge");
}

#[test]
fn show_passes_id_through() {
    let ws = Workspace::new();
    let run = ws.prov().args(&["show", "12"]).passes();
    assert_eq!(run.json()["ID"], "12");
    assert_eq!(
        ws.tool_calls(),
        vec!["show 12 --user oneadmin --password secret --json"]
    );
}

#[test]
fn status_of_committed_job() {
    let ws = Workspace::new();
    ws.file("edge.yaml", EDGE_REQUEST);
    ws.prov().args(&["create", "edge.yaml"]).passes();

    let run = ws.prov().args(&["status", "7", "-o", "json"]).passes();
    assert_eq!(run.json()["state"], "succeeded");
}

#[test]
fn defaults_lists_template_sets() {
    let ws = Workspace::new();
    ws.file("templates/aws/description.md", "AWS edge cluster\n");
    ws.file("templates/aws/provisions/edge.yml", "name: aws-edge\n");
    ws.file("templates/aws/providers/aws/us-east.yml", "name: us-east\n");

    ws.prov_anonymous()
        .args(&["defaults", "templates"])
        .passes()
        .stdout_has("aws: AWS edge cluster")
        .stdout_has("providers: aws")
        .stdout_has("provisions: 1");
}
