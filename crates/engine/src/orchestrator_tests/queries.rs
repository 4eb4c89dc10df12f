// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use prov_adapters::SyncOutput;
use yare::parameterized;

#[test]
fn get_log_of_unknown_job_is_not_found() {
    let ctx = setup();
    let err = ctx.orch.get_log(&JobId::new("99")).unwrap_err();
    assert!(matches!(err, EngineError::NotFound(ref id) if id == "99"));
}

#[test]
fn get_log_without_log_file_is_not_found() {
    let ctx = setup();
    std::fs::create_dir_all(ctx.root.join("7")).unwrap();
    assert!(matches!(
        ctx.orch.get_log(&JobId::new("7")),
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn get_log_follows_pending_entry_to_staging() {
    let ctx = setup();
    let gate = std::sync::Arc::new(tokio::sync::Notify::new());
    ctx.runner.push_script(
        FakeScript::succeeding()
            .stdout("ID: 12")
            .stdout("still running")
            .hold_close(gate.clone()),
    );
    let mut sub = ctx.orch.subscribe(ProvisionCommand::Create).unwrap();
    let accepted = ctx
        .orch
        .create(&serde_json::json!({}), &creds())
        .await
        .unwrap();

    // Wait until both lines are logged
    for _ in 0..2 {
        sub.recv().await.unwrap();
    }
    let data: Vec<String> = ctx
        .orch
        .get_log(&JobId::new("12"))
        .unwrap()
        .into_iter()
        .map(|l| l.data)
        .collect();
    assert_eq!(data, strings(&["ID: 12", "still running"]));

    gate.notify_one();
    accepted.completion.await.unwrap();
    assert_eq!(ctx.orch.get_log(&JobId::new("12")).unwrap().len(), 2);
}

#[tokio::test]
async fn list_parses_json_output() {
    let ctx = setup();
    ctx.runner
        .push_sync(SyncOutput::success(r#"[{"ID": "7", "NAME": "web"}]"#));

    let listed = ctx.orch.list(&creds()).await.unwrap();

    assert_eq!(listed[0]["NAME"], "web");
    let call = &ctx.runner.calls()[0];
    assert_eq!(call.mode, RunMode::Sync);
    assert_eq!(
        call.args,
        strings(&["list", "--user", "oneadmin", "--password", "secret", "--json"])
    );
}

#[tokio::test]
async fn show_passes_id_and_parses_json() {
    let ctx = setup();
    ctx.runner
        .push_sync(SyncOutput::success(r#"{"ID": "7"}"#));

    let shown = ctx.orch.show(&JobId::new("7"), &creds()).await.unwrap();

    assert_eq!(shown["ID"], "7");
    assert_eq!(ctx.runner.calls()[0].args[..2], strings(&["show", "7"])[..]);
}

#[tokio::test]
async fn query_failure_carries_tool_output() {
    let ctx = setup();
    ctx.runner
        .push_sync(SyncOutput::failure("authentication failed"));

    let err = ctx.orch.list(&creds()).await.unwrap_err();

    assert!(matches!(err, EngineError::ExitFailure { .. }));
    assert_eq!(err.output(), Some("authentication failed"));
}

#[tokio::test]
async fn unparseable_query_output_is_exit_failure() {
    let ctx = setup();
    ctx.runner.push_sync(SyncOutput::success("not json"));

    let err = ctx
        .orch
        .show(&JobId::new("7"), &creds())
        .await
        .unwrap_err();

    let EngineError::ExitFailure { message, output } = err else {
        panic!("expected exit failure, got {err:?}");
    };
    assert!(message.contains("invalid JSON"), "{message}");
    assert_eq!(output, "not json");
}

#[tokio::test]
async fn query_launch_failure_is_launch_error() {
    let ctx = setup();
    ctx.runner.push_sync_launch_failure();
    assert!(matches!(
        ctx.orch.list(&creds()).await,
        Err(EngineError::Launch(_))
    ));
}

#[test]
fn list_defaults_uses_configured_root() {
    let ctx = setup();
    let templates = ctx.root.parent().unwrap().join("templates");
    std::fs::create_dir_all(templates.join("aws/provisions")).unwrap();
    std::fs::write(templates.join("aws/description.md"), "AWS\n").unwrap();
    std::fs::write(templates.join("aws/provisions/x.yml"), "a: 1\n").unwrap();

    let defaults = ctx.orch.list_defaults(None).unwrap();
    assert_eq!(defaults["aws"].description, "AWS");
    assert_eq!(defaults["aws"].provisions.len(), 1);

    assert!(matches!(
        ctx.orch.list_defaults(Some(&templates.join("missing"))),
        Err(EngineError::Templates(_))
    ));
}

#[parameterized(
    list = { ProvisionCommand::List },
    show = { ProvisionCommand::Show },
)]
fn queries_cannot_be_subscribed(command: ProvisionCommand) {
    let ctx = setup();
    assert_eq!(
        ctx.orch.subscribe(command).err(),
        Some(BusError::NotStreaming(command.to_string()))
    );
}

#[test]
fn streaming_commands_can_be_subscribed() {
    let ctx = setup();
    for command in [
        ProvisionCommand::Create,
        ProvisionCommand::Delete,
        ProvisionCommand::Configure,
    ] {
        assert!(ctx.orch.subscribe(command).is_ok(), "{command}");
    }
}
