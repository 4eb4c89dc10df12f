// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event_bus::BusEvent;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn successful_create_commits_directory() {
    let ctx = setup();
    ctx.runner
        .push_script(FakeScript::succeeding().stdout("creating").stdout("ID: 7"));

    let accepted = ctx
        .orch
        .create(&serde_json::json!({"name": "web"}), &creds())
        .await
        .unwrap();
    assert_eq!(accepted.job_name, "tmp-1");
    assert_eq!(accepted.topic, "create");

    let outcome = accepted.completion.await.unwrap();
    let committed = ctx.root.join("7");
    assert_eq!(
        outcome,
        JobOutcome::Committed {
            id: JobId::new("7"),
            path: committed.clone(),
        }
    );
    assert!(committed.is_dir());
    assert!(!ctx.root.join("tmp/oneadmin/tmp-1").exists());

    // Index no longer mentions the job, but it is found by name
    assert_eq!(ctx.orch.pending().resolve(&JobId::new("7")), None);
    assert!(ctx.orch.pending().entries().is_empty());
    assert_eq!(ctx.orch.directories().find_by_name("7"), Some(committed.clone()));

    let lines = read_all(&committed.join(LOG_FILE_NAME)).unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.command == ProvisionCommand::Create));
    assert!(lines.iter().all(|l| l.command_id == accepted.command_id));

    let request = std::fs::read_to_string(committed.join(REQUEST_FILE_NAME)).unwrap();
    assert_eq!(request.trim(), "name: web");
}

#[tokio::test]
async fn create_invokes_tool_with_staged_config() {
    let ctx = setup();
    ctx.orch
        .create(&serde_json::json!({"name": "web"}), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    let calls = async_calls(&ctx.runner);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].command, "oneprovision");
    let staged_config = ctx.root.join("tmp/oneadmin/tmp-1/provision.yaml");
    let mut expected = vec!["create".to_string(), staged_config.display().to_string()];
    expected.extend(strings(&[
        "--user",
        "oneadmin",
        "--password",
        "secret",
        "--batch",
        "--debug",
        "--fail_cleanup",
    ]));
    assert_eq!(calls[0].args, expected);
}

#[tokio::test]
async fn failure_after_discovery_leaves_error_directory() {
    let ctx = setup();
    ctx.runner.push_script(
        FakeScript::failing()
            .stdout("creating")
            .stdout("ID: 8")
            .stderr("quota exceeded"),
    );

    let outcome = ctx
        .orch
        .create(&serde_json::json!({"name": "db"}), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    let failed = ctx.root.join("tmp/oneadmin/8.ERROR");
    assert_eq!(
        outcome,
        JobOutcome::Failed {
            job: "8".to_string(),
            path: Some(failed.clone()),
            last_line: Some("quota exceeded".to_string()),
        }
    );
    assert_eq!(
        log_data(&failed),
        strings(&["creating", "ID: 8", "quota exceeded"])
    );
    // Left for a later delete by id
    assert_eq!(
        ctx.orch.pending().resolve(&JobId::new("8")),
        Some(TempName::new("tmp-1"))
    );
    assert_eq!(ctx.orch.locate(&JobId::new("8")), Some(failed));
}

#[tokio::test]
async fn failure_before_discovery_marks_staging_directory() {
    let ctx = setup();
    ctx.runner
        .push_script(FakeScript::failing().stderr("bad config"));

    let outcome = ctx
        .orch
        .create(&serde_json::json!({}), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert!(ctx.root.join("tmp/oneadmin/tmp-1.ERROR").is_dir());
}

#[tokio::test]
async fn launch_failure_is_returned_and_marked() {
    let ctx = setup();
    ctx.runner.push_script(FakeScript::launch_failure());

    let err = ctx
        .orch
        .create(&serde_json::json!({}), &creds())
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Launch(_)));
    assert!(ctx.root.join("tmp/oneadmin/tmp-1.ERROR").is_dir());
}

#[tokio::test]
async fn commit_uses_first_announced_id() {
    let ctx = setup();
    ctx.runner
        .push_script(FakeScript::succeeding().stdout("ID: 7").stdout("ID: 8"));

    let outcome = ctx
        .orch
        .create(&serde_json::json!({}), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    assert_eq!(
        outcome,
        JobOutcome::Committed {
            id: JobId::new("7"),
            path: ctx.root.join("7"),
        }
    );
    assert!(!ctx.root.join("8").exists());
    assert!(ctx.orch.pending().entries().is_empty());
}

#[tokio::test]
async fn create_rejects_user_that_is_not_a_plain_name() {
    let ctx = setup();

    for user in ["/tmp/outside", "team/alice", ".."] {
        let err = ctx
            .orch
            .create(&serde_json::json!({}), &Credentials::new(user, "secret"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, EngineError::Dir(prov_storage::DirError::InvalidName(_))),
            "{user}: {err}"
        );
    }
    assert!(ctx.runner.calls().is_empty());
    assert!(!ctx.root.join("tmp").exists());
}

#[tokio::test]
async fn commit_falls_back_to_discovered_id() {
    let ctx = setup();
    ctx.runner
        .push_script(FakeScript::succeeding().stdout("ID: 5").stdout("done"));

    let outcome = ctx
        .orch
        .create(&serde_json::json!({}), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert!(ctx.root.join("5").is_dir());
    assert!(ctx.orch.pending().entries().is_empty());
}

#[tokio::test]
async fn held_index_lock_skips_registration() {
    let ctx = setup_with(|c| c.lock_timeout_ms = 0);
    let gate = Arc::new(Notify::new());
    ctx.runner.push_script(
        FakeScript::succeeding()
            .stdout("ID: 7")
            .stdout("waiting")
            .hold_close(Arc::clone(&gate)),
    );
    let mut sub = ctx.orch.subscribe(ProvisionCommand::Create).unwrap();

    let other_writer = PendingJobIndex::new(&ctx.root, LockPolicy::default());
    let guard = other_writer.lock().unwrap();

    let accepted = ctx
        .orch
        .create(&serde_json::json!({}), &creds())
        .await
        .unwrap();

    // Lines are handled in order, so once "waiting" arrives the
    // registration attempt for id 7 has already happened
    loop {
        match sub.recv().await {
            Some(BusEvent::Line(line)) if line.data == "waiting" => break,
            Some(_) => continue,
            None => panic!("bus closed"),
        }
    }
    assert_eq!(ctx.orch.pending().resolve(&JobId::new("7")), None);

    drop(guard);
    gate.notify_one();
    let outcome = accepted.completion.await.unwrap();

    assert!(outcome.is_success());
    assert!(ctx.root.join("7").is_dir());
}

#[tokio::test]
async fn concurrent_creates_get_distinct_directories() {
    let ctx = setup();
    let request = serde_json::json!({"name": "web"});
    let creds = creds();

    let (a, b, c) = tokio::join!(
        ctx.orch.create(&request, &creds),
        ctx.orch.create(&request, &creds),
        ctx.orch.create(&request, &creds),
    );
    let mut names = vec![a.unwrap().job_name, b.unwrap().job_name, c.unwrap().job_name];
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 3);

    let staged: Vec<_> = async_calls(&ctx.runner)
        .into_iter()
        .map(|call| call.args[1].clone())
        .collect();
    let mut unique = staged.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), staged.len());
}

#[tokio::test]
async fn subscriber_sees_create_output() {
    let ctx = setup();
    let mut sub = ctx.orch.subscribe(ProvisionCommand::Create).unwrap();
    ctx.runner
        .push_script(FakeScript::succeeding().stdout("creating").stdout("ID: 2"));

    ctx.orch
        .create(&serde_json::json!({}), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    let mut data = Vec::new();
    while let Some(event) = sub.recv().await {
        match event {
            BusEvent::Line(line) => data.push(line.data),
            BusEvent::Finished { success, .. } => {
                assert!(success);
                break;
            }
        }
    }
    assert_eq!(data, strings(&["creating", "ID: 2"]));
    assert!(ctx.orch.subscribe(ProvisionCommand::Create).is_err());
}
