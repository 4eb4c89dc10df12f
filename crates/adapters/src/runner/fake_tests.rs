// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

async fn drain(mut stream: ProcessStream) -> Vec<ProcessEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn records_calls_in_order() {
    let runner = FakeProcessRunner::new();
    runner
        .run_sync("oneprovision", &["list".to_string()])
        .await
        .unwrap();
    let _ = runner
        .run_async("oneprovision", &["create".to_string()])
        .await
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].mode, RunMode::Sync);
    assert_eq!(calls[0].args, vec!["list"]);
    assert_eq!(calls[1].mode, RunMode::Async);
    assert_eq!(calls[1].args, vec!["create"]);
}

#[tokio::test]
async fn scripted_async_run_emits_lines_then_close() {
    let runner = FakeProcessRunner::new();
    runner.push_script(
        FakeScript::succeeding()
            .stdout("creating")
            .stderr("warn")
            .stdout("ID: 9"),
    );

    let events = drain(runner.run_async("tool", &[]).await.unwrap()).await;
    assert_eq!(
        events,
        vec![
            ProcessEvent::Stdout("creating".to_string()),
            ProcessEvent::Stderr("warn".to_string()),
            ProcessEvent::Stdout("ID: 9".to_string()),
            ProcessEvent::Closed {
                success: true,
                last_line: Some("ID: 9".to_string()),
            },
        ]
    );
}

#[tokio::test]
async fn failing_script_closes_unsuccessfully() {
    let runner = FakeProcessRunner::new();
    runner.push_script(FakeScript::failing().stderr("boom"));

    let events = drain(runner.run_async("tool", &[]).await.unwrap()).await;
    assert_eq!(
        events.last(),
        Some(&ProcessEvent::Closed {
            success: false,
            last_line: Some("boom".to_string()),
        })
    );
}

#[tokio::test]
async fn launch_failure_script_returns_error() {
    let runner = FakeProcessRunner::new();
    runner.push_script(FakeScript::launch_failure());
    assert!(matches!(
        runner.run_async("tool", &[]).await,
        Err(RunError::Launch { .. })
    ));

    runner.push_sync_launch_failure();
    assert!(matches!(
        runner.run_sync("tool", &[]).await,
        Err(RunError::Launch { .. })
    ));
}

#[tokio::test]
async fn scripted_sync_results_are_consumed_in_order() {
    let runner = FakeProcessRunner::new();
    runner.push_sync(SyncOutput::success("[]"));
    runner.push_sync(SyncOutput::failure("nope"));

    assert_eq!(
        runner.run_sync("tool", &[]).await.unwrap(),
        SyncOutput::success("[]")
    );
    assert_eq!(
        runner.run_sync("tool", &[]).await.unwrap(),
        SyncOutput::failure("nope")
    );
    assert_eq!(
        runner.run_sync("tool", &[]).await.unwrap(),
        SyncOutput::success("")
    );
}

#[tokio::test]
async fn held_script_waits_for_gate_before_closing() {
    let runner = FakeProcessRunner::new();
    let gate = Arc::new(Notify::new());
    runner.push_script(
        FakeScript::succeeding()
            .stdout("step 1")
            .hold_close(Arc::clone(&gate)),
    );

    let mut stream = runner.run_async("tool", &[]).await.unwrap();
    assert_eq!(
        stream.next().await,
        Some(ProcessEvent::Stdout("step 1".to_string()))
    );

    let pending =
        tokio::time::timeout(std::time::Duration::from_millis(50), stream.next()).await;
    assert!(pending.is_err(), "close should wait for the gate");

    gate.notify_one();
    assert!(matches!(
        stream.next().await,
        Some(ProcessEvent::Closed { success: true, .. })
    ));
}
