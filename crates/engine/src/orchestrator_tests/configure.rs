// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

async fn configure(ctx: &TestContext, id: &str) -> JobOutcome {
    ctx.orch
        .configure(&JobId::new(id), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap()
}

#[tokio::test]
async fn configure_appends_to_existing_log() {
    let ctx = setup();
    let committed = job_dir(&ctx, "7");
    ctx.runner
        .push_script(FakeScript::succeeding().stdout("configuring hosts"));

    let outcome = configure(&ctx, "7").await;

    assert_eq!(
        outcome,
        JobOutcome::Completed {
            id: JobId::new("7"),
            path: Some(committed.clone()),
        }
    );
    let lines = read_all(&committed.join(LOG_FILE_NAME)).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].command, ProvisionCommand::Configure);
    assert_eq!(lines[0].id, "7");
    assert_eq!(async_calls(&ctx.runner)[0].args[..2], strings(&["configure", "7"])[..]);
}

#[tokio::test]
async fn successful_configure_clears_error_mark() {
    let ctx = setup();
    job_dir(&ctx, "7.ERROR");

    let outcome = configure(&ctx, "7").await;

    let restored = ctx.root.join("7");
    assert!(matches!(outcome, JobOutcome::Completed { path: Some(ref p), .. } if *p == restored));
    assert!(restored.is_dir());
    assert!(!ctx.root.join("7.ERROR").exists());
}

#[tokio::test]
async fn error_mark_stays_when_committed_sibling_exists() {
    let ctx = setup();
    job_dir(&ctx, "tmp/oneadmin/7.ERROR");
    let committed = job_dir(&ctx, "7");

    let outcome = configure(&ctx, "7").await;

    // The committed directory is found first and configured
    assert!(matches!(outcome, JobOutcome::Completed { path: Some(ref p), .. } if *p == committed));
    assert!(ctx.root.join("tmp/oneadmin/7.ERROR").is_dir());
}

#[tokio::test]
async fn failed_configure_marks_directory() {
    let ctx = setup();
    job_dir(&ctx, "7");
    ctx.runner
        .push_script(FakeScript::failing().stderr("unreachable"));

    let outcome = configure(&ctx, "7").await;

    assert!(!outcome.is_success());
    assert!(ctx.root.join("7.ERROR").is_dir());
    assert!(!ctx.root.join("7").exists());
}

#[tokio::test]
async fn configure_unknown_id_is_not_found() {
    let ctx = setup();
    let err = ctx
        .orch
        .configure(&JobId::new("8"), &creds())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
