// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn delete_locates_error_directory() {
    let ctx = setup();
    let failed = job_dir(&ctx, "7.ERROR");
    ctx.runner
        .push_script(FakeScript::succeeding().stdout("deleting"));

    let accepted = ctx.orch.delete(&JobId::new("7"), &creds()).await.unwrap();
    assert_eq!(accepted.job_name, "7");
    let outcome = accepted.completion.await.unwrap();

    assert_eq!(
        outcome,
        JobOutcome::Completed {
            id: JobId::new("7"),
            path: None,
        }
    );
    assert!(!failed.exists());
    assert_eq!(
        async_calls(&ctx.runner)[0].args,
        strings(&[
            "delete",
            "7",
            "--user",
            "oneadmin",
            "--password",
            "secret",
            "--batch",
            "--debug",
            "--force",
        ])
    );
}

#[tokio::test]
async fn delete_removes_both_committed_and_error_variants() {
    let ctx = setup();
    let committed = job_dir(&ctx, "7");
    let failed = job_dir(&ctx, "7.ERROR");

    ctx.orch
        .delete(&JobId::new("7"), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    assert!(!committed.exists());
    assert!(!failed.exists());
}

#[tokio::test]
async fn delete_finds_running_job_through_pending_index() {
    let ctx = setup();
    let staging = job_dir(&ctx, "tmp/oneadmin/tmp-9");
    ctx.orch
        .pending()
        .register(&TempName::new("tmp-9"), &JobId::new("9"))
        .unwrap();

    let outcome = ctx
        .orch
        .delete(&JobId::new("9"), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert!(!staging.exists());
    assert_eq!(ctx.orch.pending().resolve(&JobId::new("9")), None);
}

#[tokio::test]
async fn failed_delete_marks_directory() {
    let ctx = setup();
    let committed = job_dir(&ctx, "7");
    ctx.runner
        .push_script(FakeScript::failing().stderr("host busy"));

    let outcome = ctx
        .orch
        .delete(&JobId::new("7"), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    let failed = ctx.root.join("7.ERROR");
    assert!(matches!(outcome, JobOutcome::Failed { path: Some(ref p), .. } if *p == failed));
    assert!(!committed.exists());
    assert_eq!(log_data(&failed), strings(&["host busy"]));
}

#[tokio::test]
async fn failed_delete_of_error_directory_keeps_single_suffix() {
    let ctx = setup();
    let failed = job_dir(&ctx, "7.ERROR");
    ctx.runner.push_script(FakeScript::failing());

    ctx.orch
        .delete(&JobId::new("7"), &creds())
        .await
        .unwrap()
        .completion
        .await
        .unwrap();

    assert!(failed.is_dir());
    assert!(!ctx.root.join("7.ERROR.ERROR").exists());
}

#[tokio::test]
async fn delete_of_unknown_id_is_not_found() {
    let ctx = setup();
    let err = ctx
        .orch
        .delete(&JobId::new("404"), &creds())
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::NotFound(ref id) if id == "404"));
    assert!(ctx.runner.calls().is_empty());
}

#[tokio::test]
async fn delete_launch_failure_leaves_directory() {
    let ctx = setup();
    let committed = job_dir(&ctx, "7");
    ctx.runner.push_script(FakeScript::launch_failure());

    let err = ctx.orch.delete(&JobId::new("7"), &creds()).await.unwrap_err();

    assert!(matches!(err, EngineError::Launch(_)));
    assert!(committed.is_dir());
}
