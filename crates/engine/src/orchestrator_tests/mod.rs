// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator tests

mod configure;
mod create;
mod delete;
mod queries;

use super::*;
use prov_adapters::{FakeProcessRunner, FakeScript, RunCall, RunMode};
use prov_core::SequentialIdGen;
use prov_storage::LockPolicy;
use tempfile::{tempdir, TempDir};

type TestOrchestrator = ProvisionOrchestrator<FakeProcessRunner, SequentialIdGen>;

/// Test context holding the orchestrator, fake runner, and job root.
struct TestContext {
    orch: TestOrchestrator,
    runner: FakeProcessRunner,
    /// `<provision_dir>/provision`
    root: PathBuf,
    _dir: TempDir,
}

fn setup() -> TestContext {
    setup_with(|_| {})
}

fn setup_with(tweak: impl FnOnce(&mut EngineConfig)) -> TestContext {
    let dir = tempdir().unwrap();
    let mut config = EngineConfig {
        provision_dir: dir.path().to_path_buf(),
        tool: "oneprovision".to_string(),
        templates_dir: dir.path().join("templates"),
        lock_timeout_ms: 1_000,
        lock_retry_ms: 5,
        ..EngineConfig::default()
    };
    tweak(&mut config);

    let runner = FakeProcessRunner::new();
    let orch = ProvisionOrchestrator::with_id_gen(
        runner.clone(),
        SequentialIdGen::new("tmp"),
        &config,
    )
    .unwrap();
    TestContext {
        orch,
        runner,
        root: config.provision_root(),
        _dir: dir,
    }
}

fn creds() -> Credentials {
    Credentials::new("oneadmin", "secret")
}

/// Create a job directory with an empty log, as a committed job has.
fn job_dir(ctx: &TestContext, rel: &str) -> PathBuf {
    let path = ctx.root.join(rel);
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join(LOG_FILE_NAME), "").unwrap();
    path
}

fn log_data(path: &Path) -> Vec<String> {
    read_all(&path.join(LOG_FILE_NAME))
        .unwrap()
        .into_iter()
        .map(|l| l.data)
        .collect()
}

fn async_calls(runner: &FakeProcessRunner) -> Vec<RunCall> {
    runner
        .calls()
        .into_iter()
        .filter(|c| c.mode == RunMode::Async)
        .collect()
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
