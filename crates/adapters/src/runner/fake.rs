// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process runner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProcessEvent, ProcessRunner, ProcessStream, RunError, SyncOutput};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// How a recorded call was launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Sync,
    Async,
}

/// Recorded runner call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCall {
    pub command: String,
    pub args: Vec<String>,
    pub mode: RunMode,
}

/// Scripted behavior for one asynchronous run
#[derive(Debug, Clone, Default)]
pub struct FakeScript {
    lines: Vec<ProcessEvent>,
    success: bool,
    launch_failure: bool,
    hold_close: Option<Arc<Notify>>,
}

impl FakeScript {
    /// Exits 0 after emitting its lines
    pub fn succeeding() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Exits non-zero after emitting its lines
    pub fn failing() -> Self {
        Self::default()
    }

    /// Never starts
    pub fn launch_failure() -> Self {
        Self {
            launch_failure: true,
            ..Self::default()
        }
    }

    pub fn stdout(mut self, line: impl Into<String>) -> Self {
        self.lines.push(ProcessEvent::Stdout(line.into()));
        self
    }

    pub fn stderr(mut self, line: impl Into<String>) -> Self {
        self.lines.push(ProcessEvent::Stderr(line.into()));
        self
    }

    /// Emit all lines, then wait for `gate` before closing.
    pub fn hold_close(mut self, gate: Arc<Notify>) -> Self {
        self.hold_close = Some(gate);
        self
    }
}

enum SyncScript {
    Output(SyncOutput),
    LaunchFailure,
}

#[derive(Default)]
struct FakeRunnerState {
    async_scripts: VecDeque<FakeScript>,
    sync_scripts: VecDeque<SyncScript>,
    calls: Vec<RunCall>,
}

/// Fake process runner for testing.
///
/// Scripts are consumed in FIFO order. With no script queued, async runs
/// succeed silently and sync runs succeed with empty output.
#[derive(Clone, Default)]
pub struct FakeProcessRunner {
    inner: Arc<Mutex<FakeRunnerState>>,
}

impl FakeProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the behavior of the next `run_async`
    pub fn push_script(&self, script: FakeScript) {
        self.inner.lock().async_scripts.push_back(script);
    }

    /// Queue the result of the next `run_sync`
    pub fn push_sync(&self, output: SyncOutput) {
        self.inner
            .lock()
            .sync_scripts
            .push_back(SyncScript::Output(output));
    }

    /// Make the next `run_sync` fail to launch
    pub fn push_sync_launch_failure(&self) {
        self.inner
            .lock()
            .sync_scripts
            .push_back(SyncScript::LaunchFailure);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RunCall> {
        self.inner.lock().calls.clone()
    }

    fn record(&self, command: &str, args: &[String], mode: RunMode) {
        self.inner.lock().calls.push(RunCall {
            command: command.to_string(),
            args: args.to_vec(),
            mode,
        });
    }
}

fn launch_error(command: &str) -> RunError {
    RunError::Launch {
        command: command.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "fake launch failure"),
    }
}

#[async_trait]
impl ProcessRunner for FakeProcessRunner {
    async fn run_sync(&self, command: &str, args: &[String]) -> Result<SyncOutput, RunError> {
        self.record(command, args, RunMode::Sync);
        let script = self.inner.lock().sync_scripts.pop_front();
        match script {
            Some(SyncScript::Output(output)) => Ok(output),
            Some(SyncScript::LaunchFailure) => Err(launch_error(command)),
            None => Ok(SyncOutput::success("")),
        }
    }

    async fn run_async(&self, command: &str, args: &[String]) -> Result<ProcessStream, RunError> {
        self.record(command, args, RunMode::Async);
        let script = self
            .inner
            .lock()
            .async_scripts
            .pop_front()
            .unwrap_or_else(FakeScript::succeeding);
        if script.launch_failure {
            return Err(launch_error(command));
        }

        let (tx, rx) = mpsc::channel(script.lines.len() + 1);
        tokio::spawn(async move {
            let mut last_line = None;
            for event in script.lines {
                if let ProcessEvent::Stdout(line) | ProcessEvent::Stderr(line) = &event {
                    last_line = Some(line.clone());
                }
                let _ = tx.send(event).await;
            }
            if let Some(gate) = script.hold_close {
                gate.notified().await;
            }
            let _ = tx
                .send(ProcessEvent::Closed {
                    success: script.success,
                    last_line,
                })
                .await;
        });
        Ok(ProcessStream::new(rx))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
