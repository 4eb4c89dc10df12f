// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process runner: launches the provisioning tool.
//!
//! Two modes:
//! - `run_sync` waits for the child and returns its exit status and output.
//! - `run_async` returns immediately with a [`ProcessStream`] that yields each
//!   output line and exactly one final [`ProcessEvent::Closed`].

mod tokio_runner;

pub use tokio_runner::TokioRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessRunner, FakeScript, RunCall, RunMode};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from launching a process
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },
}

/// Result of a synchronous run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutput {
    /// True iff the exit code was 0
    pub success: bool,
    /// Stdout on success, stderr on failure
    pub output: String,
}

impl SyncOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Output of an asynchronous run, one event per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Stdout(String),
    Stderr(String),
    /// Sent exactly once, after all output lines.
    Closed {
        success: bool,
        last_line: Option<String>,
    },
}

/// Receiving end of an asynchronous run.
pub struct ProcessStream {
    rx: mpsc::Receiver<ProcessEvent>,
}

impl ProcessStream {
    pub fn new(rx: mpsc::Receiver<ProcessEvent>) -> Self {
        Self { rx }
    }

    /// Next event, or `None` once the run has closed and been drained.
    pub async fn next(&mut self) -> Option<ProcessEvent> {
        self.rx.recv().await
    }
}

/// Launches external commands.
#[async_trait]
pub trait ProcessRunner: Clone + Send + Sync + 'static {
    /// Run to completion and capture output.
    async fn run_sync(&self, command: &str, args: &[String]) -> Result<SyncOutput, RunError>;

    /// Spawn and stream output without waiting for exit.
    async fn run_async(&self, command: &str, args: &[String]) -> Result<ProcessStream, RunError>;
}
