// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tokio-backed process runner

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use super::{ProcessEvent, ProcessRunner, ProcessStream, RunError, SyncOutput};
use crate::subprocess::{describe_command, run_with_timeout, SYNC_QUERY_TIMEOUT};

/// Buffered events per running process before readers wait on the consumer.
const EVENT_BUFFER: usize = 256;

/// Runs commands as real child processes.
#[derive(Clone)]
pub struct TokioRunner {
    sync_timeout: Duration,
}

impl Default for TokioRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioRunner {
    pub fn new() -> Self {
        Self {
            sync_timeout: SYNC_QUERY_TIMEOUT,
        }
    }

    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }
}

#[async_trait]
impl ProcessRunner for TokioRunner {
    async fn run_sync(&self, command: &str, args: &[String]) -> Result<SyncOutput, RunError> {
        let description = describe_command(command, args);
        let mut cmd = Command::new(command);
        cmd.args(args).stdin(Stdio::null());

        let output = run_with_timeout(cmd, self.sync_timeout, &description).await?;
        if output.status.success() {
            Ok(SyncOutput::success(
                String::from_utf8_lossy(&output.stdout).into_owned(),
            ))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::warn!(
                command = %description,
                exit_code = ?output.status.code(),
                stderr = %stderr.trim(),
                "command exited with non-zero status"
            );
            Ok(SyncOutput::failure(stderr))
        }
    }

    async fn run_async(&self, command: &str, args: &[String]) -> Result<ProcessStream, RunError> {
        let description = describe_command(command, args);
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Launch {
                command: description.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let last_line = Arc::new(Mutex::new(None));

        let stdout_task = child.stdout.take().map(|stdout| {
            tokio::spawn(pump_lines(
                stdout,
                tx.clone(),
                Arc::clone(&last_line),
                ProcessEvent::Stdout,
            ))
        });
        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(pump_lines(
                stderr,
                tx.clone(),
                Arc::clone(&last_line),
                ProcessEvent::Stderr,
            ))
        });

        tokio::spawn(async move {
            let status = child.wait().await;

            // Drain both pipes before announcing the close
            for task in [stdout_task, stderr_task].into_iter().flatten() {
                let _ = task.await;
            }

            let success = match status {
                Ok(status) => {
                    tracing::debug!(
                        command = %description,
                        exit_code = ?status.code(),
                        "process exited"
                    );
                    status.success()
                }
                Err(e) => {
                    tracing::error!(command = %description, error = %e, "failed to wait for process");
                    false
                }
            };

            let last_line = last_line.lock().take();
            let _ = tx.send(ProcessEvent::Closed { success, last_line }).await;
        });

        Ok(ProcessStream::new(rx))
    }
}

/// Forward every line of `reader` as an event, remembering the latest one.
///
/// Keeps reading after the receiver is gone so the child never blocks on a
/// full pipe.
async fn pump_lines<R>(
    reader: R,
    tx: mpsc::Sender<ProcessEvent>,
    last_line: Arc<Mutex<Option<String>>>,
    wrap: fn(String) -> ProcessEvent,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut receiver_alive = true;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\n', '\r'])
                    .to_string();
                *last_line.lock() = Some(line.clone());
                if receiver_alive && tx.send(wrap(line)).await.is_err() {
                    receiver_alive = false;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read process output");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "tokio_runner_tests.rs"]
mod tests;
