// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::runner::RunError;

/// Default timeout for synchronous tool queries (list/show).
pub const SYNC_QUERY_TIMEOUT: Duration = Duration::from_secs(120);

/// Arguments whose following value must never reach a log line.
const SECRET_FLAGS: &[&str] = &["--password"];

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`. A non-zero exit is
/// not an error here; callers inspect `Output::status`. The child process is
/// killed if the timeout elapses (via `kill_on_drop`).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, RunError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(RunError::Launch {
            command: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(RunError::TimedOut {
            command: description.to_string(),
            secs: timeout.as_secs(),
        }),
    }
}

/// Render a command line for logs and error messages, masking secrets.
pub fn describe_command(command: &str, args: &[String]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(command.to_string());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            parts.push("***".to_string());
            mask_next = false;
        } else {
            mask_next = SECRET_FLAGS.contains(&arg.as_str());
            parts.push(arg.clone());
        }
    }
    parts.join(" ")
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
