// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors that pick the process exit code.

use thiserror::Error;

/// Exit code for a job the tool reported as failed
pub const JOB_FAILED: i32 = 1;
/// Exit code when the job id is unknown
pub const NOT_FOUND: i32 = 3;
/// Exit code when the tool succeeded but the job could not be committed
pub const STRANDED: i32 = 4;

/// Terminates the CLI with `code`. An empty message prints nothing.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: String) -> Self {
        Self { code, message }
    }
}
