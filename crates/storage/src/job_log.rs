// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job output log.
//!
//! Each line of `stdouterr.log` is one JSON-encoded [`LogLine`]. A writer is
//! opened once per tool invocation and appends in emission order.

use prov_core::LogLine;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Log file name inside a job directory.
pub const LOG_FILE_NAME: &str = "stdouterr.log";

/// Errors from job log operations
#[derive(Debug, Error)]
pub enum LogError {
    #[error("no log at {}", .0.display())]
    NotFound(PathBuf),
    #[error("log I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode log line: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only writer for one command invocation.
pub struct JobLogWriter {
    path: PathBuf,
    file: File,
}

impl JobLogWriter {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one record and flush it.
    pub fn append(&mut self, line: &LogLine) -> Result<(), LogError> {
        let mut json = serde_json::to_string(line)?;
        json.push('\n');
        self.file
            .write_all(json.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|source| LogError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// Read every record in a log file, in append order.
///
/// Lines that do not parse are skipped with a warning.
pub fn read_all(path: &Path) -> Result<Vec<LogLine>, LogError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LogError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(LogError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut lines = Vec::new();
    for (lineno, raw) in content.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogLine>(raw) {
            Ok(line) => lines.push(line),
            Err(e) => tracing::warn!(
                path = %path.display(),
                line = lineno + 1,
                error = %e,
                "skipping corrupt log line"
            ),
        }
    }
    Ok(lines)
}

#[cfg(test)]
#[path = "job_log_tests.rs"]
mod tests;
