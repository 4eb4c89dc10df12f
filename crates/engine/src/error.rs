// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the orchestrator

use prov_adapters::RunError;
use prov_storage::{DirError, LogError, PendingError, TemplateError};
use thiserror::Error;

/// Errors returned by orchestrator operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// The tool could not be started
    #[error(transparent)]
    Launch(#[from] RunError),
    /// The tool ran and failed, or its output could not be parsed
    #[error("{message}")]
    ExitFailure { message: String, output: String },
    #[error("pending index is busy: {0}")]
    LockContention(#[source] PendingError),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("staging failed: {0}")]
    Staging(String),
    #[error(transparent)]
    Dir(#[from] DirError),
    #[error(transparent)]
    Pending(PendingError),
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Templates(#[from] TemplateError),
    #[error("failed to render request: {0}")]
    Render(#[from] serde_yaml::Error),
}

impl From<PendingError> for EngineError {
    fn from(e: PendingError) -> Self {
        match e {
            PendingError::LockContention { .. } => EngineError::LockContention(e),
            other => EngineError::Pending(other),
        }
    }
}

impl EngineError {
    /// Raw tool output attached to the failure, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            EngineError::ExitFailure { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }
}
