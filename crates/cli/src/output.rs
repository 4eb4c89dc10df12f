// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::ValueEnum;
use prov_core::{CommandId, LogLine, ProvisionCommand};
use prov_engine::JobOutcome;
use serde::Serialize;
use std::path::PathBuf;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Machine-readable summary of a finished job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeReport {
    pub job: String,
    pub command: ProvisionCommand,
    #[serde(rename = "commandId")]
    pub command_id: CommandId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutcomeReport {
    pub fn new(command: ProvisionCommand, command_id: CommandId, outcome: &JobOutcome) -> Self {
        let (job, path, error) = match outcome {
            JobOutcome::Committed { id, path } => (id.to_string(), Some(path.clone()), None),
            JobOutcome::Completed { id, path } => (id.to_string(), path.clone(), None),
            JobOutcome::Failed {
                job,
                path,
                last_line,
            } => (
                job.clone(),
                path.clone(),
                Some(last_line.clone().unwrap_or_else(|| "tool failed".to_string())),
            ),
            JobOutcome::Stranded { job, path, reason } => {
                (job.clone(), Some(path.clone()), Some(reason.clone()))
            }
        };
        Self {
            job,
            command,
            command_id,
            success: outcome.is_success(),
            path,
            error,
        }
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match (&self.error, self.command) {
            (None, ProvisionCommand::Create) => format!("Provision {} created", self.job),
            (None, ProvisionCommand::Delete) => format!("Provision {} deleted", self.job),
            (None, command) => format!("{} of {} completed", command, self.job),
            (Some(error), command) => format!("{} of {} failed: {}", command, self.job, error),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print one streamed line: raw text, or one compact JSON object per line.
pub fn print_line(line: &LogLine, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", line.data),
        OutputFormat::Json => println!("{}", serde_json::to_string(line)?),
    }
    Ok(())
}
