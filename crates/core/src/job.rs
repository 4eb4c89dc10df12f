// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state and provisioning subcommands

use serde::{Deserialize, Serialize};

/// Suffix appended to a job directory when its last command failed.
pub const ERROR_SUFFIX: &str = ".ERROR";

/// Lifecycle state of a job, derived from its directory name.
///
/// Not stored anywhere: the directory name is the single source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Staging directory, permanent id not yet committed
    Pending,
    /// Directory renamed to the permanent id
    Succeeded,
    /// Directory carries the `.ERROR` suffix
    Failed,
}

impl JobState {
    pub fn from_dir_name(name: &str) -> Self {
        if name.ends_with(ERROR_SUFFIX) {
            JobState::Failed
        } else if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            JobState::Succeeded
        } else {
            JobState::Pending
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Succeeded => write!(f, "succeeded"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// Subcommands of the external provisioning tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionCommand {
    Create,
    Delete,
    Configure,
    List,
    Show,
}

impl ProvisionCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionCommand::Create => "create",
            ProvisionCommand::Delete => "delete",
            ProvisionCommand::Configure => "configure",
            ProvisionCommand::List => "list",
            ProvisionCommand::Show => "show",
        }
    }

    /// Streaming commands run asynchronously and write a job log.
    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            ProvisionCommand::Create | ProvisionCommand::Delete | ProvisionCommand::Configure
        )
    }

    /// Trailing flags for non-interactive execution of this subcommand.
    pub fn trailing_flags(&self) -> &'static [&'static str] {
        match self {
            ProvisionCommand::Create => &["--batch", "--debug", "--fail_cleanup"],
            ProvisionCommand::Delete | ProvisionCommand::Configure => {
                &["--batch", "--debug", "--force"]
            }
            ProvisionCommand::List | ProvisionCommand::Show => &["--json"],
        }
    }
}

impl std::fmt::Display for ProvisionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
