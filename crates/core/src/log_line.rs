// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One line of tool output as recorded in a job log.

use serde::{Deserialize, Serialize};

use crate::id::CommandId;
use crate::job::ProvisionCommand;

/// A single output line, tagged with the job and invocation it belongs to.
///
/// Serialized as `{"id":…,"data":…,"command":…,"commandId":…}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Permanent id if known, otherwise the staging name
    pub id: String,
    /// Raw output line, without trailing newline
    pub data: String,
    pub command: ProvisionCommand,
    #[serde(rename = "commandId")]
    pub command_id: CommandId,
}

impl LogLine {
    pub fn new(
        id: impl Into<String>,
        data: impl Into<String>,
        command: ProvisionCommand,
        command_id: CommandId,
    ) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            command,
            command_id,
        }
    }
}

#[cfg(test)]
#[path = "log_line_tests.rs"]
mod tests;
