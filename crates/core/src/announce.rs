// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permanent-id announcement emitted by the provisioning tool.
//!
//! On success the tool prints a line of the form `ID: <digits>` to stdout.
//! The pattern is a contract with the tool's output format: bump
//! [`ANNOUNCE_PATTERN_VERSION`] whenever the pattern changes.

use regex::Regex;
use std::sync::LazyLock;

use crate::id::JobId;

/// Version of the `ID: <digits>` announcement contract.
pub const ANNOUNCE_PATTERN_VERSION: u32 = 1;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static ANNOUNCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ID: (\d+)").expect("constant regex pattern is valid"));

/// Extract the permanent id from an output line, if it announces one.
///
/// Only matches at the start of the line; `ID:` appearing mid-line in
/// diagnostic text is ignored.
pub fn parse_announced_id(line: &str) -> Option<JobId> {
    ANNOUNCE_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| JobId::new(m.as_str()))
}

#[cfg(test)]
#[path = "announce_tests.rs"]
mod tests;
