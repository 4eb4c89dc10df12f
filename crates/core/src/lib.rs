// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! prov-core: shared types for the provisioning job engine

pub mod announce;
pub mod credentials;
pub mod id;
pub mod job;
pub mod log_line;

pub use announce::{parse_announced_id, ANNOUNCE_PATTERN_VERSION};
pub use credentials::Credentials;
pub use id::{CommandId, IdGen, JobId, SequentialIdGen, TempName, UuidIdGen};
pub use job::{JobState, ProvisionCommand, ERROR_SUFFIX};
pub use log_line::LogLine;
