// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Filesystem storage for provisioning jobs

pub mod job_dir;
pub mod job_log;
pub mod pending;
pub mod templates;

pub use job_dir::{
    sorted_entries, walk_dirs, DirError, JobDirectoryStore, RenameMode, StageFile, StagedDir,
};
pub use job_log::{read_all, JobLogWriter, LogError, LOG_FILE_NAME};
pub use pending::{IndexLock, LockPolicy, PendingError, PendingJobIndex, INDEX_FILE_NAME};
pub use templates::{list_defaults, DefaultTemplate, TemplateError};
