// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod auth;
pub mod job;
pub mod query;

use prov_engine::EngineError;

use crate::exit_error::{self, ExitError};

/// Give an unknown job id its own exit code.
pub(crate) fn not_found_exit(e: EngineError) -> anyhow::Error {
    match e {
        EngineError::NotFound(id) => {
            ExitError::new(exit_error::NOT_FOUND, format!("provision not found: {id}")).into()
        }
        other => other.into(),
    }
}
