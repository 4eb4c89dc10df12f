// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file name inside the state directory
pub const LOG_FILE_NAME: &str = "prov.log";

/// Install the global subscriber: always the log file, stderr too when
/// `verbose`. Keep the guard alive until exit so buffered lines flush.
pub fn setup_logging(state_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(state_dir)
        .with_context(|| format!("failed to create {}", state_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(state_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .with(verbose.then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    Ok(guard)
}

fn filter() -> EnvFilter {
    crate::env::log_filter()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
