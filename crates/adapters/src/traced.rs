// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced runner wrapper for consistent observability

use crate::runner::{ProcessRunner, ProcessStream, RunError, SyncOutput};
use crate::subprocess::describe_command;
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any ProcessRunner
#[derive(Clone)]
pub struct TracedRunner<R> {
    inner: R,
}

impl<R> TracedRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: ProcessRunner> ProcessRunner for TracedRunner<R> {
    async fn run_sync(&self, command: &str, args: &[String]) -> Result<SyncOutput, RunError> {
        let description = describe_command(command, args);
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.run_sync(command, args).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(out) => tracing::info!(
                    success = out.success,
                    output_len = out.output.len(),
                    elapsed_ms,
                    "finished"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "run failed"),
            }
            result
        }
        .instrument(tracing::info_span!("process.run_sync", cmd = %description))
        .await
    }

    async fn run_async(&self, command: &str, args: &[String]) -> Result<ProcessStream, RunError> {
        let description = describe_command(command, args);
        let result = self.inner.run_async(command, args).await;
        tracing::info_span!("process.run_async", cmd = %description).in_scope(|| match &result {
            Ok(_) => tracing::info!("spawned"),
            Err(e) => tracing::error!(error = %e, "launch failed"),
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
