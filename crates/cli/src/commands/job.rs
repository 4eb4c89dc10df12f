// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `prov create|delete|configure`: start a job and wait for it.

use anyhow::{Context, Result};
use clap::Args;
use prov_adapters::ProcessRunner;
use prov_core::{Credentials, JobId, ProvisionCommand};
use prov_engine::{Accepted, BusEvent, JobOutcome, ProvisionOrchestrator, Subscription};
use std::path::{Path, PathBuf};

use super::not_found_exit;
use crate::exit_error::{self, ExitError};
use crate::output::{print_json, print_line, OutcomeReport, OutputFormat};

#[derive(Args)]
pub struct CreateArgs {
    /// Provision request (YAML or JSON)
    pub file: PathBuf,

    /// Print the tool's output while it runs
    #[arg(long, short)]
    pub follow: bool,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Provision id
    pub id: String,

    /// Print the tool's output while it runs
    #[arg(long, short)]
    pub follow: bool,
}

pub async fn create<R: ProcessRunner>(
    orch: &ProvisionOrchestrator<R>,
    args: CreateArgs,
    creds: &Credentials,
    format: OutputFormat,
) -> Result<()> {
    let request = read_request(&args.file)?;
    let follow = subscribe(orch, ProvisionCommand::Create, args.follow)?;
    let accepted = orch.create(&request, creds).await?;
    wait(ProvisionCommand::Create, accepted, follow, format).await
}

pub async fn delete<R: ProcessRunner>(
    orch: &ProvisionOrchestrator<R>,
    args: TargetArgs,
    creds: &Credentials,
    format: OutputFormat,
) -> Result<()> {
    let follow = subscribe(orch, ProvisionCommand::Delete, args.follow)?;
    let accepted = orch
        .delete(&JobId::new(args.id), creds)
        .await
        .map_err(not_found_exit)?;
    wait(ProvisionCommand::Delete, accepted, follow, format).await
}

pub async fn configure<R: ProcessRunner>(
    orch: &ProvisionOrchestrator<R>,
    args: TargetArgs,
    creds: &Credentials,
    format: OutputFormat,
) -> Result<()> {
    let follow = subscribe(orch, ProvisionCommand::Configure, args.follow)?;
    let accepted = orch
        .configure(&JobId::new(args.id), creds)
        .await
        .map_err(not_found_exit)?;
    wait(ProvisionCommand::Configure, accepted, follow, format).await
}

/// Parse a request file. YAML is a superset of JSON, so both are accepted.
pub fn read_request(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let request: serde_json::Value = serde_yaml::from_str(&content)
        .with_context(|| format!("invalid request in {}", path.display()))?;
    if !request.is_object() {
        anyhow::bail!("request in {} must be a mapping", path.display());
    }
    Ok(request)
}

fn subscribe<R: ProcessRunner>(
    orch: &ProvisionOrchestrator<R>,
    command: ProvisionCommand,
    follow: bool,
) -> Result<Option<Subscription>> {
    if !follow {
        return Ok(None);
    }
    Ok(Some(orch.subscribe(command)?))
}

/// Stream lines until the job finishes, then report its outcome.
async fn wait(
    command: ProvisionCommand,
    accepted: Accepted,
    follow: Option<Subscription>,
    format: OutputFormat,
) -> Result<()> {
    let Accepted {
        job_name,
        command_id,
        completion,
        ..
    } = accepted;
    tracing::debug!(job = %job_name, %command, %command_id, "waiting for job");

    if let Some(mut sub) = follow {
        while let Some(event) = sub.recv().await {
            match event {
                BusEvent::Line(line) if line.command_id == command_id => {
                    print_line(&line, format)?;
                }
                BusEvent::Finished { command_id: done, .. } if done == command_id => break,
                _ => {}
            }
        }
    }

    let outcome = completion
        .await
        .with_context(|| format!("{command} of {job_name} was interrupted"))?;
    let report = OutcomeReport::new(command, command_id, &outcome);
    match format {
        OutputFormat::Text if report.success => println!("{}", report.summary()),
        OutputFormat::Text => {}
        OutputFormat::Json => print_json(&report)?,
    }

    match outcome {
        JobOutcome::Failed { .. } => {
            Err(ExitError::new(exit_error::JOB_FAILED, report.summary()).into())
        }
        JobOutcome::Stranded { path, .. } => Err(ExitError::new(
            exit_error::STRANDED,
            format!("{} (left in {})", report.summary(), path.display()),
        )
        .into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
