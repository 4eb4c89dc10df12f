// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only commands: `log`, `list`, `show`, `status`, `defaults`.

use anyhow::Result;
use prov_adapters::ProcessRunner;
use prov_core::{Credentials, JobId, JobState};
use prov_engine::ProvisionOrchestrator;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::not_found_exit;
use crate::exit_error::{self, ExitError};
use crate::output::{print_json, print_line, OutputFormat};

pub fn log<R: ProcessRunner>(
    orch: &ProvisionOrchestrator<R>,
    id: &str,
    format: OutputFormat,
) -> Result<()> {
    let lines = orch.get_log(&JobId::new(id)).map_err(not_found_exit)?;
    match format {
        OutputFormat::Text => {
            for line in &lines {
                print_line(line, format)?;
            }
        }
        OutputFormat::Json => print_json(&lines)?,
    }
    Ok(())
}

/// The tool's JSON is printed as-is in both formats.
pub async fn list<R: ProcessRunner>(
    orch: &ProvisionOrchestrator<R>,
    creds: &Credentials,
) -> Result<()> {
    print_json(&orch.list(creds).await?)
}

pub async fn show<R: ProcessRunner>(
    orch: &ProvisionOrchestrator<R>,
    id: &str,
    creds: &Credentials,
) -> Result<()> {
    print_json(&orch.show(&JobId::new(id), creds).await?)
}

#[derive(Debug, PartialEq, Serialize)]
pub struct JobStatus {
    pub id: String,
    pub state: JobState,
    pub path: PathBuf,
}

impl JobStatus {
    /// State as encoded by the directory name.
    pub fn from_path(id: &str, path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: id.to_string(),
            state: JobState::from_dir_name(&name),
            path,
        }
    }
}

pub fn status<R: ProcessRunner>(
    orch: &ProvisionOrchestrator<R>,
    id: &str,
    format: OutputFormat,
) -> Result<()> {
    let Some(path) = orch.locate(&JobId::new(id)) else {
        return Err(
            ExitError::new(exit_error::NOT_FOUND, format!("provision not found: {id}")).into(),
        );
    };
    let status = JobStatus::from_path(id, path);
    match format {
        OutputFormat::Text => {
            println!("{}\t{}\t{}", status.id, status.state, status.path.display())
        }
        OutputFormat::Json => print_json(&status)?,
    }
    Ok(())
}

pub fn defaults<R: ProcessRunner>(
    orch: &ProvisionOrchestrator<R>,
    dir: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let templates = orch.list_defaults(dir)?;
    if format == OutputFormat::Json {
        return print_json(&templates);
    }
    if templates.is_empty() {
        println!("No default templates found");
    }
    for (name, template) in &templates {
        if template.description.is_empty() {
            println!("{name}");
        } else {
            println!("{name}: {}", template.description);
        }
        let providers: Vec<&str> = template.providers.keys().map(String::as_str).collect();
        if !providers.is_empty() {
            println!("  providers: {}", providers.join(", "));
        }
        println!("  provisions: {}", template.provisions.len());
    }
    Ok(())
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
