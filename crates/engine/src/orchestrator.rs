// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provisioning orchestrator.
//!
//! Entry point for every job-facing operation. Streaming commands
//! (`create`, `delete`, `configure`) are accepted immediately and driven to
//! completion by a spawned [`JobDriver`]; queries run synchronously.

use prov_adapters::ProcessRunner;
use prov_core::{
    CommandId, Credentials, IdGen, JobId, LogLine, ProvisionCommand, TempName, UuidIdGen,
    ERROR_SUFFIX,
};
use prov_storage::{
    list_defaults, read_all, DefaultTemplate, JobDirectoryStore, LogError, PendingJobIndex,
    RenameMode, StageFile, LOG_FILE_NAME,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::driver::{DriverDeps, DriverTarget, JobDriver, JobOutcome};
use crate::error::EngineError;
use crate::event_bus::{BusError, EventBus, Subscription};

/// Request file written into every new job directory.
pub const REQUEST_FILE_NAME: &str = "provision.yaml";

/// A streaming command that has been started.
#[derive(Debug)]
pub struct Accepted {
    /// Staging name for `create`, permanent id otherwise
    pub job_name: String,
    pub command_id: CommandId,
    /// Bus topic the job's lines are published on
    pub topic: &'static str,
    /// Resolves when the tool exits and bookkeeping is done
    pub completion: JoinHandle<JobOutcome>,
}

pub struct ProvisionOrchestrator<R, G = UuidIdGen> {
    runner: R,
    ids: G,
    tool: String,
    templates_dir: PathBuf,
    deps: DriverDeps,
}

impl<R: ProcessRunner> ProvisionOrchestrator<R, UuidIdGen> {
    pub fn new(runner: R, config: &EngineConfig) -> Result<Self, EngineError> {
        Self::with_id_gen(runner, UuidIdGen, config)
    }
}

impl<R, G> ProvisionOrchestrator<R, G>
where
    R: ProcessRunner,
    G: IdGen,
{
    /// Open the job tree under `config.provision_root()`.
    pub fn with_id_gen(runner: R, ids: G, config: &EngineConfig) -> Result<Self, EngineError> {
        let root = config.provision_root();
        let dirs = Arc::new(JobDirectoryStore::open(&root)?);
        let pending = Arc::new(PendingJobIndex::new(&root, config.lock_policy()));
        Ok(Self {
            runner,
            ids,
            tool: config.tool.clone(),
            templates_dir: config.templates_dir.clone(),
            deps: DriverDeps {
                bus: EventBus::new(config.event_capacity),
                dirs,
                pending,
            },
        })
    }

    pub fn bus(&self) -> &EventBus {
        &self.deps.bus
    }

    pub fn directories(&self) -> &JobDirectoryStore {
        &self.deps.dirs
    }

    pub fn pending(&self) -> &PendingJobIndex {
        &self.deps.pending
    }

    /// Subscribe to the output of one streaming command.
    pub fn subscribe(&self, command: ProvisionCommand) -> Result<Subscription, BusError> {
        if !command.is_streaming() {
            return Err(BusError::NotStreaming(command.to_string()));
        }
        self.deps.bus.subscribe(command.as_str())
    }

    /// Stage `request` and start `create` against it.
    pub async fn create(
        &self,
        request: &serde_json::Value,
        creds: &Credentials,
    ) -> Result<Accepted, EngineError> {
        let rendered = serde_yaml::to_string(request)?;
        let files = [
            StageFile::new("provision", "yaml", rendered),
            StageFile::new("stdouterr", "log", ""),
        ];
        let dirs = &self.deps.dirs;
        let staged = dirs.create_staging(
            &dirs.staging_parent(&creds.user)?,
            Some(TempName::new(self.ids.next())),
            &files,
        )?;

        let Some(config_path) = staged.file(REQUEST_FILE_NAME) else {
            dirs.remove(&staged.path);
            return Err(EngineError::Staging(format!(
                "request file missing in {}",
                staged.path.display()
            )));
        };

        let mut args = vec![
            ProvisionCommand::Create.to_string(),
            config_path.display().to_string(),
        ];
        args.extend(creds.to_args());
        args.extend(flags(ProvisionCommand::Create));

        tracing::info!(job = %staged.name, user = %creds.user, "create accepted");
        self.launch(
            ProvisionCommand::Create,
            DriverTarget::Create {
                temp: staged.name.clone(),
            },
            staged.path,
            args,
        )
        .await
    }

    /// Start `delete` for a job located by id.
    pub async fn delete(&self, id: &JobId, creds: &Credentials) -> Result<Accepted, EngineError> {
        self.run_on_existing(ProvisionCommand::Delete, id, creds)
            .await
    }

    /// Start `configure` for a job located by id.
    pub async fn configure(
        &self,
        id: &JobId,
        creds: &Credentials,
    ) -> Result<Accepted, EngineError> {
        self.run_on_existing(ProvisionCommand::Configure, id, creds)
            .await
    }

    /// Every recorded output line of a job.
    pub fn get_log(&self, id: &JobId) -> Result<Vec<LogLine>, EngineError> {
        let dir = self
            .locate(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        read_all(&dir.join(LOG_FILE_NAME)).map_err(|e| match e {
            LogError::NotFound(_) => EngineError::NotFound(id.to_string()),
            other => EngineError::Log(other),
        })
    }

    /// All provisions known to the tool.
    pub async fn list(&self, creds: &Credentials) -> Result<serde_json::Value, EngineError> {
        let mut args = vec![ProvisionCommand::List.to_string()];
        args.extend(creds.to_args());
        args.extend(flags(ProvisionCommand::List));
        self.query(ProvisionCommand::List, &args).await
    }

    /// The tool's view of one provision.
    pub async fn show(
        &self,
        id: &JobId,
        creds: &Credentials,
    ) -> Result<serde_json::Value, EngineError> {
        let mut args = vec![ProvisionCommand::Show.to_string(), id.to_string()];
        args.extend(creds.to_args());
        args.extend(flags(ProvisionCommand::Show));
        self.query(ProvisionCommand::Show, &args).await
    }

    /// Default template sets under `templates_root`, or the configured root.
    pub fn list_defaults(
        &self,
        templates_root: Option<&Path>,
    ) -> Result<BTreeMap<String, DefaultTemplate>, EngineError> {
        let root = templates_root.unwrap_or(self.templates_dir.as_path());
        Ok(list_defaults(root)?)
    }

    /// Find a job directory by id, error mark, or pending staging name.
    pub fn locate(&self, id: &JobId) -> Option<PathBuf> {
        let dirs = &self.deps.dirs;
        dirs.find_by_name(id.as_str())
            .or_else(|| dirs.find_by_name(&id.error_dir_name()))
            .or_else(|| {
                let temp = self.deps.pending.resolve(id)?;
                dirs.find_by_name(temp.as_str())
            })
    }

    async fn run_on_existing(
        &self,
        command: ProvisionCommand,
        id: &JobId,
        creds: &Credentials,
    ) -> Result<Accepted, EngineError> {
        let dir = self
            .locate(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;

        let mut args = vec![command.to_string(), id.to_string()];
        args.extend(creds.to_args());
        args.extend(flags(command));

        tracing::info!(job = %id, %command, dir = %dir.display(), "command accepted");
        self.launch(command, DriverTarget::Existing { id: id.clone() }, dir, args)
            .await
    }

    async fn launch(
        &self,
        command: ProvisionCommand,
        target: DriverTarget,
        dir: PathBuf,
        args: Vec<String>,
    ) -> Result<Accepted, EngineError> {
        let job_name = match &target {
            DriverTarget::Create { temp } => temp.to_string(),
            DriverTarget::Existing { id } => id.to_string(),
        };

        let stream = match self.runner.run_async(&self.tool, &args).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(job = %job_name, %command, error = %e, "failed to launch tool");
                if matches!(target, DriverTarget::Create { .. }) {
                    self.mark_failed(&dir);
                }
                return Err(EngineError::Launch(e));
            }
        };

        let command_id = CommandId::new(UuidIdGen.next());
        let driver = JobDriver::new(
            self.deps.clone(),
            command,
            command_id.clone(),
            target,
            dir,
        );
        Ok(Accepted {
            job_name,
            command_id,
            topic: command.as_str(),
            completion: tokio::spawn(driver.run(stream)),
        })
    }

    async fn query(
        &self,
        command: ProvisionCommand,
        args: &[String],
    ) -> Result<serde_json::Value, EngineError> {
        let out = self.runner.run_sync(&self.tool, args).await?;
        if !out.success {
            return Err(EngineError::ExitFailure {
                message: format!("{command} failed"),
                output: out.output,
            });
        }
        serde_json::from_str(&out.output).map_err(|e| EngineError::ExitFailure {
            message: format!("{command} returned invalid JSON: {e}"),
            output: out.output,
        })
    }

    fn mark_failed(&self, dir: &Path) {
        if let Err(e) = self.deps.dirs.rename(dir, ERROR_SUFFIX, RenameMode::Append) {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to mark job failed");
        }
    }
}

fn flags(command: ProvisionCommand) -> impl Iterator<Item = String> {
    command.trailing_flags().iter().map(|f| f.to_string())
}

#[cfg(test)]
#[path = "orchestrator_tests/mod.rs"]
mod tests;
