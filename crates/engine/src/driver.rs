// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation job driver.
//!
//! One driver task consumes one [`ProcessStream`]. It owns the job's log
//! writer and directory for the lifetime of the run, so bookkeeping for a
//! single job is strictly sequential.

use prov_adapters::{ProcessEvent, ProcessStream};
use prov_core::{
    parse_announced_id, CommandId, JobId, LogLine, ProvisionCommand, TempName, ERROR_SUFFIX,
};
use prov_storage::{
    DirError, JobDirectoryStore, JobLogWriter, PendingError, PendingJobIndex, RenameMode,
    LOG_FILE_NAME,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::event_bus::{BusEvent, EventBus};

/// Levels between a staging directory and the provisioning root
/// (`<root>/tmp/<user>/<name>`).
const STAGING_DEPTH: usize = 2;

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// `create` succeeded and the directory now lives at `<root>/<id>`
    Committed { id: JobId, path: PathBuf },
    /// `delete` or `configure` succeeded; `path` is gone after a delete
    Completed { id: JobId, path: Option<PathBuf> },
    /// The tool exited non-zero
    Failed {
        job: String,
        path: Option<PathBuf>,
        last_line: Option<String>,
    },
    /// The tool succeeded but the directory could not be committed
    Stranded {
        job: String,
        path: PathBuf,
        reason: String,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            JobOutcome::Committed { .. } | JobOutcome::Completed { .. }
        )
    }
}

/// Shared handles every driver needs.
#[derive(Clone)]
pub(crate) struct DriverDeps {
    pub bus: EventBus,
    pub dirs: Arc<JobDirectoryStore>,
    pub pending: Arc<PendingJobIndex>,
}

/// What the driver is working on.
pub(crate) enum DriverTarget {
    /// A staging directory created for this run
    Create { temp: TempName },
    /// An existing job directory located by id
    Existing { id: JobId },
}

pub(crate) struct JobDriver {
    deps: DriverDeps,
    command: ProvisionCommand,
    command_id: CommandId,
    target: DriverTarget,
    dir: PathBuf,
    writer: Option<JobLogWriter>,
    discovered: Option<JobId>,
    registered: bool,
}

impl JobDriver {
    pub fn new(
        deps: DriverDeps,
        command: ProvisionCommand,
        command_id: CommandId,
        target: DriverTarget,
        dir: PathBuf,
    ) -> Self {
        let writer = match JobLogWriter::open(dir.join(LOG_FILE_NAME)) {
            Ok(writer) => Some(writer),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "job log unavailable");
                None
            }
        };
        Self {
            deps,
            command,
            command_id,
            target,
            dir,
            writer,
            discovered: None,
            registered: false,
        }
    }

    /// Consume the stream to completion.
    pub async fn run(mut self, mut stream: ProcessStream) -> JobOutcome {
        while let Some(event) = stream.next().await {
            match event {
                ProcessEvent::Stdout(line) | ProcessEvent::Stderr(line) => {
                    self.on_line(line).await;
                }
                ProcessEvent::Closed { success, last_line } => {
                    return self.on_close(success, last_line).await;
                }
            }
        }
        tracing::warn!(job = %self.label(), "process stream ended without close");
        self.on_close(false, None).await
    }

    /// Log and publish one line, then scan it for the permanent id.
    async fn on_line(&mut self, line: String) {
        let record = LogLine::new(
            self.label(),
            line,
            self.command,
            self.command_id.clone(),
        );
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.append(&record) {
                tracing::warn!(job = %record.id, error = %e, "failed to append job log");
            }
        }
        let data = record.data.clone();
        self.deps
            .bus
            .publish(self.command.as_str(), BusEvent::Line(record));

        if matches!(self.target, DriverTarget::Create { .. }) {
            self.discover(&data).await;
        }
    }

    /// Register the announced id in the pending index, at most once.
    pub(crate) async fn discover(&mut self, line: &str) {
        let DriverTarget::Create { temp } = &self.target else {
            return;
        };
        let Some(id) = parse_announced_id(line) else {
            return;
        };
        match &self.discovered {
            Some(known) if *known != id => {
                tracing::warn!(job = %temp, known = %known, ignored = %id, "tool announced a second id");
                return;
            }
            Some(_) if self.registered => return,
            _ => {}
        }
        self.discovered = Some(id.clone());

        if self.deps.pending.resolve(&id).is_some() {
            self.registered = true;
            return;
        }

        let pending = Arc::clone(&self.deps.pending);
        let (temp, job) = (temp.clone(), id.clone());
        match blocking(move || pending.register(&temp, &job)).await {
            Ok(()) => {
                self.registered = true;
                tracing::info!(job = %id, command_id = %self.command_id, "permanent id discovered");
            }
            Err(e @ PendingError::LockContention { .. }) => {
                tracing::warn!(job = %id, error = %e, "pending index busy, registration skipped");
            }
            Err(e) => {
                tracing::warn!(job = %id, error = %e, "failed to register pending entry");
            }
        }
    }

    async fn on_close(mut self, success: bool, last_line: Option<String>) -> JobOutcome {
        // Flush and release the log before the directory moves
        self.writer = None;

        self.deps.bus.publish(
            self.command.as_str(),
            BusEvent::Finished {
                job: self.label(),
                command: self.command,
                command_id: self.command_id.clone(),
                success,
            },
        );

        let existing = match &self.target {
            DriverTarget::Existing { id } => Some(id.clone()),
            DriverTarget::Create { .. } => None,
        };
        let outcome = match (existing, success) {
            (_, false) => self.fail(last_line),
            (None, true) => self.commit(last_line.as_deref()).await,
            (Some(id), true) if self.command == ProvisionCommand::Delete => {
                self.finish_delete(id).await
            }
            (Some(id), true) => self.finish_configure(id),
        };

        match &outcome {
            JobOutcome::Committed { id, path } => {
                tracing::info!(job = %id, path = %path.display(), "job committed")
            }
            JobOutcome::Completed { id, .. } => {
                tracing::info!(job = %id, command = %self.command, "job completed")
            }
            JobOutcome::Failed { job, path, .. } => tracing::warn!(
                job = %job,
                command = %self.command,
                path = ?path,
                "job failed"
            ),
            JobOutcome::Stranded { job, reason, .. } => {
                tracing::error!(job = %job, reason = %reason, "job stranded")
            }
        }
        outcome
    }

    /// Rename the staging directory to its id and promote it.
    ///
    /// The first registered id wins; the final line is only consulted when
    /// nothing was discovered.
    async fn commit(&mut self, last_line: Option<&str>) -> JobOutcome {
        let Some(id) = self
            .discovered
            .clone()
            .or_else(|| last_line.and_then(parse_announced_id))
        else {
            return self.stranded("tool succeeded without announcing an id");
        };

        let (dirs, pending) = (Arc::clone(&self.deps.dirs), Arc::clone(&self.deps.pending));
        let (dir, job) = (self.dir.clone(), id.clone());
        let renamed = blocking(move || {
            pending.commit(&job, || dirs.rename(&dir, job.as_str(), RenameMode::Replace))
        })
        .await;
        let renamed = match renamed {
            Ok(path) => path,
            Err(e) => return self.stranded(&format!("commit of {id} failed: {e}")),
        };
        self.dir = renamed;

        match self.deps.dirs.move_up(&self.dir, STAGING_DEPTH) {
            Ok(path) => JobOutcome::Committed { id, path },
            Err(e) => {
                tracing::warn!(job = %id, error = %e, "failed to promote job directory");
                JobOutcome::Committed {
                    id,
                    path: self.dir.clone(),
                }
            }
        }
    }

    async fn finish_delete(&mut self, id: JobId) -> JobOutcome {
        let dirs = &self.deps.dirs;
        for name in [id.as_str().to_string(), id.error_dir_name()] {
            if let Some(path) = dirs.find_by_name(&name) {
                dirs.remove(&path);
            }
        }
        dirs.remove(&self.dir);

        let pending = Arc::clone(&self.deps.pending);
        let job = id.clone();
        if let Err(e) = blocking(move || pending.unregister(&job)).await {
            tracing::warn!(job = %id, error = %e, "failed to drop pending entry");
        }
        JobOutcome::Completed { id, path: None }
    }

    fn finish_configure(&mut self, id: JobId) -> JobOutcome {
        if is_error_dir(&self.dir) && self.deps.dirs.find_by_name(id.as_str()).is_none() {
            match self
                .deps
                .dirs
                .rename(&self.dir, id.as_str(), RenameMode::Replace)
            {
                Ok(path) => self.dir = path,
                Err(e) => tracing::warn!(job = %id, error = %e, "failed to clear error mark"),
            }
        }
        JobOutcome::Completed {
            id,
            path: Some(self.dir.clone()),
        }
    }

    /// Mark the directory failed, naming it by id first when one is known.
    fn fail(&mut self, last_line: Option<String>) -> JobOutcome {
        let job = self.label();
        if let (DriverTarget::Create { .. }, Some(id)) = (&self.target, self.discovered.as_ref()) {
            match self
                .deps
                .dirs
                .rename(&self.dir, id.as_str(), RenameMode::Replace)
            {
                Ok(path) => self.dir = path,
                Err(e) => tracing::warn!(job = %id, error = %e, "failed to name failed job"),
            }
        }

        let path = if is_error_dir(&self.dir) {
            Some(self.dir.clone())
        } else {
            match self
                .deps
                .dirs
                .rename(&self.dir, ERROR_SUFFIX, RenameMode::Append)
            {
                Ok(path) => Some(path),
                Err(DirError::AlreadyExists(existing)) => {
                    tracing::warn!(job = %job, path = %existing.display(), "error directory already exists");
                    Some(self.dir.clone())
                }
                Err(e) => {
                    tracing::warn!(job = %job, error = %e, "failed to mark job failed");
                    Some(self.dir.clone())
                }
            }
        };
        JobOutcome::Failed {
            job,
            path,
            last_line,
        }
    }

    fn stranded(&self, reason: &str) -> JobOutcome {
        JobOutcome::Stranded {
            job: self.label(),
            path: self.dir.clone(),
            reason: reason.to_string(),
        }
    }

    /// Permanent id when known, otherwise the staging name.
    fn label(&self) -> String {
        match (&self.target, &self.discovered) {
            (_, Some(id)) => id.to_string(),
            (DriverTarget::Create { temp }, None) => temp.to_string(),
            (DriverTarget::Existing { id }, None) => id.to_string(),
        }
    }
}

fn is_error_dir(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().ends_with(ERROR_SUFFIX))
}

/// Run a lock-taking index operation off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, PendingError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PendingError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PendingError::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
