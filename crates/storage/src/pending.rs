// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending job index.
//!
//! Maps permanent ids to the temporary names of jobs whose staging
//! directory has not been committed yet. Stored as a YAML mapping in
//! `<root>/provision-mapping.yml` and shared by every running job.
//!
//! Writers take an exclusive advisory lock on `provision-mapping.yml.lock`
//! through [`IndexLock`]; readers never lock. The lock file itself is never
//! deleted.

use fs2::FileExt;
use prov_core::{JobId, TempName};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::job_dir::DirError;

/// File name of the index inside the provisioning root.
pub const INDEX_FILE_NAME: &str = "provision-mapping.yml";

/// Errors from pending index operations
#[derive(Debug, Error)]
pub enum PendingError {
    #[error("pending index is locked by another writer (gave up after {waited_ms}ms)")]
    LockContention { waited_ms: u64 },
    #[error("pending index I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode pending index: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Dir(#[from] DirError),
}

/// How long writers wait for the index lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    /// Total time to keep retrying; zero means a single attempt
    pub timeout: Duration,
    /// Pause between attempts
    pub retry: Duration,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retry: Duration::from_millis(50),
        }
    }
}

/// Exclusive hold on the index. Released on drop.
#[derive(Debug)]
pub struct IndexLock {
    file: File,
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(error = %e, "failed to release pending index lock");
        }
    }
}

/// The shared id → temporary name index.
#[derive(Debug, Clone)]
pub struct PendingJobIndex {
    path: PathBuf,
    lock_path: PathBuf,
    policy: LockPolicy,
}

impl PendingJobIndex {
    pub fn new(root: &Path, policy: LockPolicy) -> Self {
        let path = root.join(INDEX_FILE_NAME);
        let lock_path = root.join(format!("{INDEX_FILE_NAME}.lock"));
        Self {
            path,
            lock_path,
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the writer lock, retrying until the policy's timeout.
    pub fn lock(&self) -> Result<IndexLock, PendingError> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;

        let start = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(IndexLock { file }),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    let waited = start.elapsed();
                    if waited >= self.policy.timeout {
                        return Err(PendingError::LockContention {
                            waited_ms: waited.as_millis() as u64,
                        });
                    }
                    std::thread::sleep(self.policy.retry.min(self.policy.timeout - waited));
                }
                Err(e) => return Err(PendingError::Io(e)),
            }
        }
    }

    /// Record that `temp_name` will become `id`.
    pub fn register(&self, temp_name: &TempName, id: &JobId) -> Result<(), PendingError> {
        let _lock = self.lock()?;
        let mut map = self.read();
        map.insert(id.clone(), temp_name.clone());
        self.write(&map)?;
        tracing::debug!(job = %id, temp = %temp_name, "pending entry registered");
        Ok(())
    }

    /// Look up the temporary name for `id` without locking.
    ///
    /// A concurrent writer may make this miss; callers fall back to a
    /// directory search.
    pub fn resolve(&self, id: &JobId) -> Option<TempName> {
        self.read().remove(id)
    }

    /// Drop the entry for `id`. Returns whether one existed.
    pub fn unregister(&self, id: &JobId) -> Result<bool, PendingError> {
        let _lock = self.lock()?;
        let mut map = self.read();
        let removed = map.remove(id).is_some();
        if removed {
            self.write(&map)?;
            tracing::debug!(job = %id, "pending entry removed");
        }
        Ok(removed)
    }

    /// Run `rename` and remove the entry for `id` under one lock hold.
    ///
    /// The entry stays when `rename` fails.
    pub fn commit<T>(
        &self,
        id: &JobId,
        rename: impl FnOnce() -> Result<T, DirError>,
    ) -> Result<T, PendingError> {
        let _lock = self.lock()?;
        let renamed = rename()?;
        let mut map = self.read();
        if map.remove(id).is_some() {
            self.write(&map)?;
        }
        Ok(renamed)
    }

    /// Lock-free snapshot of all entries.
    pub fn entries(&self) -> BTreeMap<JobId, TempName> {
        self.read()
    }

    fn read(&self) -> BTreeMap<JobId, TempName> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read pending index");
                return BTreeMap::new();
            }
        };
        parse_index(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "ignoring unparseable pending index");
            BTreeMap::new()
        })
    }

    fn write(&self, map: &BTreeMap<JobId, TempName>) -> Result<(), PendingError> {
        let yaml = serde_yaml::to_string(map)?;
        let tmp_path = self.path.with_extension("yml.tmp");
        std::fs::write(&tmp_path, yaml.as_bytes())?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Parse the index, accepting both quoted and bare numeric keys.
fn parse_index(content: &str) -> Result<BTreeMap<JobId, TempName>, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let mapping: Option<serde_yaml::Mapping> = serde_yaml::from_str(content)?;
    Ok(mapping
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| Some((JobId::new(scalar(&k)?), TempName::new(scalar(&v)?))))
        .collect())
}

fn scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
