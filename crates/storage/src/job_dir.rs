// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job working directories.
//!
//! A job directory moves through three names:
//!   `<root>/tmp/<user>/<temp-name>/`  while staging
//!   `<root>/<id>/`                    once committed
//!   `<name>.ERROR/`                   after a failed command
//!
//! Lookups by base name are served from an in-memory index built by one
//! sorted scan and kept current by this store's own mutations. Other
//! processes share the tree, so a miss or a stale hit rescans once.

use parking_lot::Mutex;
use prov_core::{IdGen, TempName, UuidIdGen};
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Scratch area for staging directories, relative to the store root.
pub const STAGING_DIR: &str = "tmp";

/// Errors from job directory operations
#[derive(Debug, Error)]
pub enum DirError {
    #[error("directory already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("invalid directory name: {0:?}")]
    InvalidName(String),
    #[error("cannot move {} up {levels} level(s)", path.display())]
    NoAncestor { path: PathBuf, levels: usize },
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DirError {
    fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        DirError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How `rename` combines the current name with a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameMode {
    Replace,
    Prepend,
    Append,
}

impl RenameMode {
    fn apply(self, current: &str, fragment: &str) -> String {
        match self {
            RenameMode::Replace => fragment.to_string(),
            RenameMode::Prepend => format!("{fragment}{current}"),
            RenameMode::Append => format!("{current}{fragment}"),
        }
    }
}

/// A file to materialise inside a new staging directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFile {
    pub name: String,
    pub extension: String,
    pub content: String,
}

impl StageFile {
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
            content: content.into(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }
}

/// A freshly created staging directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDir {
    pub name: TempName,
    pub path: PathBuf,
    /// Files that were written, keyed by file name
    pub files: BTreeMap<String, PathBuf>,
}

impl StagedDir {
    pub fn file(&self, file_name: &str) -> Option<&Path> {
        self.files.get(file_name).map(PathBuf::as_path)
    }
}

/// Owns the job directory tree under one root.
pub struct JobDirectoryStore {
    root: PathBuf,
    index: Mutex<BTreeMap<String, PathBuf>>,
}

impl JobDirectoryStore {
    /// Open the store, creating `root` if needed, and index its tree.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DirError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| DirError::io("create", &root, e))?;
        let store = Self {
            root,
            index: Mutex::new(BTreeMap::new()),
        };
        store.rescan();
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parent directory for a user's staging directories.
    ///
    /// `user` must be a single plain path component so the directory stays
    /// exactly two levels below the root.
    pub fn staging_parent(&self, user: &str) -> Result<PathBuf, DirError> {
        let mut components = Path::new(user).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == user => {
                Ok(self.root.join(STAGING_DIR).join(name))
            }
            _ => Err(DirError::InvalidName(user.to_string())),
        }
    }

    /// Create a new staging directory and write `files` into it.
    ///
    /// A file that cannot be written is logged and left out of
    /// [`StagedDir::files`]. Fails if the directory already exists.
    pub fn create_staging(
        &self,
        parent: &Path,
        name: Option<TempName>,
        files: &[StageFile],
    ) -> Result<StagedDir, DirError> {
        let name = name.unwrap_or_else(|| TempName::new(UuidIdGen.next()));
        std::fs::create_dir_all(parent).map_err(|e| DirError::io("create", parent, e))?;

        let path = parent.join(name.as_str());
        match std::fs::create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(DirError::AlreadyExists(path));
            }
            Err(e) => return Err(DirError::io("create", &path, e)),
        }

        let mut written = BTreeMap::new();
        for file in files {
            let file_name = file.file_name();
            let file_path = path.join(&file_name);
            match std::fs::write(&file_path, file.content.as_bytes()) {
                Ok(()) => {
                    written.insert(file_name, file_path);
                }
                Err(e) => tracing::warn!(
                    path = %file_path.display(),
                    error = %e,
                    "failed to write staging file"
                ),
            }
        }

        self.index_insert(name.as_str(), &path);
        tracing::debug!(path = %path.display(), files = written.len(), "staging directory created");
        Ok(StagedDir {
            name,
            path,
            files: written,
        })
    }

    /// Find a directory anywhere under the root by its base name.
    pub fn find_by_name(&self, name: &str) -> Option<PathBuf> {
        if let Some(path) = self.lookup(name) {
            return Some(path);
        }
        self.rescan();
        self.lookup(name)
    }

    /// Rename a job directory, or the directory containing `path` when it
    /// is a file.
    pub fn rename(&self, path: &Path, fragment: &str, mode: RenameMode) -> Result<PathBuf, DirError> {
        let dir = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };
        let current = base_name(dir);
        let target = dir.with_file_name(mode.apply(&current, fragment));
        self.relocate(dir, target)
    }

    /// Move a directory `levels` parents up, keeping its name.
    pub fn move_up(&self, path: &Path, levels: usize) -> Result<PathBuf, DirError> {
        let (Some(new_parent), Some(name)) = (path.ancestors().nth(levels + 1), path.file_name())
        else {
            return Err(DirError::NoAncestor {
                path: path.to_path_buf(),
                levels,
            });
        };
        let target = new_parent.join(name);
        self.relocate(path, target)
    }

    /// Recursively delete a directory. Failures are logged, not returned.
    pub fn remove(&self, path: &Path) {
        match std::fs::remove_dir_all(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "directory removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove directory"),
        }
        self.index.lock().retain(|_, p| !p.starts_with(path));
    }

    /// Rebuild the name index from a full scan of the tree.
    pub fn rescan(&self) {
        let mut index = BTreeMap::new();
        for dir in walk_dirs(&self.root) {
            let name = base_name(&dir);
            // Sorted walk: the first path seen for a name is the smallest
            index.entry(name).or_insert(dir);
        }
        *self.index.lock() = index;
    }

    fn relocate(&self, from: &Path, to: PathBuf) -> Result<PathBuf, DirError> {
        if to.exists() {
            return Err(DirError::AlreadyExists(to));
        }
        std::fs::rename(from, &to).map_err(|e| DirError::io("rename", from, e))?;

        let mut index = self.index.lock();
        index.retain(|_, p| !p.starts_with(from));
        insert_smallest(&mut index, &base_name(&to), &to);
        tracing::debug!(from = %from.display(), to = %to.display(), "directory renamed");
        Ok(to)
    }

    fn lookup(&self, name: &str) -> Option<PathBuf> {
        let index = self.index.lock();
        let path = index.get(name)?;
        path.is_dir().then(|| path.clone())
    }

    fn index_insert(&self, name: &str, path: &Path) {
        insert_smallest(&mut self.index.lock(), name, path);
    }
}

fn insert_smallest(index: &mut BTreeMap<String, PathBuf>, name: &str, path: &Path) {
    match index.get(name) {
        Some(existing) if existing.as_path() <= path && existing.is_dir() => {}
        _ => {
            index.insert(name.to_string(), path.to_path_buf());
        }
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Entries of `dir` sorted by path. Unreadable entries are skipped.
pub fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    Ok(entries)
}

/// All directories below `root` (not including it), depth-first in sorted
/// order. Symlinks are not followed.
pub fn walk_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    walk_into(root, &mut dirs);
    dirs
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match sorted_entries(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "failed to read directory");
            return;
        }
    };
    for entry in entries {
        let is_dir = std::fs::symlink_metadata(&entry)
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            out.push(entry.clone());
            walk_into(&entry, out);
        }
    }
}

#[cfg(test)]
#[path = "job_dir_tests.rs"]
mod tests;
