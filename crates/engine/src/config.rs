// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Read from a TOML file (`PROV_CONFIG`, else `<config_dir>/prov/config.toml`)
//! and then overridden by `PROV_PROVISION_DIR`, `PROV_TOOL` and
//! `PROV_ENDPOINT`. A missing file yields the defaults.

use prov_storage::LockPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::env;

/// Directory under `provision_dir` that holds the job tree.
pub const PROVISION_SUBDIR: &str = "provision";

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not determine state directory (set PROV_STATE_DIR or HOME)")]
    NoStateDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Parent of the `provision/` job tree
    pub provision_dir: PathBuf,
    /// Provisioning tool executable
    pub tool: String,
    /// Cloud API endpoint forwarded to the tool
    pub endpoint: Option<String>,
    /// Root of the default template sets
    pub templates_dir: PathBuf,
    pub lock_timeout_ms: u64,
    pub lock_retry_ms: u64,
    /// Timeout for `list` and `show`
    pub sync_timeout_ms: u64,
    /// Buffered events per bus subscriber
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provision_dir: PathBuf::from("/var/lib/one"),
            tool: "oneprovision".to_string(),
            endpoint: None,
            templates_dir: PathBuf::from("/usr/share/one/oneprovision/edge-clusters"),
            lock_timeout_ms: 5_000,
            lock_retry_ms: 50,
            sync_timeout_ms: 120_000,
            event_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Load from the configured file, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::config_path().or_else(env::default_config_path);
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) {
        if let Some(dir) = env::provision_dir() {
            self.provision_dir = dir;
        }
        if let Some(tool) = env::tool() {
            self.tool = tool;
        }
        if let Some(endpoint) = env::endpoint() {
            self.endpoint = Some(endpoint);
        }
    }

    /// Root of the job tree: `<provision_dir>/provision`
    pub fn provision_root(&self) -> PathBuf {
        self.provision_dir.join(PROVISION_SUBDIR)
    }

    pub fn lock_policy(&self) -> LockPolicy {
        LockPolicy {
            timeout: Duration::from_millis(self.lock_timeout_ms),
            retry: Duration::from_millis(self.lock_retry_ms.max(1)),
        }
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
