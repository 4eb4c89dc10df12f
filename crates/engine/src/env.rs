// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Explicit config file path
pub fn config_path() -> Option<PathBuf> {
    non_empty("PROV_CONFIG").map(PathBuf::from)
}

/// Resolve the default config file: <config_dir>/prov/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("prov").join("config.toml"))
}

/// Resolve state directory: PROV_STATE_DIR > XDG_STATE_HOME/prov > ~/.local/state/prov
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = non_empty("PROV_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("prov"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/prov"))
}

/// Provisioning root override
pub fn provision_dir() -> Option<PathBuf> {
    non_empty("PROV_PROVISION_DIR").map(PathBuf::from)
}

/// Provisioning tool override
pub fn tool() -> Option<String> {
    non_empty("PROV_TOOL")
}

/// Cloud API endpoint override
pub fn endpoint() -> Option<String> {
    non_empty("PROV_ENDPOINT")
}

/// Default user for tool invocations
pub fn user() -> Option<String> {
    non_empty("PROV_USER")
}

/// Default password for tool invocations
pub fn password() -> Option<String> {
    non_empty("PROV_PASSWORD")
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
