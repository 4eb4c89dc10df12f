// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Default provision templates.
//!
//! Layout under the templates root:
//!
//! ```text
//! <name>/description.md
//! <name>/providers/<provider>/*.yml
//! <name>/provisions/*.yml
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::job_dir::sorted_entries;

/// Errors from scanning the templates root
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("templates directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read templates directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One default template set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefaultTemplate {
    pub description: String,
    pub providers: BTreeMap<String, Vec<serde_yaml::Value>>,
    pub provisions: Vec<serde_yaml::Value>,
}

/// Scan every template set under `root`, keyed by directory name.
pub fn list_defaults(root: &Path) -> Result<BTreeMap<String, DefaultTemplate>, TemplateError> {
    let entries = sorted_entries(root).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => TemplateError::NotFound(root.to_path_buf()),
        _ => TemplateError::Io {
            path: root.to_path_buf(),
            source,
        },
    })?;

    let mut defaults = BTreeMap::new();
    for dir in entries.into_iter().filter(|p| p.is_dir()) {
        let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        defaults.insert(name, load_template(&dir));
    }
    Ok(defaults)
}

fn load_template(dir: &Path) -> DefaultTemplate {
    let description = std::fs::read_to_string(dir.join("description.md"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let mut providers = BTreeMap::new();
    for provider_dir in list_or_empty(&dir.join("providers"))
        .into_iter()
        .filter(|p| p.is_dir())
    {
        if let Some(provider) = provider_dir.file_name() {
            providers.insert(
                provider.to_string_lossy().into_owned(),
                load_yaml_documents(&provider_dir),
            );
        }
    }

    DefaultTemplate {
        description,
        providers,
        provisions: load_yaml_documents(&dir.join("provisions")),
    }
}

fn load_yaml_documents(dir: &Path) -> Vec<serde_yaml::Value> {
    list_or_empty(dir)
        .into_iter()
        .filter(|p| p.is_file() && is_yaml(p))
        .filter_map(|path| {
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_yaml::from_str(&s).map_err(|e| e.to_string()));
            match parsed {
                Ok(value) => Some(value),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping template file");
                    None
                }
            }
        })
        .collect()
}

fn list_or_empty(dir: &Path) -> Vec<PathBuf> {
    sorted_entries(dir).unwrap_or_default()
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml" | "yaml")
    )
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
