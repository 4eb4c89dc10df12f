// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential resolution for tool invocations.

use anyhow::{anyhow, Result};
use prov_core::Credentials;

/// Credentials as given on the command line, before env fallback.
#[derive(Debug, Clone, Default)]
pub struct AuthArgs {
    pub user: Option<String>,
    pub password: Option<String>,
    pub endpoint: Option<String>,
}

impl AuthArgs {
    /// Fill missing values from `PROV_USER` / `PROV_PASSWORD`.
    pub fn with_env_fallback(mut self) -> Self {
        self.user = self.user.or_else(prov_engine::env::user);
        self.password = self.password.or_else(prov_engine::env::password);
        self
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let user = self
            .user
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| anyhow!("no user given (use --user or PROV_USER)"))?;
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| anyhow!("no password given (use --password or PROV_PASSWORD)"))?;
        let creds = Credentials::new(user, password);
        Ok(match &self.endpoint {
            Some(endpoint) => creds.with_endpoint(endpoint),
            None => creds,
        })
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
