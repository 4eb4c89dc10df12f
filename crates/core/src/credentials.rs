// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credentials forwarded to the provisioning tool

/// Authentication passed to every tool invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    /// Endpoint of the cloud API, forwarded as `--endpoint`
    pub endpoint: Option<String>,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Authentication flags in the tool's argument format.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--user".to_string(),
            self.user.clone(),
            "--password".to_string(),
            self.password.clone(),
        ];
        if let Some(ref endpoint) = self.endpoint {
            args.push("--endpoint".to_string());
            args.push(endpoint.clone());
        }
        args
    }
}

// Keep passwords out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
