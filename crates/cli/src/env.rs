// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

/// Log filter directives (EnvFilter syntax)
pub fn log_filter() -> Option<String> {
    std::env::var("PROV_LOG").ok().filter(|v| !v.is_empty())
}
