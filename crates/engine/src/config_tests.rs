// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::from_file(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "provision_dir = \"/srv/one\"\nlock_timeout_ms = 250\n",
    )
    .unwrap();

    let config = EngineConfig::from_file(&path).unwrap();
    assert_eq!(config.provision_dir, PathBuf::from("/srv/one"));
    assert_eq!(config.provision_root(), PathBuf::from("/srv/one/provision"));
    assert_eq!(config.lock_policy().timeout, Duration::from_millis(250));
    assert_eq!(config.tool, "oneprovision");
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "provison_dir = \"/typo\"\n").unwrap();

    let err = EngineConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn zero_retry_is_clamped() {
    let config = EngineConfig {
        lock_retry_ms: 0,
        ..EngineConfig::default()
    };
    assert_eq!(config.lock_policy().retry, Duration::from_millis(1));
}

#[test]
#[serial]
fn environment_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "tool = \"from-file\"\nendpoint = \"http://file\"\n").unwrap();

    std::env::set_var("PROV_CONFIG", &path);
    std::env::set_var("PROV_TOOL", "from-env");
    std::env::set_var("PROV_PROVISION_DIR", dir.path());
    let config = EngineConfig::load().unwrap();
    std::env::remove_var("PROV_CONFIG");
    std::env::remove_var("PROV_TOOL");
    std::env::remove_var("PROV_PROVISION_DIR");

    assert_eq!(config.tool, "from-env");
    assert_eq!(config.endpoint.as_deref(), Some("http://file"));
    assert_eq!(config.provision_dir, dir.path());
}
