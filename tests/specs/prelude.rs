//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for testing prov CLI behavior against a
//! scripted stand-in for the provisioning tool.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Returns the path to a binary, checking the llvm-cov target directory
/// first so coverage runs pick up the instrumented build.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }
    assert_cmd::cargo::cargo_bin(name)
}

/// Returns a Command configured to run the prov binary
pub fn prov_cmd() -> Command {
    Command::new(binary_path("prov"))
}

/// Create a CLI builder for prov commands
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: Vec::new(),
        }
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set working directory
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = prov_cmd();
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        // Keep the caller's environment from leaking into specs
        for key in [
            "PROV_CONFIG",
            "PROV_USER",
            "PROV_PASSWORD",
            "PROV_ENDPOINT",
            "PROV_LOG",
        ] {
            cmd.env_remove(key);
        }

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    /// Get stdout as string
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    /// Get stderr as string
    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Assert the process exit code.
    pub fn code(self, expected: i32) -> Self {
        assert_eq!(
            self.output.status.code(),
            Some(expected),
            "unexpected exit code\nstderr: {}",
            self.stderr()
        );
        self
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    /// **Prefer this for format specs** - catches format regressions.
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = self.stdout();
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    /// Assert stdout contains substring.
    /// Use when exact comparison isn't practical.
    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    /// Assert stdout does not contain substring.
    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout should not contain '{}'\nstdout: {}",
            unexpected,
            stdout
        );
        self
    }

    /// Assert stderr contains substring.
    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).expect("stdout should be JSON")
    }
}

// =============================================================================
// Fake provisioning tool
// =============================================================================

/// Shell stand-in for the provisioning tool.
///
/// Every invocation appends its arguments to `calls`. `create` announces
/// id 7, and fails after announcing it when a `fail` file exists next to
/// the script.
const FAKE_TOOL: &str = r#"#!/bin/sh
here=$(dirname "$0")
echo "$*" >> "$here/calls"
case "$1" in
  create)
    echo "creating hosts"
    echo "ID: 7"
    if [ -f "$here/fail" ]; then
      echo "host unreachable"
      exit 1
    fi
    ;;
  delete)
    echo "deleting $2"
    ;;
  configure)
    echo "configuring $2"
    ;;
  list)
    echo '[{"ID":"7","NAME":"edge"}]'
    ;;
  show)
    echo "{\"ID\":\"$2\",\"NAME\":\"edge\"}"
    ;;
  *)
    echo "unknown command $1" >&2
    exit 2
    ;;
esac
"#;

// =============================================================================
// Workspace
// =============================================================================

/// Isolated provisioning root, state directory and fake tool.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("tool/oneprovision");
        std::fs::create_dir_all(tool.parent().unwrap()).unwrap();
        std::fs::write(&tool, FAKE_TOOL).unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root of the job tree
    pub fn provision_root(&self) -> PathBuf {
        self.path().join("one/provision")
    }

    /// Write a file at the given path (parent directories created automatically)
    pub fn file(&self, path: impl AsRef<Path>, content: &str) -> PathBuf {
        let full_path = self.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
        full_path
    }

    /// Make the next `create` fail after announcing its id
    pub fn fail_create(&self) {
        self.file("tool/fail", "");
    }

    /// Argument lines the fake tool was invoked with
    pub fn tool_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.path().join("tool/calls"))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    /// Run prov against this workspace without credentials
    pub fn prov_anonymous(&self) -> CliBuilder {
        cli()
            .pwd(self.path())
            .env("PROV_TOOL", self.path().join("tool/oneprovision"))
            .env("PROV_PROVISION_DIR", self.path().join("one"))
            .env("PROV_STATE_DIR", self.path().join("state"))
            .env("PROV_CONFIG", self.path().join("config.toml"))
    }

    /// Run prov against this workspace as `oneadmin`
    pub fn prov(&self) -> CliBuilder {
        self.prov_anonymous()
            .env("PROV_USER", "oneadmin")
            .env("PROV_PASSWORD", "secret")
    }
}

/// Minimal provision request
pub const EDGE_REQUEST: &str = r#"
name: edge
hosts:
  - im_mad: kvm
    provision:
      hostname: host-1
"#;
