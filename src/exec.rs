// SPDX-License-Identifier: MIT
//! exec.rs — shell command execution.
//!
//! Everything the harness does to the outside world goes through the
//! [`CommandRunner`] trait: project scaffolding, plugin installation, and
//! every build in the matrix. Tests substitute a scripted runner; production
//! uses [`ShellRunner`], which spawns `sh -c <command>` in a working
//! directory and waits for it without any timeout (a hung build blocks the
//! pipeline — accepted limitation).

use std::path::Path;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Seam between the harness and the host shell.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` in `cwd`; resolve to `true` on exit code zero.
    ///
    /// A non-zero exit is a normal outcome (a failed build), not an error.
    /// `Err` means the command could not be spawned at all.
    async fn run(&self, cwd: &Path, command: &str) -> Result<bool>;

    /// Run `command` in `cwd` and resolve to its captured stdout.
    async fn run_capture(&self, cwd: &Path, command: &str) -> Result<String>;
}

/// Production runner backed by `tokio::process`.
pub struct ShellRunner;

impl ShellRunner {
    async fn spawn(&self, cwd: &Path, command: &str) -> Result<std::process::Output> {
        debug!(cwd = %cwd.display(), command, "exec");
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .output()
            .await
            .with_context(|| format!("failed to spawn `{command}` in {}", cwd.display()))?;

        // Surface stderr to the log regardless of outcome; the build
        // toolchain writes warnings there even on success.
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            warn!(command, "{line}");
        }
        Ok(output)
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, cwd: &Path, command: &str) -> Result<bool> {
        let output = self.spawn(cwd, command).await?;
        Ok(output.status.success())
    }

    async fn run_capture(&self, cwd: &Path, command: &str) -> Result<String> {
        let output = self.spawn(cwd, command).await?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
