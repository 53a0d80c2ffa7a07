// SPDX-License-Identifier: MIT
//! scaffold.rs — template project lifecycle.
//!
//! One pristine template project is created per run (`tns create`), renamed
//! to `scaffold-original` so it can never collide with a live working copy,
//! and then recursively duplicated once per plugin. The central isolation
//! invariant lives here: build side effects from plugin A must never be
//! visible to plugin B, so every working copy starts as an exact copy of
//! the untouched template and is deleted before the next plugin runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use tracing::{debug, info, warn};

use crate::error::CheckError;
use crate::exec::CommandRunner;

const TEMPLATE_NAME: &str = "scaffold";
const TEMPLATE_ORIGINAL: &str = "scaffold-original";

/// NativeScript rejects project names longer than 30 characters.
const MAX_PROJECT_NAME_LEN: usize = 30;

pub struct ScaffoldManager {
    runner: Arc<dyn CommandRunner>,
    root: PathBuf,
    cleanup_delay: Duration,
}

impl ScaffoldManager {
    pub fn new(runner: Arc<dyn CommandRunner>, root: PathBuf, cleanup_delay: Duration) -> Self {
        Self {
            runner,
            root,
            cleanup_delay,
        }
    }

    /// Directory name for a plugin's working copy: `test` + the plugin name
    /// stripped to alphanumerics, bounded to the project-name limit.
    pub fn project_dir_name(plugin_name: &str) -> String {
        let mut name = String::from("test");
        name.extend(plugin_name.chars().filter(|c| c.is_ascii_alphanumeric()));
        name.truncate(MAX_PROJECT_NAME_LEN);
        name
    }

    fn template_path(&self) -> PathBuf {
        self.root.join(TEMPLATE_ORIGINAL)
    }

    /// Wipe any stale state, recreate the test root, and materialize the
    /// template project. Fatal on failure: nothing downstream can be
    /// trusted without a clean template.
    pub async fn initialize(&self) -> Result<()> {
        if self.root.exists() {
            info!(root = %self.root.display(), "removing stale test root");
            fs::remove_dir_all(&self.root)
                .map_err(|e| CheckError::Setup(format!("failed to remove stale test root: {e}")))?;
        }
        fs::create_dir_all(&self.root)
            .map_err(|e| CheckError::Setup(format!("failed to create test root: {e}")))?;

        info!("creating template project {TEMPLATE_NAME}");
        let created = self
            .runner
            .run(&self.root, &format!("tns create {TEMPLATE_NAME} --tsc"))
            .await
            .map_err(|e| CheckError::Setup(format!("tns create could not be spawned: {e:#}")))?;
        if !created {
            return Err(CheckError::Setup("tns create exited non-zero".to_string()).into());
        }

        fs::rename(self.root.join(TEMPLATE_NAME), self.template_path())
            .map_err(|e| CheckError::Setup(format!("failed to rename template: {e}")))?;
        Ok(())
    }

    /// Duplicate the pristine template into a fresh working copy for
    /// `plugin_name`. A leftover copy from a crashed run is removed first,
    /// so calling this twice without `release` is safe.
    pub fn acquire_working_copy(&self, plugin_name: &str) -> Result<PathBuf> {
        let target = self.root.join(Self::project_dir_name(plugin_name));
        if target.exists() {
            debug!(path = %target.display(), "removing stale working copy");
            fs::remove_dir_all(&target)
                .with_context(|| format!("failed to remove stale copy {}", target.display()))?;
        }
        copy_dir_recursive(&self.template_path(), &target)
            .with_context(|| format!("failed to copy template to {}", target.display()))?;
        Ok(target)
    }

    /// Best-effort removal of a working copy. Waits out the cleanup delay
    /// first so platform build processes can release file locks; removal
    /// errors are logged, never escalated — a leftover directory is
    /// collide-and-removed by the next `acquire_working_copy`.
    pub async fn release(&self, path: &Path) {
        tokio::time::sleep(self.cleanup_delay).await;
        if let Err(e) = fs::remove_dir_all(path) {
            warn!(path = %path.display(), "failed to remove working copy: {e}");
        }
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_is_sanitized_and_bounded() {
        assert_eq!(
            ScaffoldManager::project_dir_name("@scope/nativescript-camera"),
            "testscopenativescriptcamera"
        );
        let long = ScaffoldManager::project_dir_name(
            "nativescript-some-unreasonably-long-plugin-name",
        );
        assert_eq!(long.len(), 30);
        assert!(long.starts_with("test"));
    }

    #[test]
    fn copy_dir_recursive_copies_nested_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("app")).unwrap();
        fs::write(src.join("package.json"), "{}").unwrap();
        fs::write(src.join("app/main.ts"), "export {};").unwrap();

        let dst = tmp.path().join("dst");
        copy_dir_recursive(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("package.json")).unwrap(), "{}");
        assert_eq!(
            fs::read_to_string(dst.join("app/main.ts")).unwrap(),
            "export {};"
        );
    }
}
