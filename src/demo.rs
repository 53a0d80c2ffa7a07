// SPDX-License-Identifier: MIT
//! demo.rs — demo-app builds cloned from plugin repositories.
//!
//! The legacy per-plugin-project variant: instead of copying the shared
//! scaffold, each plugin carrying the demos badge gets a fresh clone of its
//! repository, and the demo application inside it is built once for the
//! first platform the plugin supports. Clone directories are created fresh
//! and never reused.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context as _, Result};
use tracing::{debug, info};

use crate::exec::CommandRunner;
use crate::marketplace::PluginDescriptor;
use crate::matrix::Platform;
use crate::report::ActionOutcome;
use crate::scaffold::ScaffoldManager;

/// Directory names plugin authors use for their demo apps, in probe order.
const DEMO_DIRS: &[&str] = &["demo", "demo-ts", "demo-angular", "demo-ng", "ng-demo", "demo-vue"];

pub struct DemoChecker {
    runner: Arc<dyn CommandRunner>,
}

impl DemoChecker {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Clone the plugin repository under `root` and build its demo app.
    /// Returns the platform built and the outcome.
    pub async fn check(
        &self,
        plugin: &PluginDescriptor,
        root: &Path,
    ) -> Result<(Platform, ActionOutcome)> {
        if plugin.badges.demos.is_none() {
            bail!("plugin {} has no demos badge", plugin.name);
        }
        let Some(url) = plugin.repository_url.as_deref().filter(|u| !u.is_empty()) else {
            bail!("plugin {} has no repository URL", plugin.name);
        };
        let platform = if plugin.supports_android() {
            Platform::Android
        } else if plugin.supports_ios() {
            Platform::Ios
        } else {
            bail!("plugin {} has no platform", plugin.name);
        };

        let clone_name = format!("git{}", ScaffoldManager::project_dir_name(&plugin.name));
        let clone_dir = root.join(&clone_name);
        if clone_dir.exists() {
            fs::remove_dir_all(&clone_dir)
                .with_context(|| format!("failed to remove stale clone {}", clone_dir.display()))?;
        }
        fs::create_dir_all(root).context("failed to create clone root")?;

        info!(plugin = %plugin.name, url, "cloning demo repository");
        if !self.runner.run(root, &format!("git clone {url} {clone_name}")).await? {
            bail!("git clone of {url} failed");
        }

        let demo_dir = locate_demo_dir(&clone_dir);
        debug!(demo = %demo_dir.display(), "building demo app");

        // Some repositories need the plugin itself built before the demo.
        self.runner
            .run(&demo_dir, "npm run build.plugin --if-present")
            .await?;
        self.runner.run(&demo_dir, "npm i").await?;

        let start = Instant::now();
        let success = self
            .runner
            .run(&demo_dir, &format!("tns build {}", platform.as_str()))
            .await?;
        Ok((
            platform,
            ActionOutcome {
                success,
                seconds: start.elapsed().as_secs(),
            },
        ))
    }
}

/// The demo app usually lives in a subdirectory; fall back to the clone
/// root when none of the conventional names exist.
fn locate_demo_dir(clone_dir: &Path) -> std::path::PathBuf {
    for candidate in DEMO_DIRS {
        let dir = clone_dir.join(candidate);
        if dir.is_dir() {
            return dir;
        }
    }
    clone_dir.to_path_buf()
}
