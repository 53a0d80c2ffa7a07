// SPDX-License-Identifier: MIT
//! pipeline.rs — the top-level check loop.
//!
//! Strictly sequential: one plugin is fully processed (installed, built
//! across the whole action × platform matrix, cleaned up) before the next
//! begins — the build toolchain and the shared working directory are not
//! safe for concurrent use. No plugin's failure may halt the run; the one
//! exception is template drift, which means the harness itself is broken.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::CheckConfig;
use crate::demo::DemoChecker;
use crate::error::CheckError;
use crate::exec::CommandRunner;
use crate::install::Installer;
use crate::marketplace::{MarketplaceClient, PluginDescriptor};
use crate::matrix::{HostCapability, MatrixExecutor};
use crate::report::{PluginResult, Report, ToolchainInfo};
use crate::scaffold::ScaffoldManager;

pub struct Pipeline {
    config: CheckConfig,
    runner: Arc<dyn CommandRunner>,
    client: MarketplaceClient,
    scaffold: ScaffoldManager,
    installer: Installer,
    executor: MatrixExecutor,
    demos: DemoChecker,
}

impl Pipeline {
    pub fn new(config: CheckConfig, runner: Arc<dyn CommandRunner>, client: MarketplaceClient) -> Self {
        Self::with_host(config, runner, client, HostCapability::detect())
    }

    /// Like [`Pipeline::new`] but with an explicit host capability, so tests
    /// can exercise both platforms on any machine.
    pub fn with_host(
        config: CheckConfig,
        runner: Arc<dyn CommandRunner>,
        client: MarketplaceClient,
        host: HostCapability,
    ) -> Self {
        let scaffold = ScaffoldManager::new(
            runner.clone(),
            config.test_root.clone(),
            config.cleanup_delay,
        );
        let installer = Installer::new(runner.clone());
        let executor = MatrixExecutor::new(
            runner.clone(),
            config.actions.clone(),
            config.cloud.clone(),
            host,
        );
        let demos = DemoChecker::new(runner.clone());
        Self {
            config,
            runner,
            client,
            scaffold,
            installer,
            executor,
            demos,
        }
    }

    /// Run the whole pipeline: probe toolchain, bootstrap the scaffold,
    /// fetch one catalog page, check every plugin, persist the report.
    pub async fn run(&self) -> Result<Report> {
        let toolchain = self.probe_toolchain().await;
        info!(tns = %toolchain.tns, npm = %toolchain.npm, node = %toolchain.node, "toolchain");

        self.scaffold.initialize().await?;

        let plugins = self
            .client
            .fetch_page(self.config.skip, self.config.take)
            .await;
        info!(count = plugins.len(), "received plugins from marketplace");

        let results = self.check_all(&plugins).await?;
        let report = Report::new(toolchain, results);
        report.write(&self.config.report_path)?;
        Ok(report)
    }

    /// Check every plugin in order. Per-plugin failures are logged and
    /// skipped; template drift aborts the run.
    pub async fn check_all(&self, plugins: &[PluginDescriptor]) -> Result<Vec<PluginResult>> {
        let mut results = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            info!(plugin = %plugin.name, "start check");
            let start = Instant::now();
            match self.check_one(plugin).await {
                Ok(result) => results.push(result),
                Err(e) if CheckError::is_template_drift(&e) => {
                    error!(plugin = %plugin.name, "aborting run: {e:#}");
                    return Err(e);
                }
                Err(e) => {
                    warn!(plugin = %plugin.name, "check failed: {e:#}");
                }
            }
            info!(
                plugin = %plugin.name,
                elapsed_s = start.elapsed().as_secs(),
                "end check"
            );
        }
        Ok(results)
    }

    /// Acquire → install → build matrix → release. The working copy is
    /// released whether or not any step failed.
    async fn check_one(&self, plugin: &PluginDescriptor) -> Result<PluginResult> {
        let copy = self.scaffold.acquire_working_copy(&plugin.name)?;
        let outcome = self.install_and_build(plugin, &copy).await;
        self.scaffold.release(&copy).await;
        outcome
    }

    async fn install_and_build(
        &self,
        plugin: &PluginDescriptor,
        copy: &Path,
    ) -> Result<PluginResult> {
        self.installer.install(plugin, copy).await?;
        let mut result = self.executor.run(plugin, copy).await;

        if self.config.check_demos && plugin.badges.demos.is_some() {
            match self.demos.check(plugin, &self.config.test_root).await {
                Ok((platform, outcome)) => result.record("demo", platform.as_str(), outcome),
                Err(e) => warn!(plugin = %plugin.name, "demo check failed: {e:#}"),
            }
        }
        Ok(result)
    }

    /// Best-effort version probes; "unknown" when a tool is missing.
    async fn probe_toolchain(&self) -> ToolchainInfo {
        ToolchainInfo {
            tns: self.probe_version("tns --version").await,
            npm: self.probe_version("npm --version").await,
            node: self.probe_version("node --version").await,
        }
    }

    async fn probe_version(&self, command: &str) -> String {
        match self.runner.run_capture(Path::new("."), command).await {
            Ok(out) => out
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("unknown")
                .to_string(),
            Err(e) => {
                warn!(command, "version probe failed: {e:#}");
                "unknown".to_string()
            }
        }
    }
}
