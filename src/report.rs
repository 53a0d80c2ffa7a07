// SPDX-License-Identifier: MIT
//! report.rs — the persisted run artifact.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Outcome of one build command: exit-code success plus elapsed wall-clock
/// whole seconds. A `false` here is ordinary data, not a harness error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub seconds: u64,
}

/// Per-plugin results: action name → platform name → outcome. Ordered maps
/// keep the serialized report stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResult {
    pub name: String,
    pub actions: BTreeMap<String, BTreeMap<String, ActionOutcome>>,
}

impl PluginResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, action: &str, platform: &str, outcome: ActionOutcome) {
        self.actions
            .entry(action.to_string())
            .or_default()
            .insert(platform.to_string(), outcome);
    }

    pub fn outcome(&self, action: &str, platform: &str) -> Option<&ActionOutcome> {
        self.actions.get(action)?.get(platform)
    }
}

/// Toolchain versions probed before any plugin is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainInfo {
    pub tns: String,
    pub npm: String,
    pub node: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub toolchain: ToolchainInfo,
    pub plugins: Vec<PluginResult>,
}

impl Report {
    pub fn new(toolchain: ToolchainInfo, plugins: Vec<PluginResult>) -> Self {
        Self {
            generated_at: Utc::now(),
            toolchain,
            plugins,
        }
    }

    /// Serialize the full report as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(path, body)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), plugins = self.plugins.len(), "report written");
        Ok(())
    }
}
