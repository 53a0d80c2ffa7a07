// SPDX-License-Identifier: MIT
//! install — plugin installation and scaffold patching.
//!
//! Turns a pristine working copy into one that actually exercises the
//! plugin at build time: applies any known per-plugin exception, installs
//! the package the way its classification demands, and wires the plugin's
//! exports into the template source so bundling cannot tree-shake it away.

pub mod exceptions;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::{debug, info, warn};

use crate::error::CheckError;
use crate::exec::CommandRunner;
use crate::marketplace::{PluginDescriptor, PluginKind};

/// Template source file that gets the plugin import injected.
const MAIN_VIEW_MODEL: &str = "app/main-view-model.ts";
/// App manifest that gets the native-inclusion key.
const APP_MANIFEST: &str = "app/package.json";
/// The lifecycle hook the export loop is injected into.
const TAP_HOOK: &str = "public onTap() {";
/// Must be present in the mutated source; its absence means the scaffold
/// template changed upstream and the patch logic is stale.
const DRIFT_MARKER: &str = "testExport";

pub struct Installer {
    runner: Arc<dyn CommandRunner>,
}

impl Installer {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Install `plugin` into the working copy at `project`.
    pub async fn install(&self, plugin: &PluginDescriptor, project: &Path) -> Result<()> {
        self.apply_exceptions(&plugin.name, project).await;

        let kind = plugin.classify();
        info!(plugin = %plugin.name, ?kind, "installing plugin");
        let install_cmd = match kind {
            PluginKind::DevTool => format!("npm i {} --save-dev", plugin.name),
            PluginKind::Generic => format!("npm i {} --save", plugin.name),
            PluginKind::Framework => format!("tns plugin add {}", plugin.name),
        };
        if !self.runner.run(project, &install_cmd).await? {
            // A botched install is a plugin problem, not a harness problem;
            // the builds will fail and be recorded as such.
            warn!(plugin = %plugin.name, "install command exited non-zero");
        }

        match kind {
            PluginKind::DevTool => Ok(()),
            PluginKind::Generic | PluginKind::Framework => {
                self.runner
                    .run(project, "npm i --save-dev nativescript-dev-webpack")
                    .await?;
                self.runner.run(project, "npm i").await?;
                wire_project(plugin, project)
            }
        }
    }

    /// Apply the static exception rule for `plugin_name`, if any. Errors
    /// here are logged and swallowed: a broken exception hook must degrade
    /// to an unmodified attempt, not abort the plugin.
    async fn apply_exceptions(&self, plugin_name: &str, project: &Path) {
        let Some(rule) = exceptions::lookup(plugin_name) else {
            return;
        };
        info!(plugin = plugin_name, "applying install exception");

        if let Some(patch) = &rule.file {
            let target = project.join(patch.path);
            let write = target
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|()| fs::write(&target, patch.content));
            if let Err(e) = write {
                warn!(plugin = plugin_name, path = patch.path, "exception file write failed: {e}");
            }
        }

        if let Some(command) = rule.command {
            match self.runner.run(project, command).await {
                Ok(true) => {}
                Ok(false) => warn!(plugin = plugin_name, command, "exception command exited non-zero"),
                Err(e) => warn!(plugin = plugin_name, command, "exception command failed: {e:#}"),
            }
        }
    }
}

/// Mutate the template so the plugin's exports are referenced at build
/// time: an import at the top of the main view model, a loop over the
/// exports inside the tap handler, and a manifest key forcing native
/// module inclusion under bundling.
fn wire_project(plugin: &PluginDescriptor, project: &Path) -> Result<()> {
    let source_path = project.join(MAIN_VIEW_MODEL);
    let mut source = fs::read_to_string(&source_path)
        .with_context(|| format!("failed to read {}", source_path.display()))?;

    // Typed plugins get an ES import so their declarations are compiled;
    // untyped ones fall back to require.
    let import = if plugin.badges.typings {
        format!("import * as testPlugin from '{}';\n", plugin.name)
    } else {
        format!("const testPlugin = require('{}');\n", plugin.name)
    };
    source.insert_str(0, &import);
    source = source.replace(
        TAP_HOOK,
        &format!("{TAP_HOOK}\nfor (const testExport in testPlugin) {{ console.log(testExport); }}"),
    );

    if !source.contains(DRIFT_MARKER) {
        return Err(CheckError::TemplateDrift { file: source_path }.into());
    }
    fs::write(&source_path, &source)
        .with_context(|| format!("failed to write {}", source_path.display()))?;

    inject_manifest_key(plugin, project)
}

/// Add `android.requireModules` to the app manifest so the Android runtime
/// loads the plugin's native code even when the bundle never touches it.
fn inject_manifest_key(plugin: &PluginDescriptor, project: &Path) -> Result<()> {
    let manifest_path = project.join(APP_MANIFEST);
    let raw = fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let mut manifest: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

    let android = manifest
        .as_object_mut()
        .context("app manifest is not a JSON object")?
        .entry("android")
        .or_insert_with(|| serde_json::json!({}));
    android
        .as_object_mut()
        .context("manifest `android` key is not an object")?
        .insert(
            "requireModules".to_string(),
            serde_json::json!([plugin.name]),
        );

    debug!(manifest = %manifest_path.display(), "injected requireModules");
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("failed to write {}", manifest_path.display()))
}
