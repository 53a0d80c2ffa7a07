// SPDX-License-Identifier: MIT
//! matrix.rs — the build-matrix executor.
//!
//! Runs a fixed, ordered set of build actions against every platform the
//! plugin supports and the host can build. Actions are independent: an
//! earlier failure never curtails a later action. Gating policy: a platform
//! is attempted whenever the plugin's badges declare it AND the host is
//! capable of building it (iOS artifacts require a macOS host; Android
//! builds everywhere).

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::CloudCredentials;
use crate::exec::CommandRunner;
use crate::marketplace::PluginDescriptor;
use crate::report::{ActionOutcome, PluginResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

/// What the host OS can build at all, independent of any plugin.
#[derive(Debug, Clone, Copy)]
pub struct HostCapability {
    pub android: bool,
    pub ios: bool,
}

impl HostCapability {
    /// iOS artifacts can only be produced on macOS; Android everywhere.
    pub fn detect() -> Self {
        Self {
            android: true,
            ios: std::env::consts::OS == "macos",
        }
    }

    pub fn can_build(self, platform: Platform) -> bool {
        match platform {
            Platform::Android => self.android,
            Platform::Ios => self.ios,
        }
    }
}

/// A named build mode mapped to per-platform option strings. `None` means
/// the mode does not exist for that platform.
pub struct BuildAction {
    pub name: &'static str,
    pub android: Option<&'static str>,
    pub ios: Option<&'static str>,
}

impl BuildAction {
    pub fn options(&self, platform: Platform) -> Option<&'static str> {
        match platform {
            Platform::Android => self.android,
            Platform::Ios => self.ios,
        }
    }

    pub fn by_name(name: &str) -> Option<&'static BuildAction> {
        ACTIONS.iter().find(|a| a.name == name)
    }
}

/// The known build modes, in canonical order. V8 heap snapshots only exist
/// on Android.
pub const ACTIONS: &[BuildAction] = &[
    BuildAction {
        name: "build",
        android: Some(""),
        ios: Some(""),
    },
    BuildAction {
        name: "webpack",
        android: Some("--bundle"),
        ios: Some("--bundle"),
    },
    BuildAction {
        name: "snapshot",
        android: Some("--bundle --env.snapshot"),
        ios: None,
    },
    BuildAction {
        name: "uglify",
        android: Some("--bundle --env.uglify"),
        ios: Some("--bundle --env.uglify"),
    },
    BuildAction {
        name: "aot",
        android: Some("--bundle --env.aot"),
        ios: Some("--bundle --env.aot"),
    },
];

pub struct MatrixExecutor {
    runner: Arc<dyn CommandRunner>,
    actions: Vec<String>,
    cloud: Option<CloudCredentials>,
    host: HostCapability,
}

impl MatrixExecutor {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        actions: Vec<String>,
        cloud: Option<CloudCredentials>,
        host: HostCapability,
    ) -> Self {
        Self {
            runner,
            actions,
            cloud,
            host,
        }
    }

    fn plugin_supports(plugin: &PluginDescriptor, platform: Platform) -> bool {
        match platform {
            Platform::Android => plugin.supports_android(),
            Platform::Ios => plugin.supports_ios(),
        }
    }

    fn build_command(&self, platform: Platform, options: &str) -> String {
        let mut command = match &self.cloud {
            Some(_) => format!("tns cloud build {}", platform.as_str()),
            None => format!("tns build {}", platform.as_str()),
        };
        if !options.is_empty() {
            command.push(' ');
            command.push_str(options);
        }
        if let Some(creds) = &self.cloud {
            command.push_str(&format!(
                " --accountId {} --apiKey {}",
                creds.account_id, creds.api_key
            ));
        }
        command
    }

    /// Run the configured action list against `project` and collect one
    /// outcome per attempted action/platform pair.
    pub async fn run(&self, plugin: &PluginDescriptor, project: &Path) -> PluginResult {
        let mut result = PluginResult::new(&plugin.name);

        for name in &self.actions {
            let Some(action) = BuildAction::by_name(name) else {
                warn!(action = %name, "unknown build action, skipping");
                continue;
            };
            for platform in Platform::ALL {
                if !Self::plugin_supports(plugin, platform) {
                    continue;
                }
                if !self.host.can_build(platform) {
                    continue;
                }
                let Some(options) = action.options(platform) else {
                    continue;
                };

                let command = self.build_command(platform, options);
                info!(plugin = %plugin.name, action = action.name, platform = platform.as_str(), "building");
                let start = Instant::now();
                let success = match self.runner.run(project, &command).await {
                    Ok(ok) => ok,
                    Err(e) => {
                        warn!(plugin = %plugin.name, command, "build could not be spawned: {e:#}");
                        false
                    }
                };
                result.record(
                    action.name,
                    platform.as_str(),
                    ActionOutcome {
                        success,
                        seconds: start.elapsed().as_secs(),
                    },
                );
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_android_only() {
        let snapshot = BuildAction::by_name("snapshot").unwrap();
        assert!(snapshot.options(Platform::Android).is_some());
        assert!(snapshot.options(Platform::Ios).is_none());
    }

    #[test]
    fn unknown_action_resolves_to_none() {
        assert!(BuildAction::by_name("hot-reload").is_none());
    }

    #[test]
    fn local_command_template() {
        let exec = MatrixExecutor::new(
            Arc::new(crate::exec::ShellRunner),
            vec![],
            None,
            HostCapability { android: true, ios: true },
        );
        assert_eq!(
            exec.build_command(Platform::Android, "--bundle"),
            "tns build android --bundle"
        );
        assert_eq!(exec.build_command(Platform::Ios, ""), "tns build ios");
    }

    #[test]
    fn cloud_command_carries_credentials() {
        let exec = MatrixExecutor::new(
            Arc::new(crate::exec::ShellRunner),
            vec![],
            Some(CloudCredentials {
                account_id: "acct-1".to_string(),
                api_key: "key-1".to_string(),
            }),
            HostCapability { android: true, ios: true },
        );
        assert_eq!(
            exec.build_command(Platform::Ios, "--bundle"),
            "tns cloud build ios --bundle --accountId acct-1 --apiKey key-1"
        );
    }
}
