// SPDX-License-Identifier: MIT
//! marketplace.rs — NativeScript Marketplace catalog client and plugin model.
//!
//! The Marketplace lists plugins behind a paginated REST endpoint. Any
//! network or parse failure degrades to an empty page ("nothing to test"),
//! never an error — a flaky catalog must not abort a run.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_API_BASE_URL: &str = "https://market.nativescript.org";
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Capability badges attached to a marketplace plugin.
///
/// Version-valued badges double as booleans: `Some(_)` means the capability
/// exists, the string carries the verified framework version.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginBadges {
    /// Verified Android runtime version, if the plugin builds for Android.
    pub android_version: Option<String>,
    /// Verified iOS runtime version, if the plugin builds for iOS.
    pub ios_version: Option<String>,
    /// Set when the plugin repository ships a demo application.
    pub demos: Option<String>,
    /// True when the plugin ships TypeScript type declarations.
    pub typings: bool,
}

/// One catalog record. Created by [`MarketplaceClient::fetch_page`],
/// read-only afterwards.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginDescriptor {
    /// Unique identifier; also the installable npm package name.
    pub name: String,
    pub version: Option<String>,
    pub repository_url: Option<String>,
    pub badges: PluginBadges,
}

/// How a plugin is installed and wired, computed once from the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    /// Development-time tooling (`-dev-` naming convention). Installed as a
    /// dev dependency, never referenced from application code.
    DevTool,
    /// Plain npm package with no Android or iOS badge. Installed via npm,
    /// not via the framework's plugin command.
    Generic,
    /// A real framework plugin, installed with `tns plugin add`.
    Framework,
}

impl PluginDescriptor {
    pub fn classify(&self) -> PluginKind {
        if self.name.contains("-dev-") {
            PluginKind::DevTool
        } else if self.badges.android_version.is_none() && self.badges.ios_version.is_none() {
            PluginKind::Generic
        } else {
            PluginKind::Framework
        }
    }

    pub fn supports_android(&self) -> bool {
        self.badges.android_version.is_some()
    }

    pub fn supports_ios(&self) -> bool {
        self.badges.ios_version.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct PluginPage {
    #[serde(default)]
    data: Vec<PluginDescriptor>,
}

/// Thin client for the marketplace listing endpoint.
pub struct MarketplaceClient {
    base_url: String,
}

impl Default for MarketplaceClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl MarketplaceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Fetch one page of plugin descriptors ordered by popularity.
    ///
    /// Returns an empty list on any network or parse failure.
    pub async fn fetch_page(&self, skip: u64, take: u64) -> Vec<PluginDescriptor> {
        let url = format!("{}/api/plugins", self.base_url);
        debug!(url, skip, take, "fetching marketplace page");

        let client = match reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent("nscheck")
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                warn!("marketplace: failed to build HTTP client: {e:#}");
                return Vec::new();
            }
        };

        let response = client
            .get(&url)
            .query(&[("skip", skip), ("take", take)])
            .header("Accept", "application/json")
            .send()
            .await;

        match response {
            Ok(resp) => match resp.json::<PluginPage>().await {
                Ok(page) => page.data,
                Err(e) => {
                    warn!("marketplace: failed to parse plugin listing: {e:#}");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("marketplace: failed to download plugin listing: {e:#}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(name: &str, android: bool, ios: bool) -> PluginDescriptor {
        PluginDescriptor {
            name: name.to_string(),
            badges: PluginBadges {
                android_version: android.then(|| "6.0.0".to_string()),
                ios_version: ios.then(|| "6.0.0".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn dev_naming_convention_wins_over_badges() {
        assert_eq!(
            plugin("nativescript-dev-webpack", true, true).classify(),
            PluginKind::DevTool
        );
    }

    #[test]
    fn badgeless_plugin_is_generic() {
        assert_eq!(plugin("left-pad", false, false).classify(), PluginKind::Generic);
    }

    #[test]
    fn badged_plugin_is_framework() {
        assert_eq!(
            plugin("nativescript-camera", true, false).classify(),
            PluginKind::Framework
        );
    }

    #[test]
    fn page_parses_marketplace_shape() {
        let body = r#"{
            "data": [
                {
                    "name": "nativescript-camera",
                    "version": "4.5.0",
                    "repositoryUrl": "https://github.com/NativeScript/nativescript-camera",
                    "badges": { "androidVersion": "6.0.0", "typings": true }
                }
            ],
            "total": 812
        }"#;
        let page: PluginPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.data.len(), 1);
        let p = &page.data[0];
        assert_eq!(p.name, "nativescript-camera");
        assert!(p.supports_android());
        assert!(!p.supports_ios());
        assert!(p.badges.typings);
    }

    #[test]
    fn missing_data_array_parses_empty() {
        let page: PluginPage = serde_json::from_str("{}").unwrap();
        assert!(page.data.is_empty());
    }
}
