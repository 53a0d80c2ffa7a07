// SPDX-License-Identifier: MIT
//! config.rs — run configuration.
//!
//! Everything that used to be ambient process state (cloud-build toggles,
//! action list, directory names) lives on one value built in `main` and
//! threaded by argument through the pipeline.

use std::path::PathBuf;
use std::time::Duration;

/// Credentials enabling remote (cloud) builds. When present, the matrix
/// executor substitutes the cloud command template for the local one.
#[derive(Debug, Clone)]
pub struct CloudCredentials {
    pub account_id: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Catalog page window.
    pub skip: u64,
    pub take: u64,
    /// Root directory holding the template and all working copies.
    pub test_root: PathBuf,
    /// Build actions to run per plugin, in order. Names must match the
    /// static action table in `matrix.rs`.
    pub actions: Vec<String>,
    /// Remote build mode; `None` means local `tns build`.
    pub cloud: Option<CloudCredentials>,
    /// Also build demo apps cloned from plugin repositories.
    pub check_demos: bool,
    /// Grace period between the last build and working-copy removal, so
    /// platform build/file-watcher processes can release file locks.
    pub cleanup_delay: Duration,
    /// Path of the persisted JSON report.
    pub report_path: PathBuf,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            skip: 0,
            take: 10,
            test_root: PathBuf::from("test"),
            actions: vec![
                "build".to_string(),
                "webpack".to_string(),
                "snapshot".to_string(),
                "uglify".to_string(),
                "aot".to_string(),
            ],
            cloud: None,
            check_demos: false,
            cleanup_delay: Duration::from_secs(3),
            report_path: PathBuf::from("nscheck-report.json"),
        }
    }
}
