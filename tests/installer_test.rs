//! Installer tests: classification-driven install commands, exception
//! application order, source wiring, and template drift.

mod common;

use std::fs;
use std::sync::Arc;

use common::FakeRunner;
use nscheck::error::CheckError;
use nscheck::install::Installer;
use nscheck::marketplace::{PluginBadges, PluginDescriptor};
use tempfile::TempDir;

/// A working copy as the scaffold manager would hand it out.
fn working_copy() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("app")).unwrap();
    fs::write(tmp.path().join("package.json"), "{\"nativescript\": {}}\n").unwrap();
    fs::write(tmp.path().join("app/package.json"), "{\"main\": \"main.js\"}\n").unwrap();
    fs::write(
        tmp.path().join("app/main-view-model.ts"),
        common::DEFAULT_TEMPLATE_SOURCE,
    )
    .unwrap();
    tmp
}

fn framework_plugin(name: &str) -> PluginDescriptor {
    PluginDescriptor {
        name: name.to_string(),
        badges: PluginBadges {
            android_version: Some("6.0.0".to_string()),
            typings: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn framework_plugin_installed_via_tns_and_wired() {
    let copy = working_copy();
    let runner = Arc::new(FakeRunner::new());
    let installer = Installer::new(runner.clone());

    installer
        .install(&framework_plugin("nativescript-camera"), copy.path())
        .await
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec![
            "tns plugin add nativescript-camera",
            "npm i --save-dev nativescript-dev-webpack",
            "npm i",
        ]
    );
    let source = fs::read_to_string(copy.path().join("app/main-view-model.ts")).unwrap();
    assert!(source.starts_with("import * as testPlugin from 'nativescript-camera';"));
    assert!(source.contains("for (const testExport in testPlugin)"));
}

#[tokio::test]
async fn dev_tool_is_plain_dev_dependency_without_wiring() {
    let copy = working_copy();
    let runner = Arc::new(FakeRunner::new());
    let installer = Installer::new(runner.clone());
    let plugin = PluginDescriptor {
        name: "nativescript-dev-typescript".to_string(),
        ..Default::default()
    };

    installer.install(&plugin, copy.path()).await.unwrap();

    assert_eq!(
        runner.commands(),
        vec!["npm i nativescript-dev-typescript --save-dev"]
    );
    // Never wired into application code.
    let source = fs::read_to_string(copy.path().join("app/main-view-model.ts")).unwrap();
    assert_eq!(source, common::DEFAULT_TEMPLATE_SOURCE);
}

#[tokio::test]
async fn generic_package_installed_via_npm_but_still_wired() {
    let copy = working_copy();
    let runner = Arc::new(FakeRunner::new());
    let installer = Installer::new(runner.clone());
    let plugin = PluginDescriptor {
        name: "moment".to_string(),
        ..Default::default()
    };

    installer.install(&plugin, copy.path()).await.unwrap();

    let commands = runner.commands();
    assert_eq!(commands[0], "npm i moment --save");
    let source = fs::read_to_string(copy.path().join("app/main-view-model.ts")).unwrap();
    assert!(source.starts_with("const testPlugin = require('moment');"));
}

#[tokio::test]
async fn exception_file_written_verbatim_before_install_command() {
    let copy = working_copy();
    let runner = Arc::new(FakeRunner::new());
    let installer = Installer::new(runner.clone());

    installer
        .install(&framework_plugin("nativescript-plugin-firebase"), copy.path())
        .await
        .unwrap();

    let seeded = fs::read_to_string(copy.path().join("firebase.nativescript.json")).unwrap();
    assert!(seeded.contains("\"using_android\": true"));
    // The file patch carries no shell command, so the first command seen is
    // the install itself — the file was already on disk by then.
    assert_eq!(runner.commands()[0], "tns plugin add nativescript-plugin-firebase");
}

#[tokio::test]
async fn exception_command_runs_before_install_command() {
    let copy = working_copy();
    let runner = Arc::new(FakeRunner::new());
    let installer = Installer::new(runner.clone());
    let plugin = PluginDescriptor {
        name: "nativescript-dev-appium".to_string(),
        ..Default::default()
    };

    installer.install(&plugin, copy.path()).await.unwrap();

    assert_eq!(
        runner.commands(),
        vec![
            "npm i --save-dev mocha",
            "npm i nativescript-dev-appium --save-dev",
        ]
    );
}

#[tokio::test]
async fn failing_exception_command_degrades_to_plain_install() {
    let copy = working_copy();
    let runner = Arc::new(FakeRunner::new().erroring_on("mocha"));
    let installer = Installer::new(runner.clone());
    let plugin = PluginDescriptor {
        name: "nativescript-dev-appium".to_string(),
        ..Default::default()
    };

    // Swallowed, not escalated.
    installer.install(&plugin, copy.path()).await.unwrap();
    assert_eq!(
        runner.commands().last().unwrap(),
        "npm i nativescript-dev-appium --save-dev"
    );
}

#[tokio::test]
async fn changed_template_surfaces_template_drift() {
    let copy = working_copy();
    // Upstream renamed the tap handler: the patch site is gone.
    fs::write(
        copy.path().join("app/main-view-model.ts"),
        "export class HelloWorldModel {\n    public onButtonTap() {\n    }\n}\n",
    )
    .unwrap();
    let installer = Installer::new(Arc::new(FakeRunner::new()));

    let err = installer
        .install(&framework_plugin("nativescript-camera"), copy.path())
        .await
        .unwrap_err();
    assert!(CheckError::is_template_drift(&err));
}
