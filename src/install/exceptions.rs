//! exceptions.rs — static per-plugin installation exceptions.
//!
//! A handful of marketplace plugins cannot install into a bare scaffold:
//! some run interactive post-install scripts, some demand peer dependencies
//! the scaffold does not carry. Each entry is resolved once per plugin and
//! applied before the install command runs. A failing exception hook
//! degrades to an unmodified install attempt; it never aborts the plugin.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// A literal file to drop into the working copy before installation.
pub struct FilePatch {
    /// Path relative to the working-copy root.
    pub path: &'static str,
    pub content: &'static str,
}

pub struct ExceptionRule {
    pub file: Option<FilePatch>,
    /// Shell command to run in the working copy before installation.
    pub command: Option<&'static str>,
}

static EXCEPTIONS: Lazy<HashMap<&'static str, ExceptionRule>> = Lazy::new(|| {
    let mut table = HashMap::new();

    // Firebase runs an interactive questionnaire on install; pre-seeding
    // its config file makes the install non-interactive and Android-only.
    table.insert(
        "nativescript-plugin-firebase",
        ExceptionRule {
            file: Some(FilePatch {
                path: "firebase.nativescript.json",
                content: r#"{
  "using_ios": false,
  "using_android": true,
  "analytics": true,
  "firestore": false,
  "external_push_client_only": false
}
"#,
            }),
            command: None,
        },
    );

    // Appium driver declares mocha as a peer dependency and its postinstall
    // fails without it.
    table.insert(
        "nativescript-dev-appium",
        ExceptionRule {
            file: None,
            command: Some("npm i --save-dev mocha"),
        },
    );

    // The background-http demo server config is read at build time; an
    // empty stub keeps webpack's copy step from failing.
    table.insert(
        "nativescript-background-http",
        ExceptionRule {
            file: Some(FilePatch {
                path: "app/upload-config.json",
                content: "{}\n",
            }),
            command: None,
        },
    );

    table
});

pub fn lookup(plugin_name: &str) -> Option<&'static ExceptionRule> {
    EXCEPTIONS.get(plugin_name)
}
