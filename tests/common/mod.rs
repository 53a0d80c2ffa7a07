//! Shared test double for the shell: records every command, scaffolds fake
//! projects for `tns create`, and fails or errors on demand.
#![allow(dead_code)] // each test binary uses a different slice of this module

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use nscheck::exec::CommandRunner;

/// What `tns create` leaves behind in the default template.
pub const DEFAULT_TEMPLATE_SOURCE: &str = "\
import { Observable } from 'tns-core-modules/data/observable';

export class HelloWorldModel extends Observable {
    public onTap() {
        this.counter--;
    }
}
";

pub struct FakeRunner {
    commands: Mutex<Vec<(PathBuf, String)>>,
    /// Commands containing any of these substrings exit non-zero.
    failures: Vec<String>,
    /// Commands containing any of these substrings fail to spawn at all.
    errors: Vec<String>,
    /// Source written to `app/main-view-model.ts` by the fake `tns create`.
    template_source: String,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            failures: Vec::new(),
            errors: Vec::new(),
            template_source: DEFAULT_TEMPLATE_SOURCE.to_string(),
        }
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.failures.push(needle.to_string());
        self
    }

    pub fn erroring_on(mut self, needle: &str) -> Self {
        self.errors.push(needle.to_string());
        self
    }

    pub fn with_template_source(mut self, source: &str) -> Self {
        self.template_source = source.to_string();
        self
    }

    /// Every command run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }

    fn record(&self, cwd: &Path, command: &str) {
        self.commands
            .lock()
            .unwrap()
            .push((cwd.to_path_buf(), command.to_string()));
    }

    /// Mimic `tns create <name>`: materialize a minimal scaffold under cwd.
    fn fake_create(&self, cwd: &Path, command: &str) {
        let name = command
            .split_whitespace()
            .nth(2)
            .expect("tns create without a project name");
        let project = cwd.join(name);
        std::fs::create_dir_all(project.join("app")).unwrap();
        std::fs::write(project.join("package.json"), "{\"nativescript\": {}}\n").unwrap();
        std::fs::write(project.join("app/package.json"), "{\"main\": \"main.js\"}\n").unwrap();
        std::fs::write(project.join("app/main-view-model.ts"), &self.template_source).unwrap();
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, cwd: &Path, command: &str) -> Result<bool> {
        self.record(cwd, command);
        if self.errors.iter().any(|n| command.contains(n)) {
            bail!("spawn failed for `{command}`");
        }
        if self.failures.iter().any(|n| command.contains(n)) {
            return Ok(false);
        }
        if command.starts_with("tns create ") {
            self.fake_create(cwd, command);
        }
        Ok(true)
    }

    async fn run_capture(&self, cwd: &Path, command: &str) -> Result<String> {
        self.record(cwd, command);
        if self.errors.iter().any(|n| command.contains(n)) {
            bail!("spawn failed for `{command}`");
        }
        Ok("6.0.0\n".to_string())
    }
}
