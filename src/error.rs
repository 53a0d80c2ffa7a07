// SPDX-License-Identifier: MIT
//! error.rs — distinguished fatal conditions.
//!
//! Most failures in this harness are ordinary data: a build that exits
//! non-zero is a recorded result, and a plugin whose install blows up is
//! logged and skipped. Only two conditions abort a whole run, and callers
//! need to tell them apart from the generic `anyhow` chain.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The scaffold template's source layout changed upstream and the patch
    /// logic is stale. This is a maintainer alert, not a plugin failure.
    #[error("template drift: expected marker missing after patching {}", file.display())]
    TemplateDrift { file: PathBuf },

    /// Template creation or test-root bootstrap failed; no later plugin
    /// test can be trusted without a clean template.
    #[error("setup failed: {0}")]
    Setup(String),
}

impl CheckError {
    /// True when `err`'s chain bottoms out in a template-drift condition.
    pub fn is_template_drift(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<CheckError>(),
            Some(CheckError::TemplateDrift { .. })
        )
    }
}
