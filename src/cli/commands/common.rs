//! Helpers shared by command handlers

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::path::Path;

use crate::Config;

/// Resolve a user-supplied path against the project root.
///
/// Relative paths are taken relative to the root, not the working directory,
/// so `charter --root site compile agents/a.md` means `site/agents/a.md`.
pub fn resolve_user_path(config: &Config, path: &Path) -> Result<Utf8PathBuf> {
    let path = Utf8PathBuf::try_from(path.to_path_buf()).context("Path is not valid UTF-8")?;
    Ok(if path.is_absolute() {
        path
    } else {
        config.root().join(path)
    })
}

/// Pretty JSON for stdout
pub fn emit_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to emit JSON")
}
