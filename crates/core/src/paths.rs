//! Centralized path management for cellar's per-user files.
//!
//! | File | Default location |
//! |------|------------------|
//! | Config store | `~/.cellar/config.json` |
//! | Local-only registry | `~/.cellar/local_only.json` |
//!
//! Set `CELLAR_HOME` to move both files, e.g. for tests and CI.

use crate::{Error, Result};
use std::path::PathBuf;

/// Get the cellar home directory.
///
/// Resolution order:
/// 1. `CELLAR_HOME` environment variable
/// 2. `~/.cellar`
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CELLAR_HOME")
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    let base = dirs::home_dir()
        .ok_or_else(|| Error::configuration("Could not determine home directory"))?;

    Ok(base.join(".cellar"))
}

/// Get the path to the config store file.
pub fn config_file() -> Result<PathBuf> {
    Ok(home_dir()?.join("config.json"))
}

/// Get the path to the local-only registry file.
///
/// This file lists apps that have been saved locally but not yet registered
/// with the remote service.
pub fn local_only_file() -> Result<PathBuf> {
    Ok(home_dir()?.join("local_only.json"))
}
