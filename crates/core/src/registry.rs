//! Registry of apps that exist only locally
//!
//! An app is added here before the remote service is asked to register it and
//! removed once the service confirms. Anything still listed is pending and can
//! be retried by a later sweep. Both `add` and `remove` are idempotent so the
//! same sweep can be run any number of times.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// One pending app
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocalOnlyEntry {
    /// Id of the pending app
    pub app_id: Uuid,
    /// Directory holding the app file
    pub path: PathBuf,
}

/// Durable list of [`LocalOnlyEntry`] values, keyed by app id
#[derive(Debug, Clone)]
pub struct LocalOnlyRegistry {
    file: PathBuf,
    entries: Vec<LocalOnlyEntry>,
}

impl LocalOnlyRegistry {
    /// Open the registry stored at `file`; a missing file is an empty registry.
    pub async fn open(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();

        let entries = match crate::fs::read_optional(&file).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::parse(&file, format!("Failed to parse registry: {e}")))?,
            None => {
                debug!(path = %file.display(), "No local-only registry yet");
                Vec::new()
            }
        };

        Ok(Self { file, entries })
    }

    /// Path of the backing file
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Add an app, persisting only if something changed.
    ///
    /// Adding an app that is already listed leaves a single entry; its path is
    /// refreshed if the app moved. Returns whether the registry changed.
    pub async fn add(&mut self, app_id: Uuid, path: &Path) -> Result<bool> {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.app_id == app_id) {
            if existing.path == path {
                return Ok(false);
            }
            existing.path = path.to_path_buf();
        } else {
            self.entries.push(LocalOnlyEntry {
                app_id,
                path: path.to_path_buf(),
            });
        }

        self.save().await?;
        info!(%app_id, path = %path.display(), "Marked app as local-only");
        Ok(true)
    }

    /// Remove an app. Removing an app that is not listed succeeds.
    ///
    /// Returns whether the registry changed.
    pub async fn remove(&mut self, app_id: Uuid) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.app_id != app_id);

        if self.entries.len() == before {
            return Ok(false);
        }

        self.save().await?;
        info!(%app_id, "Removed app from local-only registry");
        Ok(true)
    }

    /// Whether an app is listed
    #[must_use]
    pub fn contains(&self, app_id: Uuid) -> bool {
        self.entries.iter().any(|e| e.app_id == app_id)
    }

    /// All pending entries in insertion order
    #[must_use]
    pub fn list(&self) -> &[LocalOnlyEntry] {
        &self.entries
    }

    /// Number of pending entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| Error::parse(&self.file, format!("Failed to serialize registry: {e}")))?;
        crate::fs::write_atomic(&self.file, &contents).await?;

        debug!(count = self.entries.len(), "Saved local-only registry");
        Ok(())
    }
}
