//! Per-user configuration store
//!
//! Settings live in a small JSON file (`~/.cellar/config.json` by default).
//! The store starts out unloaded; the first [`ConfigStore::load`] reads the
//! file, writing the defaults first if it does not exist yet.

use crate::{Error, Result, paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings read from the config store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Remote service endpoint
    #[serde(default = "default_host")]
    pub host: String,

    /// File name of the app file inside an app directory
    #[serde(default = "default_app_file")]
    pub app_file: String,

    /// Environment used when none is named explicitly
    #[serde(default = "default_env")]
    pub default_env: String,

    /// Environments every newly created app starts with
    #[serde(default = "default_envs")]
    pub default_envs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            app_file: default_app_file(),
            default_env: default_env(),
            default_envs: default_envs(),
        }
    }
}

fn default_host() -> String {
    "https://api.cellar.sh".to_string()
}

fn default_app_file() -> String {
    "cellar.json".to_string()
}

fn default_env() -> String {
    "development".to_string()
}

fn default_envs() -> Vec<String> {
    vec![
        "development".to_string(),
        "staging".to_string(),
        "production".to_string(),
    ]
}

#[derive(Debug, Clone)]
enum State {
    Unloaded,
    Loaded(Settings),
}

/// File-backed settings with an explicit loaded/unloaded lifecycle
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    state: State,
}

impl ConfigStore {
    /// Create an unloaded store backed by `path`
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: State::Unloaded,
        }
    }

    /// Create an unloaded store at [`paths::config_file`]
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(paths::config_file()?))
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the settings have been read yet
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded(_))
    }

    /// Loaded settings, or `None` before the first [`load`](Self::load)
    #[must_use]
    pub fn settings(&self) -> Option<&Settings> {
        match &self.state {
            State::Loaded(settings) => Some(settings),
            State::Unloaded => None,
        }
    }

    /// Read the settings, creating the file with defaults if it is missing.
    ///
    /// Subsequent calls return the already-loaded settings without touching
    /// the file.
    pub async fn load(&mut self) -> Result<&Settings> {
        if let State::Unloaded = self.state {
            let settings = self.read_or_init().await?;
            self.state = State::Loaded(settings);
        }

        self.settings()
            .ok_or_else(|| Error::configuration("Config store failed to load"))
    }

    /// Apply `change` to the settings and write them back.
    pub async fn update<F>(&mut self, change: F) -> Result<&Settings>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.load().await?.clone();
        change(&mut settings);
        self.write(&settings).await?;
        self.state = State::Loaded(settings);

        self.settings()
            .ok_or_else(|| Error::configuration("Config store failed to load"))
    }

    async fn read_or_init(&self) -> Result<Settings> {
        debug!(path = %self.path.display(), "Reading config file");

        match crate::fs::read_optional(&self.path).await? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| Error::parse(&self.path, e.to_string()))
            }
            None => {
                let settings = Settings::default();
                self.write(&settings).await?;
                info!(path = %self.path.display(), "Wrote default config");
                Ok(settings)
            }
        }
    }

    async fn write(&self, settings: &Settings) -> Result<()> {
        let contents = serde_json::to_string_pretty(settings)
            .map_err(|e| Error::parse(&self.path, e.to_string()))?;
        crate::fs::write_atomic(&self.path, &contents).await
    }
}
