//! Explicit context handed to apps, environments and cells

use crate::config::{ConfigStore, Settings};
use crate::{Error, Result, paths};
use cellar_store::RemoteService;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything an [`App`](crate::App) needs from its surroundings.
///
/// Built once from loaded settings and shared by reference count; nothing is
/// read lazily behind the caller's back.
#[derive(Clone)]
pub struct Context {
    settings: Settings,
    remote: Arc<dyn RemoteService>,
    registry_file: PathBuf,
    registry_lock: Arc<Mutex<()>>,
}

impl Context {
    /// Create a context from already-loaded settings
    #[must_use]
    pub fn new(
        settings: Settings,
        remote: Arc<dyn RemoteService>,
        registry_file: PathBuf,
    ) -> Self {
        Self {
            settings,
            remote,
            registry_file,
            registry_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a context from a config store, loading it if necessary.
    ///
    /// The local-only registry is placed at [`paths::local_only_file`].
    pub async fn from_store(
        store: &mut ConfigStore,
        remote: Arc<dyn RemoteService>,
    ) -> Result<Self> {
        let settings = store.load().await?.clone();
        Ok(Self::new(settings, remote, paths::local_only_file()?))
    }

    /// Settings in effect
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Remote value/app service
    #[must_use]
    pub fn remote(&self) -> &Arc<dyn RemoteService> {
        &self.remote
    }

    /// Path of the local-only registry file
    #[must_use]
    pub fn registry_file(&self) -> &Path {
        &self.registry_file
    }

    /// Lock serializing local-only registry changes made through this context
    pub(crate) fn registry_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.registry_lock)
    }

    /// Path of the app file inside `dir`
    #[must_use]
    pub fn app_file_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.settings.app_file)
    }

    /// Reject settings that cannot produce a usable app file path
    pub(crate) fn validate(&self) -> Result<()> {
        if self.settings.app_file.trim().is_empty() {
            return Err(Error::configuration("appFile must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("remote", &self.remote.provider_name())
            .field("registry_file", &self.registry_file)
            .finish()
    }
}
