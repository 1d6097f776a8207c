//! Local-only tracking collaborator for [`App`](super::App)

use crate::registry::LocalOnlyRegistry;
use crate::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Records whether an app still awaits remote confirmation.
///
/// Every call re-opens the registry file so that several apps in one process
/// never work from a stale copy. Trackers built from the same [`Context`]
/// share one lock, held from open to save, so concurrent saves never drop
/// each other's entries.
#[derive(Debug, Clone)]
pub struct LocalOnlyTracker {
    registry_file: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl LocalOnlyTracker {
    /// Track apps in the registry stored at `registry_file`, with a lock of its own
    #[must_use]
    pub fn new(registry_file: impl Into<PathBuf>) -> Self {
        Self {
            registry_file: registry_file.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Track apps in the context's registry, sharing the context's lock
    #[must_use]
    pub fn for_context(ctx: &Context) -> Self {
        Self {
            registry_file: ctx.registry_file().to_path_buf(),
            lock: ctx.registry_lock(),
        }
    }

    /// Whether the app is listed as pending
    pub async fn is_pending(&self, app_id: Uuid) -> Result<bool> {
        let _guard = self.lock.lock().await;
        Ok(self.open().await?.contains(app_id))
    }

    /// List the app as pending; a no-op if it already is
    pub async fn mark_pending(&self, app_id: Uuid, dir: &Path) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.open().await?.add(app_id, dir).await?;
        Ok(())
    }

    /// Drop the app from the pending list; a no-op if it is not listed
    pub async fn mark_confirmed(&self, app_id: Uuid) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.open().await?.remove(app_id).await?;
        Ok(())
    }

    async fn open(&self) -> Result<LocalOnlyRegistry> {
        LocalOnlyRegistry::open(&self.registry_file).await
    }
}
