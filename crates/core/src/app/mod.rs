//! Apps: the root of the configuration tree
//!
//! An [`App`] lives in a directory as a single JSON file and owns an ordered
//! list of environments. Saving always writes that file first. A freshly
//! created app is *pending* until the remote service confirms its
//! registration; while pending, every save retries the registration, and a
//! missing connection is not treated as a failure.
//!
//! ```ignore
//! let ctx = Arc::new(Context::from_store(&mut store, remote).await?);
//!
//! let mut app = App::create(&dir, Some("billing"), ctx.clone()).await?;
//! app.find_env("staging").set("DATABASE_URL", url).await?;
//! app.save().await?;
//!
//! // Later, possibly offline
//! let mut app = App::load(&dir, ctx).await?;
//! let values = app.find_env("staging").values().await?;
//! ```

mod local_only;

pub use local_only::LocalOnlyTracker;

use crate::environment::Env;
use crate::{Context, Error, Result, json_comment};
use cellar_store::{RemoteApp, ValueHandle};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const BANNER: &[&str] = &[
    "This file was automatically generated by cellar",
    "DO NOT EDIT BY HAND (unless resolving a merge conflict)",
    "Use the cellar command line tool to edit the contents of this file",
];

/// Remote synchronization state of an app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Only known locally; the remote service has not confirmed it yet
    Pending,
    /// Registered with the remote service. Terminal.
    Confirmed,
}

/// On-disk shape of the app file
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppFile {
    name: String,
    id: Uuid,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    local_only: bool,
    #[serde(default)]
    envs: IndexMap<String, IndexMap<String, ValueHandle>>,
}

/// An application and its environments
#[derive(Debug)]
pub struct App {
    dir: PathBuf,
    ctx: Arc<Context>,
    id: Uuid,
    name: String,
    envs: Vec<Env>,
    state: SyncState,
    tracker: LocalOnlyTracker,
}

impl App {
    /// Create a new app in `dir` and save it.
    ///
    /// The name defaults to the directory's final component. The app starts
    /// pending with the configured default environments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AppExists`] if `dir` already holds an app file; that
    /// file is left untouched.
    pub async fn create(dir: &Path, name: Option<&str>, ctx: Arc<Context>) -> Result<Self> {
        ctx.validate()?;
        let dir = absolute(dir)?;
        let path = ctx.app_file_in(&dir);

        debug!(dir = %dir.display(), "Making sure no app exists yet");
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Error::io(e, Some(path.clone()), "try_exists"))?;
        if exists {
            return Err(Error::app_exists(&dir));
        }

        let name = match name {
            Some(name) => name.to_string(),
            None => dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    Error::configuration(format!(
                        "Cannot derive an app name from {}",
                        dir.display()
                    ))
                })?,
        };

        let mut app = Self {
            tracker: LocalOnlyTracker::for_context(&ctx),
            dir,
            id: Uuid::new_v4(),
            name,
            envs: Vec::new(),
            state: SyncState::Pending,
            ctx,
        };

        let default_envs = app.ctx.settings().default_envs.clone();
        for env_name in &default_envs {
            app.find_env(env_name);
        }

        info!(app = %app.name, id = %app.id, "Created app");
        app.save().await?;
        Ok(app)
    }

    /// Load the app stored in `dir`.
    ///
    /// Whether the app is pending is decided by the local-only registry, not
    /// by the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAppFound`] if there is no app file, or an I/O or
    /// parse error if it cannot be read.
    pub async fn load(dir: &Path, ctx: Arc<Context>) -> Result<Self> {
        ctx.validate()?;
        let dir = absolute(dir)?;
        let path = ctx.app_file_in(&dir);

        debug!(path = %path.display(), "Loading app file");
        let raw = crate::fs::read_optional(&path)
            .await?
            .ok_or_else(|| Error::no_app_found(&ctx.settings().app_file, &dir))?;

        let file: AppFile =
            json_comment::parse(&raw).map_err(|e| Error::parse(&path, e.to_string()))?;

        let tracker = LocalOnlyTracker::for_context(&ctx);
        let pending = tracker.is_pending(file.id).await?;
        if pending != file.local_only {
            warn!(
                app = %file.name,
                registry_pending = pending,
                file_pending = file.local_only,
                "App file disagrees with local-only registry, using registry"
            );
        }

        let envs = file
            .envs
            .into_iter()
            .map(|(env_name, handles)| Env::from_handles(env_name, handles, ctx.remote().clone()))
            .collect();

        Ok(Self {
            dir,
            id: file.id,
            name: file.name,
            envs,
            state: if pending {
                SyncState::Pending
            } else {
                SyncState::Confirmed
            },
            tracker,
            ctx,
        })
    }

    /// Write the app file, then register with the remote service if pending.
    ///
    /// While pending:
    /// - the app is listed in the local-only registry before the remote call
    /// - on success it is removed, becomes confirmed, and the file is
    ///   rewritten without the pending marker
    /// - if the service is unreachable the app stays pending and the save
    ///   still succeeds
    /// - any other remote error is returned; the app stays pending
    ///
    /// A confirmed app never contacts the remote service here.
    pub async fn save(&mut self) -> Result<()> {
        self.write_file().await?;

        match self.state {
            SyncState::Confirmed => Ok(()),
            SyncState::Pending => self.register_remote().await,
        }
    }

    async fn register_remote(&mut self) -> Result<()> {
        self.tracker.mark_pending(self.id, &self.dir).await?;

        debug!(app = %self.name, "Registering app with the remote service");
        let result = self
            .ctx
            .remote()
            .create_app(&self.remote_id(), &self.remote_format())
            .await;

        match result {
            Ok(()) => {
                self.tracker.mark_confirmed(self.id).await?;
                self.state = SyncState::Confirmed;
                info!(app = %self.name, id = %self.id, "App confirmed by remote");
                self.write_file().await
            }
            Err(e) if e.is_no_connection() => {
                warn!(
                    app = %self.name,
                    error = %e,
                    "Remote unreachable, app stays local-only until a later save"
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self) -> Result<()> {
        let path = self.file_path();
        debug!(path = %path.display(), "Saving app file");

        let contents = json_comment::write(&self.file_format(), BANNER)
            .map_err(|e| Error::parse(&path, e.to_string()))?;
        crate::fs::write_atomic(&path, &contents).await
    }

    fn file_format(&self) -> AppFile {
        let envs = self
            .envs
            .iter()
            .map(|env| (env.name().to_string(), env.handles()))
            .collect();

        AppFile {
            name: self.name.clone(),
            id: self.id,
            local_only: self.state == SyncState::Pending,
            envs,
        }
    }

    fn remote_format(&self) -> RemoteApp {
        RemoteApp::new(&self.name)
    }

    /// Identifier under which the remote service knows this app
    #[must_use]
    pub fn remote_id(&self) -> String {
        self.id.to_string()
    }

    /// Stable app id
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// App name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute directory holding the app file
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the app file
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.ctx.app_file_in(&self.dir)
    }

    /// Current synchronization state
    #[must_use]
    pub fn sync_state(&self) -> SyncState {
        self.state
    }

    /// Whether the remote service has confirmed this app
    #[must_use]
    pub fn is_remote_confirmed(&self) -> bool {
        self.state == SyncState::Confirmed
    }

    /// Environments in order
    #[must_use]
    pub fn envs(&self) -> &[Env] {
        &self.envs
    }

    /// Look up an environment without creating it
    #[must_use]
    pub fn env(&self, name: &str) -> Option<&Env> {
        self.envs.iter().find(|e| e.name() == name)
    }

    /// Get the environment called `name`, appending an empty one if missing.
    ///
    /// This is the only lookup that adds environments.
    pub fn find_env(&mut self, name: &str) -> &mut Env {
        if let Some(index) = self.envs.iter().position(|e| e.name() == name) {
            return &mut self.envs[index];
        }

        debug!(app = %self.name, env = name, "Environment does not exist, adding it");
        self.envs.push(Env::new(name, self.ctx.remote().clone()));
        let last = self.envs.len() - 1;
        &mut self.envs[last]
    }

    /// Get or create the configured default environment
    pub fn default_env(&mut self) -> &mut Env {
        let name = self.ctx.settings().default_env.clone();
        self.find_env(&name)
    }
}

fn absolute(dir: &Path) -> Result<PathBuf> {
    std::path::absolute(dir).map_err(|e| Error::io(e, Some(dir.to_path_buf()), "absolute"))
}
