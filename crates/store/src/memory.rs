//! In-memory remote service
//!
//! Keeps registered apps and values in process memory. It can be switched
//! offline to simulate an unreachable service, which makes it the reference
//! collaborator for exercising offline-first behaviour.

use crate::{RemoteApp, RemoteError, RemoteService, ValueHandle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

const MEMORY_HOST: &str = "memory://local";

#[derive(Debug, Default)]
struct MemoryState {
    apps: HashMap<String, RemoteApp>,
    values: HashMap<ValueHandle, String>,
}

/// Remote service backed by process memory
#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: RwLock<MemoryState>,
    offline: AtomicBool,
    create_app_calls: AtomicUsize,
}

impl MemoryRemote {
    /// Create an empty, online service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty service that starts offline
    #[must_use]
    pub fn offline() -> Self {
        let remote = Self::new();
        remote.set_offline(true);
        remote
    }

    /// Toggle simulated unreachability
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Whether the service is currently simulating unreachability
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Number of `create_app` calls received, including failed ones
    #[must_use]
    pub fn create_app_calls(&self) -> usize {
        self.create_app_calls.load(Ordering::SeqCst)
    }

    /// Registered app for a remote id, if any
    pub async fn app(&self, remote_id: &str) -> Option<RemoteApp> {
        self.state.read().await.apps.get(remote_id).cloned()
    }

    /// Number of registered apps
    pub async fn app_count(&self) -> usize {
        self.state.read().await.apps.len()
    }

    /// Store a value under a caller-chosen handle.
    ///
    /// Works even while offline; it seeds state rather than serving a request.
    pub async fn insert_value(&self, handle: impl Into<ValueHandle>, value: impl Into<String>) {
        self.state
            .write()
            .await
            .values
            .insert(handle.into(), value.into());
    }

    fn ensure_online(&self) -> Result<(), RemoteError> {
        if self.is_offline() {
            return Err(RemoteError::no_connection(MEMORY_HOST));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteService for MemoryRemote {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn create_app(&self, remote_id: &str, app: &RemoteApp) -> Result<(), RemoteError> {
        self.create_app_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;

        let mut state = self.state.write().await;
        if state.apps.contains_key(remote_id) {
            return Err(RemoteError::AppExists {
                remote_id: remote_id.to_string(),
            });
        }

        debug!(remote_id, name = %app.name, "Registered app in memory");
        state.apps.insert(remote_id.to_string(), app.clone());
        Ok(())
    }

    async fn get_value(&self, handle: &ValueHandle) -> Result<String, RemoteError> {
        self.ensure_online()?;

        self.state
            .read()
            .await
            .values
            .get(handle)
            .cloned()
            .ok_or_else(|| RemoteError::ValueNotFound {
                handle: handle.to_string(),
            })
    }

    async fn set_value(&self, value: &str) -> Result<ValueHandle, RemoteError> {
        self.ensure_online()?;

        let handle = ValueHandle::new(uuid::Uuid::new_v4().to_string());
        self.state
            .write()
            .await
            .values
            .insert(handle.clone(), value.to_string());
        Ok(handle)
    }
}
