//! A single key bound to a remote value

use crate::{Error, Result};
use cellar_store::{RemoteService, ValueHandle};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One key of an environment.
///
/// The cell stores only the handle the remote service gave back for its value.
/// Reads and writes go through the service; the last value seen is cached.
#[derive(Clone)]
pub struct Cell {
    key: String,
    handle: Option<ValueHandle>,
    cached: Option<String>,
    remote: Arc<dyn RemoteService>,
}

impl Cell {
    /// Create a cell, optionally already bound to a handle
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        handle: Option<ValueHandle>,
        remote: Arc<dyn RemoteService>,
    ) -> Self {
        Self {
            key: key.into(),
            handle,
            cached: None,
            remote,
        }
    }

    /// Key of this cell
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current handle, if a value has ever been written
    #[must_use]
    pub fn handle(&self) -> Option<&ValueHandle> {
        self.handle.as_ref()
    }

    /// Last value read or written through this cell
    #[must_use]
    pub fn cached_value(&self) -> Option<&str> {
        self.cached.as_deref()
    }

    /// Whether this cell has a handle to resolve
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// Resolve the cell's value, using the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnboundCell`] if nothing was ever written, or the
    /// remote service's error if resolution fails.
    pub async fn get_value(&mut self) -> Result<String> {
        if let Some(value) = &self.cached {
            return Ok(value.clone());
        }

        let handle = self.handle.as_ref().ok_or_else(|| Error::UnboundCell {
            key: self.key.clone(),
        })?;

        debug!(key = %self.key, %handle, "Resolving value");
        let value = self.remote.get_value(handle).await?;
        self.cached = Some(value.clone());
        Ok(value)
    }

    /// Write a value through the remote service and keep the returned handle.
    pub async fn set_value(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        let handle = self.remote.set_value(&value).await?;

        debug!(key = %self.key, %handle, "Stored value");
        self.handle = Some(handle);
        self.cached = Some(value);
        Ok(())
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values stay out of debug output
        f.debug_struct("Cell")
            .field("key", &self.key)
            .field("handle", &self.handle)
            .field("cached", &self.cached.is_some())
            .finish()
    }
}
