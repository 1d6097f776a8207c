//! Environments: named, ordered collections of cells
//!
//! The order of cells matters. When two cells contribute the same key, the one
//! later in the list wins, no matter which resolution finished first.

use crate::cell::Cell;
use crate::{Error, Result, dotfile};
use cellar_store::{RemoteService, ValueHandle};
use futures::stream::{self, StreamExt, TryStreamExt};
use indexmap::IndexMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of cell resolutions in flight at once
pub const MAX_IN_FLIGHT: usize = 100;

/// A named environment such as `development` or `production`
#[derive(Clone)]
pub struct Env {
    name: String,
    cells: Vec<Cell>,
    remote: Arc<dyn RemoteService>,
}

impl Env {
    /// Create an empty environment
    #[must_use]
    pub fn new(name: impl Into<String>, remote: Arc<dyn RemoteService>) -> Self {
        let name = name.into();
        debug!(env = %name, "Environment initialized");
        Self {
            name,
            cells: Vec::new(),
            remote,
        }
    }

    /// Rebuild an environment from its serialized key→handle map, keeping order
    #[must_use]
    pub fn from_handles(
        name: impl Into<String>,
        handles: IndexMap<String, ValueHandle>,
        remote: Arc<dyn RemoteService>,
    ) -> Self {
        let mut env = Self::new(name, remote);
        for (key, handle) in handles {
            let cell = Cell::new(key, Some(handle), env.remote.clone());
            env.cells.push(cell);
        }
        env
    }

    /// Name of this environment
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cells in structural order
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Look up a cell without creating it
    #[must_use]
    pub fn cell(&self, key: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.key() == key)
    }

    /// Get the cell for `key`, appending a new unbound cell if there is none.
    ///
    /// This is the only way a lookup adds cells; [`cell`](Self::cell) never
    /// does.
    pub fn find_cell(&mut self, key: &str) -> &mut Cell {
        if let Some(index) = self.cells.iter().position(|c| c.key() == key) {
            return &mut self.cells[index];
        }

        debug!(env = %self.name, key, "Key does not exist yet, adding cell");
        self.cells.push(Cell::new(key, None, self.remote.clone()));
        let last = self.cells.len() - 1;
        &mut self.cells[last]
    }

    /// Append a cell without checking for an existing key.
    pub fn push_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Set `key` to `value`, creating the cell if needed.
    pub async fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        debug!(env = %self.name, key, "Setting value");
        self.find_cell(key).set_value(value).await
    }

    /// Resolve and merge every cell's value.
    ///
    /// At most [`MAX_IN_FLIGHT`] resolutions run at once. Results are merged in
    /// cell order, so a later cell overrides an earlier one with the same key.
    /// Cells that were never written contribute nothing.
    ///
    /// # Errors
    ///
    /// Fails as soon as any single resolution fails.
    pub async fn values(&mut self) -> Result<IndexMap<String, String>> {
        debug!(env = %self.name, cells = self.cells.len(), "Loading values");

        if self.cells.is_empty() {
            return Ok(IndexMap::new());
        }

        let resolved: Vec<(String, String)> =
            stream::iter(self.cells.iter_mut().filter(|cell| cell.is_bound()))
                .map(|cell| async move {
                    let value = cell.get_value().await?;
                    Ok::<_, Error>((cell.key().to_string(), value))
                })
                .buffered(MAX_IN_FLIGHT)
                .try_collect()
                .await?;

        let mut merged = IndexMap::with_capacity(resolved.len());
        for (key, value) in resolved {
            merged.insert(key, value);
        }
        Ok(merged)
    }

    /// Key→handle map as stored in the app file.
    ///
    /// Unbound cells are skipped; for repeated keys the later handle wins.
    #[must_use]
    pub fn handles(&self) -> IndexMap<String, ValueHandle> {
        let mut map = IndexMap::with_capacity(self.cells.len());
        for cell in &self.cells {
            if let Some(handle) = cell.handle() {
                map.insert(cell.key().to_string(), handle.clone());
            }
        }
        map
    }

    /// Render the merged values as dotfile contents.
    pub async fn to_dotfile(&mut self) -> Result<String> {
        let values = self.values().await?;
        Ok(dotfile::render(&values))
    }

    /// Write the merged values to the dotfile in `dir`.
    pub async fn write_dotfile(&mut self, dir: &Path) -> Result<()> {
        let values = self.values().await?;
        dotfile::write(dir, &values).await?;
        debug!(env = %self.name, dir = %dir.display(), count = values.len(), "Wrote dotfile");
        Ok(())
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("name", &self.name)
            .field("cells", &self.cells)
            .finish()
    }
}
