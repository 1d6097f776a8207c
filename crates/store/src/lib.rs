//! Remote service seam for cellar
//!
//! The remote service is the system of record for two things: app
//! registration and value storage. Values are addressed by opaque
//! [`ValueHandle`]s that the service hands back on every write; the local app
//! file only ever stores handles, never values.
//!
//! Implementations must report unreachability as
//! [`RemoteError::NoConnection`] so callers can defer synchronization instead
//! of failing:
//!
//! ```ignore
//! use cellar_store::{MemoryRemote, RemoteApp, RemoteService};
//!
//! let remote = MemoryRemote::new();
//! let handle = remote.set_value("postgres://localhost/app").await?;
//! assert_eq!(remote.get_value(&handle).await?, "postgres://localhost/app");
//!
//! match remote.create_app(&app_id, &RemoteApp::new("billing")).await {
//!     Err(e) if e.is_no_connection() => { /* try again later */ }
//!     other => other?,
//! }
//! ```

mod error;
mod memory;
mod types;

pub use error::RemoteError;
pub use memory::MemoryRemote;
pub use types::{RemoteApp, ValueHandle};

use async_trait::async_trait;

/// Trait for talking to the remote value/app service.
///
/// Implementors must provide all three operations plus a
/// [`provider_name`](RemoteService::provider_name) used in log output.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Identifier of this service implementation (e.g. `"memory"`, `"http"`).
    fn provider_name(&self) -> &'static str;

    /// Register an app under its remote-visible identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::AppExists`] if the identifier is already taken
    /// and [`RemoteError::NoConnection`] if the service cannot be reached.
    async fn create_app(&self, remote_id: &str, app: &RemoteApp) -> Result<(), RemoteError>;

    /// Resolve a value handle to its current value.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::ValueNotFound`] for an unknown handle.
    async fn get_value(&self, handle: &ValueHandle) -> Result<String, RemoteError>;

    /// Store a value and return the handle that now addresses it.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NoConnection`] if the service cannot be reached.
    async fn set_value(&self, value: &str) -> Result<ValueHandle, RemoteError>;
}
