//! Offline-first configuration for cellar
//!
//! This crate owns the local side of cellar:
//! - Apps, their environments, and the cells that bind keys to remote values
//! - The app file format and the deferred remote registration protocol
//! - The local-only registry and the sweep that retries pending apps
//! - Global settings and the `.cellar` dotfile codec
//!
//! # Overview
//!
//! Every operation takes an explicit [`Context`] carrying the loaded
//! [`Settings`], the [`RemoteService`](cellar_store::RemoteService) and the
//! path of the local-only registry. Apps are created and edited entirely on
//! disk; registration with the remote service happens on save and is retried
//! until it succeeds. An unreachable service never fails a save.

#![expect(
    clippy::missing_errors_doc,
    reason = "Error variants are documented on the Error type"
)]

pub mod app;
pub mod cell;
pub mod config;
pub mod context;
pub mod dotfile;
pub mod environment;
mod error;
mod fs;
pub mod json_comment;
pub mod paths;
pub mod registry;
pub mod sync;

pub use app::{App, LocalOnlyTracker, SyncState};
pub use cell::Cell;
pub use config::{ConfigStore, Settings};
pub use context::Context;
pub use environment::{Env, MAX_IN_FLIGHT};
pub use error::{Error, Result};
pub use registry::{LocalOnlyEntry, LocalOnlyRegistry};
pub use sync::{SweepFailure, SweepReport, sync_pending};

// Re-export the remote seam so callers need only one import
pub use cellar_store::{MemoryRemote, RemoteApp, RemoteError, RemoteService, ValueHandle};
