//! Retry remote registration for every pending app.
//!
//! The sweep walks the local-only registry, loads each listed app from its
//! directory and saves it, which retries registration. It never aborts part
//! way: per-app problems end up in the [`SweepReport`] and the next entry is
//! tried. Running it again after a partial failure is always safe.

use crate::registry::LocalOnlyRegistry;
use crate::{App, Context, Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// An app whose sweep attempt failed
#[derive(Debug)]
pub struct SweepFailure {
    /// Id listed in the registry
    pub app_id: Uuid,
    /// Directory listed in the registry
    pub path: PathBuf,
    /// What went wrong
    pub error: Error,
}

/// Outcome of [`sync_pending`]
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Apps the remote service confirmed during this sweep
    pub confirmed: Vec<Uuid>,
    /// Apps still pending, usually because the service was unreachable
    pub still_pending: Vec<Uuid>,
    /// Entries whose directory no longer holds that app. Left in the registry.
    pub missing: Vec<(Uuid, PathBuf)>,
    /// Apps that failed to load or save
    pub failed: Vec<SweepFailure>,
}

impl SweepReport {
    /// Whether every listed app is now confirmed
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.still_pending.is_empty() && self.missing.is_empty() && self.failed.is_empty()
    }

    /// Number of registry entries the sweep looked at
    #[must_use]
    pub fn total(&self) -> usize {
        self.confirmed.len() + self.still_pending.len() + self.missing.len() + self.failed.len()
    }
}

/// Load and save every app listed in the local-only registry.
///
/// # Errors
///
/// Only fails if the registry itself cannot be read.
#[instrument(skip(ctx), fields(registry = %ctx.registry_file().display()))]
pub async fn sync_pending(ctx: &Arc<Context>) -> Result<SweepReport> {
    let registry = LocalOnlyRegistry::open(ctx.registry_file()).await?;
    let entries = registry.list().to_vec();
    info!(count = entries.len(), "Syncing pending apps");

    let mut report = SweepReport::default();
    for entry in entries {
        let mut app = match App::load(&entry.path, Arc::clone(ctx)).await {
            Ok(app) => app,
            Err(Error::NoAppFound { .. }) => {
                warn!(app_id = %entry.app_id, path = %entry.path.display(), "Pending app is gone");
                report.missing.push((entry.app_id, entry.path));
                continue;
            }
            Err(error) => {
                warn!(app_id = %entry.app_id, %error, "Failed to load pending app");
                report.failed.push(SweepFailure {
                    app_id: entry.app_id,
                    path: entry.path,
                    error,
                });
                continue;
            }
        };

        if app.id() != entry.app_id {
            warn!(
                app_id = %entry.app_id,
                found = %app.id(),
                path = %entry.path.display(),
                "Directory now holds a different app"
            );
            report.missing.push((entry.app_id, entry.path));
            continue;
        }

        match app.save().await {
            Ok(()) if app.is_remote_confirmed() => report.confirmed.push(entry.app_id),
            Ok(()) => report.still_pending.push(entry.app_id),
            Err(error) => {
                warn!(app_id = %entry.app_id, %error, "Failed to sync pending app");
                report.failed.push(SweepFailure {
                    app_id: entry.app_id,
                    path: entry.path,
                    error,
                });
            }
        }
    }

    info!(
        confirmed = report.confirmed.len(),
        still_pending = report.still_pending.len(),
        missing = report.missing.len(),
        failed = report.failed.len(),
        "Sync finished"
    );
    Ok(report)
}
