//! Error types for the cellar-store crate

use miette::Diagnostic;
use thiserror::Error;

/// Errors reported by a [`RemoteService`](crate::RemoteService)
#[derive(Error, Debug, Diagnostic)]
pub enum RemoteError {
    /// The service could not be reached at all
    #[error("Cannot reach the remote service at {host}")]
    #[diagnostic(
        code(cellar_store::no_connection),
        help("Local changes are kept and will be synced on a later save")
    )]
    NoConnection {
        /// Host that was contacted
        host: String,
    },

    /// An app is already registered under this identifier
    #[error("App '{remote_id}' is already registered with the remote service")]
    #[diagnostic(code(cellar_store::app_exists))]
    AppExists {
        /// The remote identifier that collided
        remote_id: String,
    },

    /// No value is stored under the given handle
    #[error("No value stored for handle '{handle}'")]
    #[diagnostic(code(cellar_store::value_not_found))]
    ValueNotFound {
        /// The unresolved handle
        handle: String,
    },

    /// The service answered but refused the request
    #[error("Remote service rejected {operation}: {message}")]
    #[diagnostic(code(cellar_store::rejected))]
    Rejected {
        /// Operation that was attempted
        operation: String,
        /// Message returned by the service
        message: String,
    },
}

impl RemoteError {
    /// Create a connectivity error for the given host
    pub fn no_connection(host: impl Into<String>) -> Self {
        Self::NoConnection { host: host.into() }
    }

    /// Create a rejection error
    pub fn rejected(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether this error only means the service was unreachable.
    ///
    /// Connectivity failures are transient; everything else is a real answer
    /// from the service.
    #[must_use]
    pub fn is_no_connection(&self) -> bool {
        matches!(self, Self::NoConnection { .. })
    }
}
