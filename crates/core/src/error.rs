//! Error types for the cellar-core crate

use cellar_store::RemoteError;
use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for cellar-core operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No app file exists in the directory being loaded
    #[error("No {file_name} found in {}", dir.display())]
    #[diagnostic(
        code(cellar_core::app::not_found),
        help("Create one with `App::create` first")
    )]
    NoAppFound {
        /// Configured app file name
        file_name: String,
        /// Directory that was searched
        dir: Box<Path>,
    },

    /// An app file already exists where a new app was requested
    #[error("An app already exists in {}", dir.display())]
    #[diagnostic(code(cellar_core::app::exists))]
    AppExists {
        /// Directory that already holds an app file
        dir: Box<Path>,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(cellar_core::io::error))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<Path>>,
        /// Description of the operation that failed
        operation: String,
    },

    /// A file could not be parsed or serialized
    #[error("Failed to parse {}: {message}", path.display())]
    #[diagnostic(code(cellar_core::parse))]
    Parse {
        /// File being read or written
        path: Box<Path>,
        /// Parser message
        message: String,
    },

    /// Malformed input with positional context
    #[error("Invalid assignment on line {line}: {message}")]
    #[diagnostic(code(cellar_core::validation))]
    Validation {
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    #[diagnostic(code(cellar_core::config::invalid))]
    Configuration {
        /// The error message describing the configuration issue
        message: String,
    },

    /// A cell was read before any value was written through it
    #[error("Key '{key}' has no stored value")]
    #[diagnostic(code(cellar_core::cell::unbound))]
    UnboundCell {
        /// Key of the unbound cell
        key: String,
    },

    /// The remote service answered with an error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Remote(#[from] RemoteError),
}

impl Error {
    /// Create a "no app found" error
    pub fn no_app_found(file_name: impl Into<String>, dir: &Path) -> Self {
        Self::NoAppFound {
            file_name: file_name.into(),
            dir: dir.into(),
        }
    }

    /// Create an "app exists" error
    pub fn app_exists(dir: &Path) -> Self {
        Self::AppExists { dir: dir.into() }
    }

    /// Create an I/O error with context
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(PathBuf::into_boxed_path),
            operation: operation.into(),
        }
    }

    /// Create a parse error for a file
    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a validation error for a 1-based line number
    pub fn validation(line: usize, message: impl Into<String>) -> Self {
        Self::Validation {
            line,
            message: message.into(),
        }
    }

    /// Create a configuration error with a message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error only reflects an unreachable remote service
    #[must_use]
    pub fn is_no_connection(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_no_connection())
    }
}

/// Result type for cellar-core operations
pub type Result<T> = std::result::Result<T, Error>;
