//! Wire-level types shared between the remote service and its callers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a value held by the remote service.
///
/// Callers never interpret the contents; they store it and pass it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueHandle(String);

impl ValueHandle {
    /// Wrap a raw handle string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw handle string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ValueHandle {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Payload sent when registering an app with the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteApp {
    /// Human-readable app name
    pub name: String,
}

impl RemoteApp {
    /// Create a registration payload for the named app.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
