//! Engine configuration.
//!
//! Read once at start-up (usually from a JSON document) and handed to
//! [`NetContext`](crate::urlrequest::context::NetContext). Default headers are
//! copied into the context and stay mutable afterwards.

use crate::base::neterror::NetError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Configuration options for the networking engine.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetConfig {
    /// Base URL prefixed to relative request URLs.
    pub base_url: String,

    /// Default request timeout in milliseconds.
    pub timeout: u64,

    /// Whether GET responses are cached at all.
    pub use_cache: bool,

    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,

    /// Verbose request/response logging.
    pub debug: bool,

    /// Whether the application talks to a ping server.
    pub use_ping_server: bool,

    /// Generic message used when a failed response carries no error text.
    pub error_message: String,

    /// Title of the notice shown when offline without cache.
    pub offline_title: String,

    /// Body of the notice shown when offline without cache.
    pub offline_message: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            timeout: 10_000,
            use_cache: true,
            headers: BTreeMap::new(),
            debug: false,
            use_ping_server: true,
            error_message: "A network error occurred".to_string(),
            offline_title: "No connection".to_string(),
            offline_message: "You appear to be offline. Check your connection and try again."
                .to_string(),
        }
    }
}

impl NetConfig {
    /// Parse a configuration from a JSON document. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, NetError> {
        serde_json::from_str(json).map_err(|e| NetError::InvalidConfig(e.to_string()))
    }

    /// Load a configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, NetError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| NetError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Default timeout as a `Duration`.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}
