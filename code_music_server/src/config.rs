// Server configuration.
//
// Loaded from an optional JSON file; any field left out takes its default.
// Command-line flags in main.rs override file values. The conversion itself
// has no knobs, so everything here is about the transport.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ServerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on.
    pub bind_address: String,
    /// Listen port. 0 lets the OS pick one (useful in tests).
    pub port: u16,
    /// Largest request body accepted by `POST /convert`.
    pub max_body_bytes: usize,
    /// When set, every produced file is also saved here under its download
    /// name.
    pub output_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".into(),
            port: 5000,
            max_body_bytes: 1024 * 1024,
            output_dir: None,
        }
    }
}

impl ServerConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let data = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&data)?)
    }

    /// `address:port` string handed to the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
