//! Runtime configuration for the core library.

use crate::history::DEFAULT_MAX_UNDO_LEVELS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default hit-test tolerance in canvas units.
pub const DEFAULT_HIT_THRESHOLD: f64 = 5.0;
/// Default relay endpoint.
pub const DEFAULT_SYNC_ENDPOINT: &str = "ws://localhost:3030/ws";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Collaboration endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// WebSocket URL of the relay, without query.
    pub endpoint: String,
    /// Identifier sent to the relay with every connection.
    pub client_id: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SYNC_ENDPOINT.to_string(),
            client_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Top-level configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub max_undo_levels: usize,
    pub hit_threshold: f64,
    pub sync: SyncConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_undo_levels: DEFAULT_MAX_UNDO_LEVELS,
            hit_threshold: DEFAULT_HIT_THRESHOLD,
            sync: SyncConfig::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
