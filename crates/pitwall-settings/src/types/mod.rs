//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON
//! settings file. Each type implements [`Default`] with production
//! default values, and `#[serde(default)]` allows partial JSON, so
//! missing fields fall back to their defaults during deserialization.

mod catalog;
mod server;

pub use catalog::*;
pub use server::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type for the telemetry server.
///
/// Loaded from a JSON file with defaults applied for missing fields.
/// Environment variables can override specific values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PitwallSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// HTTP server network settings.
    pub server: ServerSettings,
    /// Live WebSocket delivery settings.
    pub live: LiveSettings,
    /// SQLite storage settings.
    pub storage: StorageSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Sensors to seed into the catalog at startup.
    pub catalog: Vec<CatalogEntry>,
}

impl Default for PitwallSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "pitwall".to_string(),
            server: ServerSettings::default(),
            live: LiveSettings::default(),
            storage: StorageSettings::default(),
            logging: LoggingSettings::default(),
            catalog: Vec::new(),
        }
    }
}

impl PitwallSettings {
    /// Checks that loaded values are usable before the server boots.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SettingsError::InvalidValue("server.port is 0".to_string()));
        }
        if self.live.inbox_capacity == 0 {
            return Err(SettingsError::InvalidValue(
                "live.inboxCapacity is 0".to_string(),
            ));
        }
        if self.live.max_dropped_frames == 0 {
            return Err(SettingsError::InvalidValue(
                "live.maxDroppedFrames is 0".to_string(),
            ));
        }
        if self.storage.max_connections == 0 {
            return Err(SettingsError::InvalidValue(
                "storage.maxConnections is 0".to_string(),
            ));
        }
        if self.storage.db_path.is_empty() {
            return Err(SettingsError::InvalidValue(
                "storage.dbPath is empty".to_string(),
            ));
        }
        for (index, entry) in self.catalog.iter().enumerate() {
            if entry.has_empty_field() {
                return Err(SettingsError::InvalidValue(format!(
                    "catalog[{index}] has an empty section, module, or sensor"
                )));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
