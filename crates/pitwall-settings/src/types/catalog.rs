//! Catalog entries declared in the settings file.

use pitwall_core::SensorIdentity;
use serde::{Deserialize, Serialize};

/// A sensor declared in the settings file.
///
/// Entries are seeded into the catalog at startup; only readings whose
/// topic matches a seeded sensor are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Top-level grouping, e.g. `battery`.
    pub section: String,
    /// Module within the section, e.g. `module1`.
    pub module: String,
    /// Sensor name within the module, e.g. `ntc3`.
    pub sensor: String,
}

impl CatalogEntry {
    /// The identity this entry declares.
    pub fn identity(&self) -> SensorIdentity {
        SensorIdentity::new(
            self.section.clone(),
            self.module.clone(),
            self.sensor.clone(),
        )
    }

    /// Whether any of the three names is empty.
    pub fn has_empty_field(&self) -> bool {
        self.section.is_empty() || self.module.is_empty() || self.sensor.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
