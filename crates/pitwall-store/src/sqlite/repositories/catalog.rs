//! Catalog repository: sections, modules, and sensors.

use pitwall_core::SensorIdentity;
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;

/// Data access for the three-level sensor catalog.
///
/// All methods are stateless and operate on a borrowed connection, so a
/// caller holding a transaction can compose them atomically.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Returns the id of the named section, creating it if necessary.
    pub fn ensure_section(conn: &Connection, name: &str) -> Result<i64> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO sections (name) VALUES (?1)",
            params![name],
        )?;
        let id = conn.query_row(
            "SELECT id FROM sections WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Returns the id of the named module under `section_id`, creating it
    /// if necessary.
    pub fn ensure_module(conn: &Connection, section_id: i64, name: &str) -> Result<i64> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO modules (section_id, name) VALUES (?1, ?2)",
            params![section_id, name],
        )?;
        let id = conn.query_row(
            "SELECT id FROM modules WHERE section_id = ?1 AND name = ?2",
            params![section_id, name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Returns the id of the named sensor under `module_id`, creating it
    /// if necessary.
    pub fn ensure_sensor(conn: &Connection, module_id: i64, name: &str) -> Result<i64> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO sensors (module_id, name) VALUES (?1, ?2)",
            params![module_id, name],
        )?;
        let id = conn.query_row(
            "SELECT id FROM sensors WHERE module_id = ?1 AND name = ?2",
            params![module_id, name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Resolves a full section/module/sensor identity to a sensor row id.
    ///
    /// Returns `None` when any level of the path does not exist.
    pub fn find_sensor(conn: &Connection, identity: &SensorIdentity) -> Result<Option<i64>> {
        let id = conn
            .query_row(
                "SELECT sensors.id
                 FROM sensors
                 JOIN modules ON modules.id = sensors.module_id
                 JOIN sections ON sections.id = modules.section_id
                 WHERE sections.name = ?1
                   AND modules.name = ?2
                   AND sensors.name = ?3",
                params![identity.section, identity.module, identity.sensor],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Total number of sensors in the catalog.
    pub fn sensor_count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM sensors", [], |row| row.get(0))?;
        Ok(count)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
