//! Readings repository.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::errors::Result;

/// A reading as it exists in the database, without its catalog path.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReading {
    /// Decoded sensor value.
    pub value: f32,
    /// When the reading was taken.
    pub observed_at: DateTime<Utc>,
}

/// Data access for the readings log.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Appends a reading for `sensor_id` and returns the new row id.
    pub fn insert(
        conn: &Connection,
        sensor_id: i64,
        value: f32,
        observed_at: &DateTime<Utc>,
    ) -> Result<i64> {
        let _ = conn.execute(
            "INSERT INTO readings (sensor_id, value, observed_at) VALUES (?1, ?2, ?3)",
            params![sensor_id, value, observed_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Returns up to `limit` readings for a sensor, newest first.
    pub fn for_sensor(conn: &Connection, sensor_id: i64, limit: i64) -> Result<Vec<StoredReading>> {
        let mut stmt = conn.prepare(
            "SELECT value, observed_at
             FROM readings
             WHERE sensor_id = ?1
             ORDER BY observed_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![sensor_id, limit], |row| {
            Ok(StoredReading {
                value: row.get(0)?,
                observed_at: row.get(1)?,
            })
        })?;
        let readings = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(readings)
    }

    /// Total number of readings across all sensors.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(count)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::migrations::run_migrations;
    use crate::sqlite::repositories::catalog::CatalogRepo;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn seed_sensor(conn: &Connection) -> i64 {
        let section = CatalogRepo::ensure_section(conn, "battery").unwrap();
        let module = CatalogRepo::ensure_module(conn, section, "module1").unwrap();
        CatalogRepo::ensure_sensor(conn, module, "ntc3").unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn insert_and_fetch_round_trips() {
        let conn = open();
        let sensor = seed_sensor(&conn);

        let observed = at(1_700_000_000);
        let _ = ReadingRepo::insert(&conn, sensor, 23.5, &observed).unwrap();

        let readings = ReadingRepo::for_sensor(&conn, sensor, 10).unwrap();
        assert_eq!(readings, vec![StoredReading { value: 23.5, observed_at: observed }]);
    }

    #[test]
    fn for_sensor_returns_newest_first() {
        let conn = open();
        let sensor = seed_sensor(&conn);

        for (secs, value) in [(100, 1.0), (300, 3.0), (200, 2.0)] {
            let _ = ReadingRepo::insert(&conn, sensor, value, &at(secs)).unwrap();
        }

        let readings = ReadingRepo::for_sensor(&conn, sensor, 10).unwrap();
        let values: Vec<f32> = readings.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn for_sensor_honors_the_limit() {
        let conn = open();
        let sensor = seed_sensor(&conn);

        for secs in 0..5 {
            let _ = ReadingRepo::insert(&conn, sensor, 0.5, &at(secs)).unwrap();
        }

        assert_eq!(ReadingRepo::for_sensor(&conn, sensor, 2).unwrap().len(), 2);
    }

    #[test]
    fn insert_rejects_unknown_sensor_ids() {
        let conn = open();
        let result = ReadingRepo::insert(&conn, 999, 1.0, &at(0));
        assert!(result.is_err());
    }

    #[test]
    fn fractional_values_survive_the_round_trip() {
        let conn = open();
        let sensor = seed_sensor(&conn);

        let _ = ReadingRepo::insert(&conn, sensor, 0.1, &at(50)).unwrap();

        let readings = ReadingRepo::for_sensor(&conn, sensor, 1).unwrap();
        assert_eq!(readings[0].value, 0.1);
    }
}
