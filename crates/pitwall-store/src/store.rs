//! High-level store facade over the SQLite backend.

use pitwall_core::{Reading, SensorIdentity};
use tracing::debug;

use crate::errors::{Result, StoreError};
use crate::sqlite::repositories::{CatalogRepo, ReadingRepo, StoredReading};
use crate::sqlite::{ConnectionPool, PooledSqliteConnection, run_migrations};

/// Storage operations the ingestion pipeline depends on.
///
/// The pipeline only resolves identities and appends readings. Keeping
/// that surface behind a trait lets tests substitute failing or
/// recording doubles for the real database.
pub trait ReadingStore: Send + Sync {
    /// Resolves an identity to a sensor row id, `None` when no sensor
    /// with that exact path exists.
    fn resolve_sensor(&self, identity: &SensorIdentity) -> Result<Option<i64>>;

    /// Appends a decoded reading for a previously resolved sensor.
    fn insert_reading(&self, sensor_id: i64, reading: &Reading) -> Result<()>;
}

/// SQLite-backed store for the sensor catalog and readings log.
#[derive(Clone)]
pub struct TelemetryStore {
    pool: ConnectionPool,
}

impl TelemetryStore {
    /// Creates a store over `pool` and applies any pending migrations.
    pub fn new(pool: ConnectionPool) -> Result<Self> {
        let store = Self { pool };
        run_migrations(&*store.conn()?)?;
        Ok(store)
    }

    fn conn(&self) -> Result<PooledSqliteConnection> {
        self.pool.get().map_err(Into::into)
    }

    /// Creates the full catalog path for `identity`, returning the sensor id.
    ///
    /// All three levels are created inside one transaction, so a crash
    /// never leaves a module without its section.
    pub fn ensure_sensor(&self, identity: &SensorIdentity) -> Result<i64> {
        if identity.has_empty_field() {
            return Err(StoreError::InvalidIdentity(identity.topic()));
        }
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let section_id = CatalogRepo::ensure_section(&tx, &identity.section)?;
        let module_id = CatalogRepo::ensure_module(&tx, section_id, &identity.module)?;
        let sensor_id = CatalogRepo::ensure_sensor(&tx, module_id, &identity.sensor)?;
        tx.commit()?;
        Ok(sensor_id)
    }

    /// Ensures every identity in `catalog` exists.
    pub fn seed(&self, catalog: &[SensorIdentity]) -> Result<()> {
        for identity in catalog {
            let sensor_id = self.ensure_sensor(identity)?;
            debug!(topic = %identity.topic(), sensor_id, "catalog entry ready");
        }
        Ok(())
    }

    /// Returns up to `limit` readings for `identity`, newest first.
    ///
    /// An identity that resolves to no sensor yields an empty list.
    pub fn readings_for_sensor(
        &self,
        identity: &SensorIdentity,
        limit: i64,
    ) -> Result<Vec<StoredReading>> {
        let conn = self.conn()?;
        match CatalogRepo::find_sensor(&conn, identity)? {
            Some(sensor_id) => ReadingRepo::for_sensor(&conn, sensor_id, limit),
            None => Ok(Vec::new()),
        }
    }

    /// Total number of sensors in the catalog.
    pub fn sensor_count(&self) -> Result<i64> {
        CatalogRepo::sensor_count(&*self.conn()?)
    }

    /// Total number of stored readings.
    pub fn reading_count(&self) -> Result<i64> {
        ReadingRepo::count(&*self.conn()?)
    }
}

impl ReadingStore for TelemetryStore {
    fn resolve_sensor(&self, identity: &SensorIdentity) -> Result<Option<i64>> {
        CatalogRepo::find_sensor(&*self.conn()?, identity)
    }

    fn insert_reading(&self, sensor_id: i64, reading: &Reading) -> Result<()> {
        let _ = ReadingRepo::insert(
            &*self.conn()?,
            sensor_id,
            reading.value,
            &reading.observed_at,
        )?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
