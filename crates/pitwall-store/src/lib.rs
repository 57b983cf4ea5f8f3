//! SQLite-backed persistence for the sensor catalog and readings log.
//!
//! The crate is layered: [`sqlite`] owns pooling, migrations, and
//! per-table repositories; [`store`] exposes the [`TelemetryStore`]
//! facade and the [`ReadingStore`] trait that the ingestion pipeline
//! programs against.

#![deny(unsafe_code)]

pub mod errors;
pub mod sqlite;
pub mod store;

pub use errors::{Result, StoreError};
pub use sqlite::repositories::StoredReading;
pub use sqlite::{ConnectionConfig, ConnectionPool, new_file_pool, new_in_memory_pool};
pub use store::{ReadingStore, TelemetryStore};
