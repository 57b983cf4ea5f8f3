//! SQLite connection pooling.
//!
//! All access to the database goes through an r2d2 pool of rusqlite
//! connections. Every connection is configured with the same set of
//! pragmas when it is first opened, so callers never have to think
//! about journal modes or foreign keys.

use std::path::Path;
use std::time::Duration;

use r2d2::{CustomizeConnection, Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// Default maximum number of pooled connections for a file-backed database.
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Default SQLite busy timeout, in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

/// Default time to wait for a free connection before giving up.
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Pool of SQLite connections.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// A connection checked out of the pool.
pub type PooledSqliteConnection = PooledConnection<SqliteConnectionManager>;

/// Tuning knobs for the connection pool.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Maximum number of connections held by the pool.
    pub max_connections: u32,
    /// SQLite busy timeout applied to every connection, in milliseconds.
    pub busy_timeout_ms: u32,
    /// How long to wait for a free connection before erroring.
    pub acquire_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

/// Applies the standard pragma set to each freshly opened connection.
#[derive(Debug, Clone, Copy)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = {};
             PRAGMA foreign_keys = ON;
             PRAGMA cache_size = -64000;",
            self.busy_timeout_ms
        ))
    }
}

/// Creates a connection pool backed by a database file at `path`.
///
/// The database file is created on first use.
pub fn new_file_pool(path: &Path, config: &ConnectionConfig) -> Result<ConnectionPool> {
    let manager = SqliteConnectionManager::file(path);
    build_pool(manager, config.max_connections, config)
}

/// Creates a pool backed by an in-memory database.
///
/// An in-memory SQLite database is private to the connection that opened
/// it, so the pool is pinned at a single connection. Everything checked
/// out of this pool sees the same data.
pub fn new_in_memory_pool() -> Result<ConnectionPool> {
    let manager = SqliteConnectionManager::memory();
    build_pool(manager, 1, &ConnectionConfig::default())
}

fn build_pool(
    manager: SqliteConnectionManager,
    max_size: u32,
    config: &ConnectionConfig,
) -> Result<ConnectionPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(config.acquire_timeout)
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
        .build(manager)?;
    Ok(pool)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn pragma_value(conn: &Connection, pragma: &str) -> String {
        conn.query_row(&format!("PRAGMA {pragma}"), [], |row| {
            row.get::<_, rusqlite::types::Value>(0)
        })
        .map(|value| match value {
            rusqlite::types::Value::Integer(n) => n.to_string(),
            rusqlite::types::Value::Text(text) => text,
            other => format!("{other:?}"),
        })
        .unwrap()
    }

    #[test]
    fn file_pool_applies_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let pool = new_file_pool(&dir.path().join("test.db"), &ConnectionConfig::default()).unwrap();
        let conn = pool.get().unwrap();

        assert_eq!(pragma_value(&conn, "journal_mode"), "wal");
        assert_eq!(pragma_value(&conn, "foreign_keys"), "1");
        assert_eq!(pragma_value(&conn, "busy_timeout"), "5000");
    }

    #[test]
    fn in_memory_pool_is_single_connection() {
        let pool = new_in_memory_pool().unwrap();
        assert_eq!(pool.max_size(), 1);

        // Data written through one checkout must be visible to the next.
        {
            let conn = pool.get().unwrap();
            conn.execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t (x) VALUES (7);")
                .unwrap();
        }
        let conn = pool.get().unwrap();
        let x: i64 = conn.query_row("SELECT x FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(x, 7);
    }

    #[test]
    fn custom_busy_timeout_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConnectionConfig {
            busy_timeout_ms: 1_234,
            ..ConnectionConfig::default()
        };
        let pool = new_file_pool(&dir.path().join("test.db"), &config).unwrap();
        let conn = pool.get().unwrap();

        assert_eq!(pragma_value(&conn, "busy_timeout"), "1234");
    }
}
