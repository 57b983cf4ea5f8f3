//! Schema migrations.
//!
//! Migrations are plain SQL files embedded at compile time and applied
//! in order inside a transaction. The `schema_version` table records
//! which migrations have already run, so applying the set is idempotent.

use rusqlite::Connection;
use tracing::info;

use crate::errors::{Result, StoreError};

/// A single schema migration.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// All known migrations, in application order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "schema",
    sql: include_str!("v001_schema.sql"),
}];

/// Applies any migrations the database has not seen yet.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    ensure_version_table(conn)?;
    let current = current_version(conn)?;

    for migration in MIGRATIONS {
        if migration.version > current {
            apply_migration(conn, migration)?;
            info!(version = migration.version, name = migration.name, "applied migration");
        }
    }
    Ok(())
}

/// Returns the highest migration version the database has applied.
pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn ensure_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version    INTEGER NOT NULL PRIMARY KEY,
             applied_at TEXT    NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
         );",
    )?;
    Ok(())
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql).map_err(|err| StoreError::Migration {
        message: format!("migration {} ({}) failed: {err}", migration.version, migration.name),
    })?;
    let _ = tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [migration.version],
    )?;
    tx.commit()?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
