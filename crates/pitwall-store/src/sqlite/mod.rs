//! SQLite backend: pooling, migrations, and repositories.

pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{
    ConnectionConfig, ConnectionPool, PooledSqliteConnection, new_file_pool, new_in_memory_pool,
};
pub use migrations::run_migrations;
