//! Error types for storage operations.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite-level error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Migration error.
    #[error("migration error: {message}")]
    Migration {
        /// Description of what went wrong.
        message: String,
    },

    /// A sensor identity with an empty section, module, or sensor name
    /// was handed to the catalog.
    #[error("invalid sensor identity: {0}")]
    InvalidIdentity(String),
}

/// Convenience alias for storage results.
pub type Result<T> = std::result::Result<T, StoreError>;
