//! Server, live-delivery, storage, and logging settings.

use serde::{Deserialize, Serialize};

/// Network settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Listen port for ingest, live, and health endpoints.
    pub port: u16,
    /// Bind address.
    pub host: String,
    /// How long to wait for in-flight work during shutdown, in milliseconds.
    pub shutdown_grace_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            shutdown_grace_ms: 5_000,
        }
    }
}

/// Settings for live WebSocket delivery.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveSettings {
    /// Capacity of each agent's outbound frame queue.
    pub inbox_capacity: usize,
    /// Cumulative dropped frames after which an agent is disconnected
    /// as a slow consumer.
    pub max_dropped_frames: u64,
    /// WebSocket ping interval in milliseconds.
    pub ping_interval_ms: u64,
    /// How long an agent may go without any inbound traffic before the
    /// connection is considered dead, in milliseconds.
    pub pong_timeout_ms: u64,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            inbox_capacity: 64,
            max_dropped_frames: 100,
            ping_interval_ms: 30_000,
            pong_timeout_ms: 60_000,
        }
    }
}

/// SQLite storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Path to the database file.
    pub db_path: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// SQLite busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            db_path: "pitwall.db".to_string(),
            max_connections: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level emitted when no env filter is set.
    pub level: LogLevel,
}

/// Log level for the tracing subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level (most verbose).
    Trace,
    /// Debug-level.
    Debug,
    /// Info-level (default).
    #[default]
    Info,
    /// Warning-level.
    Warn,
    /// Error-level (least verbose).
    Error,
}

impl LogLevel {
    /// Convert to a tracing filter string.
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
