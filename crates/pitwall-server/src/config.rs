//! Runtime configuration for the telemetry server.

use std::time::Duration;

use pitwall_settings::PitwallSettings;

/// Everything the server needs to bind, fan out, and police connections.
///
/// The daemon derives one from loaded settings; tests construct one
/// directly, usually with port `0` so the OS assigns a free port.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port; `0` lets the OS pick.
    pub port: u16,
    /// Depth of each live connection's delivery inbox.
    pub inbox_capacity: usize,
    /// Cumulative dropped frames after which a slow consumer is cut off.
    pub max_dropped_frames: u64,
    /// Interval between server pings on live connections.
    pub ping_interval: Duration,
    /// Silence window after which a live connection is considered dead.
    pub pong_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            inbox_capacity: 64,
            max_dropped_frames: 100,
            ping_interval: Duration::from_secs(30),
            pong_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Builds a config from loaded settings.
    pub fn from_settings(settings: &PitwallSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            inbox_capacity: settings.live.inbox_capacity,
            max_dropped_frames: settings.live.max_dropped_frames,
            ping_interval: Duration::from_millis(settings.live.ping_interval_ms),
            pong_timeout: Duration::from_millis(settings.live.pong_timeout_ms),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
