//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`PitwallSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{LogLevel, PitwallSettings};

/// Resolve the path to the settings file.
///
/// `PITWALL_SETTINGS` overrides the default `pitwall.json` in the
/// working directory.
pub fn settings_path() -> PathBuf {
    std::env::var("PITWALL_SETTINGS")
        .map_or_else(|_| PathBuf::from("pitwall.json"), PathBuf::from)
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<PitwallSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON or a value fails validation, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<PitwallSettings> {
    let defaults = serde_json::to_value(PitwallSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: PitwallSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules: integers must be valid and
/// within the specified range, and invalid values are silently ignored
/// (falling back to file/default).
pub fn apply_env_overrides(settings: &mut PitwallSettings) {
    // ── Server settings ─────────────────────────────────────────────
    if let Some(v) = read_env_u16("PITWALL_PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = read_env_string("PITWALL_HOST") {
        settings.server.host = v;
    }

    // ── Storage settings ────────────────────────────────────────────
    if let Some(v) = read_env_string("PITWALL_DB_PATH") {
        settings.storage.db_path = v;
    }
    if let Some(v) = read_env_u32("PITWALL_MAX_CONNECTIONS", 1, 64) {
        settings.storage.max_connections = v;
    }

    // ── Live delivery settings ──────────────────────────────────────
    if let Some(v) = read_env_usize("PITWALL_INBOX_CAPACITY", 1, 65_536) {
        settings.live.inbox_capacity = v;
    }
    if let Some(v) = read_env_u64("PITWALL_MAX_DROPPED_FRAMES", 1, 1_000_000) {
        settings.live.max_dropped_frames = v;
    }
    if let Some(v) = read_env_u64("PITWALL_PING_INTERVAL_MS", 1_000, 600_000) {
        settings.live.ping_interval_ms = v;
    }
    if let Some(v) = read_env_u64("PITWALL_PONG_TIMEOUT_MS", 1_000, 3_600_000) {
        settings.live.pong_timeout_ms = v;
    }

    // ── Logging settings ────────────────────────────────────────────
    if let Some(v) = read_env_string("PITWALL_LOG_LEVEL") {
        if let Ok(level) = serde_json::from_value::<LogLevel>(Value::String(v)) {
            settings.logging.level = level;
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
