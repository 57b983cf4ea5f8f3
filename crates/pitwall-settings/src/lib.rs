//! # pitwall-settings
//!
//! Layered configuration for the telemetry server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`PitwallSettings::default()`]
//! 2. **Settings file** — JSON, deep-merged over defaults
//! 3. **Environment variables** — `PITWALL_*` overrides (highest priority)
//!
//! Loading produces a plain [`PitwallSettings`] value that the caller
//! threads through construction; nothing here is global state.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
