//! Wire protocol for live connections.
//!
//! Clients send control messages to track or untrack individual sensors;
//! the server sends delivery frames for matching readings. Anything the
//! server cannot decode is answered with a literal `bad request` notice
//! followed by disconnection.

use chrono::{DateTime, Utc};
use pitwall_core::{Reading, SensorIdentity};
use serde::{Deserialize, Serialize};

/// Reply sent before closing a connection that sent something unreadable.
pub const BAD_REQUEST: &str = "bad request";

/// Client → server subscribe/unsubscribe request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    /// Section part of the sensor identity.
    pub section: String,
    /// Module part of the sensor identity.
    pub module: String,
    /// Sensor name.
    pub sensor: String,
    /// `true` to start delivery, `false` to stop.
    pub track: bool,
}

impl ControlMessage {
    /// The identity this request refers to.
    pub fn identity(&self) -> SensorIdentity {
        SensorIdentity::new(&self.section, &self.module, &self.sensor)
    }
}

/// Control message that cannot be honored.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The message was not a decodable control request.
    #[error("malformed control message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Decoded fine, but at least one identity field was empty.
    #[error("control message has an empty identity field")]
    EmptyIdentity,
}

/// Parse one inbound control message.
///
/// Rejects unreadable JSON, missing fields, and empty identity fields;
/// the caller answers any error with [`BAD_REQUEST`] and closes.
pub fn parse_control(text: &str) -> Result<ControlMessage, ControlError> {
    let control: ControlMessage = serde_json::from_str(text)?;
    if control.identity().has_empty_field() {
        return Err(ControlError::EmptyIdentity);
    }
    Ok(control)
}

/// Server → client delivery message for one reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFrame {
    /// Section part of the sensor identity.
    pub section: String,
    /// Module part of the sensor identity.
    pub module: String,
    /// Sensor name.
    pub sensor: String,
    /// Measured value.
    pub value: f32,
    /// When the publisher observed the value, RFC 3339 UTC.
    pub time: DateTime<Utc>,
}

impl From<&Reading> for DeliveryFrame {
    fn from(reading: &Reading) -> Self {
        Self {
            section: reading.identity.section.clone(),
            module: reading.identity.module.clone(),
            sensor: reading.identity.sensor.clone(),
            value: reading.value,
            time: reading.observed_at,
        }
    }
}

/// A reading serialized once for fan-out.
///
/// The identity rides alongside the rendered JSON so every connection's
/// deliverer can filter without reparsing, and the JSON itself is shared
/// across all subscribers behind an `Arc`.
#[derive(Debug)]
pub struct ReadingFrame {
    /// Identity used for subscription filtering.
    pub identity: SensorIdentity,
    /// The delivery frame, rendered.
    pub json: String,
}

impl ReadingFrame {
    /// Render `reading` into its delivery form.
    pub fn new(reading: &Reading) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&DeliveryFrame::from(reading))?;
        Ok(Self {
            identity: reading.identity.clone(),
            json,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
