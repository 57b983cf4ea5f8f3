//! # pitwall-core
//!
//! Shared vocabulary for the Pitwall telemetry pipeline.
//!
//! - **`SensorIdentity`**: the (section, module, sensor) triple naming one
//!   sensor, parseable from its `section/module/sensor` topic form
//! - **Payload codec**: the 8-byte wire payload — big-endian u32 epoch
//!   seconds followed by a little-endian IEEE-754 f32 value
//! - **`Reading`**: one decoded, timestamped sensor value
//!
//! No I/O and no async here; everything downstream (store, server, daemon)
//! builds on these types.

#![deny(unsafe_code)]

pub mod identity;
pub mod payload;
pub mod reading;

pub use identity::{SensorIdentity, TopicError};
pub use payload::{decode_payload, encode_payload, PayloadError, PAYLOAD_LEN};
pub use reading::Reading;
