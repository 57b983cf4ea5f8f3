//! Binary payload codec.
//!
//! A reading travels as exactly 8 bytes: offsets 0–3 hold a big-endian
//! unsigned 32-bit Unix timestamp in seconds, offsets 4–7 hold the value
//! as a little-endian IEEE-754 single-precision float. The decode is
//! atomic — there is no partial result for a malformed payload.

use chrono::{DateTime, Utc};

/// Exact wire length of an encoded reading payload.
pub const PAYLOAD_LEN: usize = 8;

/// Payload that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// Payload length differed from [`PAYLOAD_LEN`]; carries the observed
    /// length.
    #[error("invalid payload length: {0}")]
    Length(usize),
    /// Timestamp seconds outside the representable datetime range.
    #[error("unrepresentable timestamp: {0}")]
    Timestamp(u32),
}

/// Decode an 8-byte payload into its UTC timestamp and value.
///
/// Timestamps are interpreted as seconds since the Unix epoch, UTC.
pub fn decode_payload(payload: &[u8]) -> Result<(DateTime<Utc>, f32), PayloadError> {
    if payload.len() != PAYLOAD_LEN {
        return Err(PayloadError::Length(payload.len()));
    }

    let seconds = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let observed_at = DateTime::<Utc>::from_timestamp(i64::from(seconds), 0)
        .ok_or(PayloadError::Timestamp(seconds))?;
    let value = f32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);

    Ok((observed_at, value))
}

/// Encode epoch seconds and a value into the 8-byte wire form.
pub fn encode_payload(seconds: u32, value: f32) -> [u8; PAYLOAD_LEN] {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[..4].copy_from_slice(&seconds.to_be_bytes());
    payload[4..].copy_from_slice(&value.to_le_bytes());
    payload
}
