//! A decoded, timestamped sensor value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::SensorIdentity;

/// One ingested reading: which sensor, what value, when it was observed.
///
/// Immutable once constructed; the pipeline persists it and hands it to the
/// dispatcher, after which no component retains it beyond its own fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// The sensor this reading belongs to.
    #[serde(flatten)]
    pub identity: SensorIdentity,
    /// Measured value, float32 end to end.
    pub value: f32,
    /// When the publisher observed the value (payload timestamp, UTC).
    pub observed_at: DateTime<Utc>,
}

impl Reading {
    /// Build a reading from its parts.
    pub fn new(identity: SensorIdentity, value: f32, observed_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            value,
            observed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn make_reading() -> Reading {
        Reading::new(
            SensorIdentity::new("battery", "module1", "ntc3"),
            23.5,
            Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
        )
    }

    #[test]
    fn construction_keeps_parts() {
        let reading = make_reading();
        assert_eq!(reading.identity.section, "battery");
        assert_eq!(reading.value, 23.5);
        assert_eq!(reading.observed_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn serializes_with_flattened_identity() {
        let json = serde_json::to_value(make_reading()).unwrap();
        assert_eq!(json["section"], "battery");
        assert_eq!(json["module"], "module1");
        assert_eq!(json["sensor"], "ntc3");
        assert_eq!(json["value"], 23.5);
        assert_eq!(json["observedAt"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn serde_round_trip() {
        let reading = make_reading();
        let json = serde_json::to_string(&reading).unwrap();
        let back: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading);
    }
}
