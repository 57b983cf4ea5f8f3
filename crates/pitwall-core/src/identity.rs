//! Sensor identity — the (section, module, sensor) triple that names one
//! sensor and doubles as the subscription interest key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Topic string that does not split into exactly three segments.
///
/// Carries the offending topic verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid topic: {0}")]
pub struct TopicError(pub String);

/// Identifies one sensor within the section → module → sensor hierarchy.
///
/// Two identities are equal iff all three fields are equal, which makes the
/// identity itself the interest key used for subscription matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorIdentity {
    /// Top-level grouping, e.g. `battery`.
    pub section: String,
    /// Module within the section, e.g. `module1`.
    pub module: String,
    /// Sensor name within the module, e.g. `ntc3`.
    pub sensor: String,
}

impl SensorIdentity {
    /// Create an identity from its three parts.
    pub fn new(
        section: impl Into<String>,
        module: impl Into<String>,
        sensor: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            module: module.into(),
            sensor: sensor.into(),
        }
    }

    /// Parse a `section/module/sensor` topic string.
    ///
    /// Succeeds iff splitting on `/` yields exactly three segments, which
    /// are taken positionally and untrimmed. Empty segments are accepted
    /// here; they fail later at catalog resolution instead.
    pub fn from_topic(topic: &str) -> Result<Self, TopicError> {
        let parts: Vec<&str> = topic.split('/').collect();
        let [section, module, sensor] = parts[..] else {
            return Err(TopicError(topic.to_string()));
        };
        Ok(Self::new(section, module, sensor))
    }

    /// Render the identity back into its wire topic form.
    pub fn topic(&self) -> String {
        format!("{}/{}/{}", self.section, self.module, self.sensor)
    }

    /// True when any of the three fields is empty.
    pub fn has_empty_field(&self) -> bool {
        self.section.is_empty() || self.module.is_empty() || self.sensor.is_empty()
    }
}

impl fmt::Display for SensorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.section, self.module, self.sensor)
    }
}

impl FromStr for SensorIdentity {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_topic(s)
    }
}
