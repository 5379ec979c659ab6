//! Sensor readings and per-channel values

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire sentinel for a channel that has not reported yet.
pub const NO_DATA_SENTINEL: &str = "N/A";

/// Wire sentinel for a channel that could not be fetched.
pub const CONNECTION_ERROR_SENTINEL: &str = "CONN ERR";

/// Timestamp reported when no reading has been stored yet.
pub const NO_DATA_TIMESTAMP: &str = "No Data Yet";

// ============================================================================
// Channels
// ============================================================================

/// One sensed physical quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Temperature,
    Pressure,
    Moisture,
    Vibration,
}

impl Channel {
    /// All channels in dashboard order.
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::Pressure,
        Self::Moisture,
        Self::Vibration,
    ];

    /// Channels recorded into the history window for trend display.
    pub const TRENDED: [Self; 2] = [Self::Temperature, Self::Vibration];

    /// Stable array index for per-channel storage.
    pub const fn index(self) -> usize {
        match self {
            Self::Temperature => 0,
            Self::Pressure => 1,
            Self::Moisture => 2,
            Self::Vibration => 3,
        }
    }

    /// Field name used in payloads and config keys.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Pressure => "pressure",
            Self::Moisture => "moisture",
            Self::Vibration => "vibration",
        }
    }

    /// Display unit.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Pressure => "hPa",
            Self::Moisture => "%",
            Self::Vibration => "g",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Channel Value
// ============================================================================

/// Why a channel has no numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnavailableReason {
    /// The reading could not be fetched from the server.
    ConnectionError,
    /// Nothing has been recorded yet.
    NoData,
}

/// A channel value as seen by classification: either a measurement or an
/// explicit reason for its absence.
///
/// On the wire a measurement is a JSON number and the absent states are the
/// strings `"N/A"` and `"CONN ERR"`, which is what the sensing device and the
/// dashboard exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelValue {
    Measured(f64),
    Unavailable(UnavailableReason),
}

impl ChannelValue {
    pub const NO_DATA: Self = Self::Unavailable(UnavailableReason::NoData);
    pub const CONNECTION_ERROR: Self = Self::Unavailable(UnavailableReason::ConnectionError);

    /// The measurement, if any.
    pub const fn measured(self) -> Option<f64> {
        match self {
            Self::Measured(v) => Some(v),
            Self::Unavailable(_) => None,
        }
    }

    pub const fn is_measured(self) -> bool {
        matches!(self, Self::Measured(_))
    }

    /// Interpret free-form text the way the device firmware sends it:
    /// numeric strings are measurements, the connection sentinel maps to
    /// `ConnectionError`, anything else is treated as no data.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed == CONNECTION_ERROR_SENTINEL {
            return Self::CONNECTION_ERROR;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Measured(v),
            _ => Self::NO_DATA,
        }
    }
}

impl From<f64> for ChannelValue {
    fn from(v: f64) -> Self {
        Self::Measured(v)
    }
}

impl std::fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Measured(v) => write!(f, "{v}"),
            Self::Unavailable(UnavailableReason::NoData) => f.write_str(NO_DATA_SENTINEL),
            Self::Unavailable(UnavailableReason::ConnectionError) => {
                f.write_str(CONNECTION_ERROR_SENTINEL)
            }
        }
    }
}

impl Serialize for ChannelValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Measured(v) => serializer.serialize_f64(*v),
            Self::Unavailable(UnavailableReason::NoData) => {
                serializer.serialize_str(NO_DATA_SENTINEL)
            }
            Self::Unavailable(UnavailableReason::ConnectionError) => {
                serializer.serialize_str(CONNECTION_ERROR_SENTINEL)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChannelValue {
    Number(f64),
    Text(String),
    Null(()),
}

impl<'de> Deserialize<'de> for ChannelValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawChannelValue::deserialize(deserializer)? {
            RawChannelValue::Number(v) => Self::Measured(v),
            RawChannelValue::Text(text) => Self::from_text(&text),
            RawChannelValue::Null(()) => Self::NO_DATA,
        })
    }
}

// ============================================================================
// Reading
// ============================================================================

/// One accepted set of measurements. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature: f64,
    pub pressure: f64,
    pub moisture: f64,
    pub vibration: f64,
    /// RFC 3339 ingestion time
    pub timestamp: String,
}

impl Reading {
    /// Build a reading stamped with the current UTC time.
    pub fn now(temperature: f64, pressure: f64, moisture: f64, vibration: f64) -> Self {
        Self {
            temperature,
            pressure,
            moisture,
            vibration,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub const fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Pressure => self.pressure,
            Channel::Moisture => self.moisture,
            Channel::Vibration => self.vibration,
        }
    }
}

/// A reading as observed by a consumer: every channel may be unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSnapshot {
    pub temperature: ChannelValue,
    pub pressure: ChannelValue,
    pub moisture: ChannelValue,
    pub vibration: ChannelValue,
    pub timestamp: String,
}

impl ReadingSnapshot {
    /// Snapshot used before any reading exists.
    pub fn no_data() -> Self {
        Self::filled(ChannelValue::NO_DATA, NO_DATA_TIMESTAMP)
    }

    /// Snapshot used when the server could not be reached.
    pub fn connection_error() -> Self {
        Self::filled(ChannelValue::CONNECTION_ERROR, "Server Offline")
    }

    fn filled(value: ChannelValue, timestamp: &str) -> Self {
        Self {
            temperature: value,
            pressure: value,
            moisture: value,
            vibration: value,
            timestamp: timestamp.to_string(),
        }
    }

    pub const fn get(&self, channel: Channel) -> ChannelValue {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Pressure => self.pressure,
            Channel::Moisture => self.moisture,
            Channel::Vibration => self.vibration,
        }
    }
}

impl From<&Reading> for ReadingSnapshot {
    fn from(r: &Reading) -> Self {
        Self {
            temperature: ChannelValue::Measured(r.temperature),
            pressure: ChannelValue::Measured(r.pressure),
            moisture: ChannelValue::Measured(r.moisture),
            vibration: ChannelValue::Measured(r.vibration),
            timestamp: r.timestamp.clone(),
        }
    }
}

impl From<Option<&Reading>> for ReadingSnapshot {
    fn from(r: Option<&Reading>) -> Self {
        r.map_or_else(Self::no_data, Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_value_wire_format() {
        assert_eq!(serde_json::to_value(ChannelValue::Measured(22.5)).unwrap(), 22.5);
        assert_eq!(serde_json::to_value(ChannelValue::NO_DATA).unwrap(), "N/A");
        assert_eq!(
            serde_json::to_value(ChannelValue::CONNECTION_ERROR).unwrap(),
            "CONN ERR"
        );
    }

    #[test]
    fn test_channel_value_parses_device_strings() {
        let v: ChannelValue = serde_json::from_str("\"31.2\"").unwrap();
        assert_eq!(v, ChannelValue::Measured(31.2));
        let v: ChannelValue = serde_json::from_str("\"CONN ERR\"").unwrap();
        assert_eq!(v, ChannelValue::CONNECTION_ERROR);
        let v: ChannelValue = serde_json::from_str("\"No Data Yet\"").unwrap();
        assert_eq!(v, ChannelValue::NO_DATA);
        let v: ChannelValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, ChannelValue::NO_DATA);
        let v: ChannelValue = serde_json::from_str("1005").unwrap();
        assert_eq!(v, ChannelValue::Measured(1005.0));
    }

    #[test]
    fn test_snapshot_from_missing_reading_is_no_data() {
        let snap = ReadingSnapshot::from(None);
        for channel in Channel::ALL {
            assert_eq!(snap.get(channel), ChannelValue::NO_DATA);
        }
        assert_eq!(snap.timestamp, NO_DATA_TIMESTAMP);
    }

    #[test]
    fn test_reading_channel_lookup() {
        let r = Reading::now(22.0, 1005.0, 40.0, 0.1);
        assert_eq!(r.get(Channel::Pressure), 1005.0);
        assert_eq!(r.get(Channel::Vibration), 0.1);
        assert!(chrono::DateTime::parse_from_rfc3339(&r.timestamp).is_ok());
    }
}
