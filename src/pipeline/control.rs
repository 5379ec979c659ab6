//! Device Control State
//!
//! Power state and vibration-duration setting for the single monitored
//! device. All mutation goes through [`DeviceControl::set_power`] and
//! [`DeviceControl::set_vibration_duration`] so the range checks live in one
//! place. The device polls both values; the ingestion gate reads the power
//! state on every reading.

use serde::{Deserialize, Serialize};

use crate::config::defaults::{MAX_VIBRATION_DURATION_MS, MIN_VIBRATION_DURATION_MS};

/// Remote power command / state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerStatus {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl PowerStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl std::fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PowerStatus {
    type Err = ControlError;

    /// Commands are exact and case-sensitive, as the device firmware sends them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            other => Err(ControlError::InvalidCommand(other.to_string())),
        }
    }
}

/// Rejected control requests. State is never changed when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("Invalid command '{0}'. Must be 'ON' or 'OFF'.")]
    InvalidCommand(String),
    #[error("Invalid duration {requested}ms. Must be {}s - {}s.", MIN_VIBRATION_DURATION_MS / 1000, MAX_VIBRATION_DURATION_MS / 1000)]
    DurationOutOfRange { requested: i64 },
    #[error("Invalid duration '{0}'. Must be an integer number of milliseconds.")]
    DurationNotInteger(String),
}

/// Process-wide control state, owned by [`super::AppState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceControl {
    power: PowerStatus,
    vibration_duration_ms: u32,
}

impl Default for DeviceControl {
    fn default() -> Self {
        Self {
            power: PowerStatus::On,
            vibration_duration_ms: MIN_VIBRATION_DURATION_MS,
        }
    }
}

impl DeviceControl {
    /// Build with explicit defaults. Out-of-range durations fall back to the
    /// minimum so the range invariant holds from the start.
    pub fn new(power: PowerStatus, vibration_duration_ms: u32) -> Self {
        let vibration_duration_ms = if Self::duration_in_range(i64::from(vibration_duration_ms)) {
            vibration_duration_ms
        } else {
            tracing::warn!(
                duration_ms = vibration_duration_ms,
                "Configured vibration duration out of range, using minimum"
            );
            MIN_VIBRATION_DURATION_MS
        };
        Self {
            power,
            vibration_duration_ms,
        }
    }

    pub const fn power(&self) -> PowerStatus {
        self.power
    }

    pub const fn is_on(&self) -> bool {
        matches!(self.power, PowerStatus::On)
    }

    pub const fn vibration_duration_ms(&self) -> u32 {
        self.vibration_duration_ms
    }

    /// Apply a power command (`"ON"` / `"OFF"`).
    pub fn set_power(&mut self, command: &str) -> Result<PowerStatus, ControlError> {
        let next: PowerStatus = command.parse()?;
        if next != self.power {
            tracing::info!(command = %next, "Device commanded");
        }
        self.power = next;
        Ok(next)
    }

    /// Set the vibration stimulus duration; accepted range is
    /// `[10_000, 300_000]` ms.
    pub fn set_vibration_duration(&mut self, ms: i64) -> Result<u32, ControlError> {
        if !Self::duration_in_range(ms) {
            return Err(ControlError::DurationOutOfRange { requested: ms });
        }
        let ms = u32::try_from(ms).map_err(|_| ControlError::DurationOutOfRange { requested: ms })?;
        self.vibration_duration_ms = ms;
        tracing::info!(duration_ms = ms, "Vibration duration set");
        Ok(ms)
    }

    fn duration_in_range(ms: i64) -> bool {
        (i64::from(MIN_VIBRATION_DURATION_MS)..=i64::from(MAX_VIBRATION_DURATION_MS)).contains(&ms)
    }
}

/// Interpret a JSON duration the way the firmware and dashboard send it:
/// an integer, or a string holding one. Fractions and anything else are
/// rejected.
pub fn parse_duration(value: &serde_json::Value) -> Result<i64, ControlError> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.is_finite() => {
                    // u64 beyond i64 or an integral float such as 20000.0
                    if f.abs() < 9.0e15 {
                        Ok(f as i64)
                    } else {
                        Err(ControlError::DurationOutOfRange { requested: i64::MAX })
                    }
                }
                _ => Err(ControlError::DurationNotInteger(n.to_string())),
            }
        }
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ControlError::DurationNotInteger(s.clone())),
        other => Err(ControlError::DurationNotInteger(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let control = DeviceControl::default();
        assert_eq!(control.power(), PowerStatus::On);
        assert_eq!(control.vibration_duration_ms(), 10_000);
    }

    #[test]
    fn test_power_transitions() {
        let mut control = DeviceControl::default();
        assert_eq!(control.set_power("OFF"), Ok(PowerStatus::Off));
        assert!(!control.is_on());
        assert_eq!(control.set_power("ON"), Ok(PowerStatus::On));
        assert!(control.is_on());
    }

    #[test]
    fn test_invalid_power_command_keeps_state() {
        let mut control = DeviceControl::default();
        control.set_power("OFF").unwrap();
        for bad in ["on", "Off", "REBOOT", ""] {
            assert!(matches!(
                control.set_power(bad),
                Err(ControlError::InvalidCommand(_))
            ));
            assert_eq!(control.power(), PowerStatus::Off);
        }
    }

    #[test]
    fn test_duration_out_of_range_keeps_previous() {
        let mut control = DeviceControl::default();
        assert!(control.set_vibration_duration(5_000).is_err());
        assert_eq!(control.vibration_duration_ms(), 10_000);
        assert!(control.set_vibration_duration(300_001).is_err());
        assert!(control.set_vibration_duration(-1).is_err());
        assert_eq!(control.vibration_duration_ms(), 10_000);
    }

    #[test]
    fn test_duration_accepted_at_bounds() {
        let mut control = DeviceControl::default();
        assert_eq!(control.set_vibration_duration(20_000), Ok(20_000));
        assert_eq!(control.vibration_duration_ms(), 20_000);
        assert_eq!(control.set_vibration_duration(300_000), Ok(300_000));
        assert_eq!(control.set_vibration_duration(10_000), Ok(10_000));
    }

    #[test]
    fn test_new_clamps_bad_default() {
        let control = DeviceControl::new(PowerStatus::Off, 1);
        assert_eq!(control.vibration_duration_ms(), 10_000);
        assert_eq!(control.power(), PowerStatus::Off);
    }

    #[test]
    fn test_parse_duration_inputs() {
        assert_eq!(parse_duration(&json!(20000)), Ok(20_000));
        assert_eq!(parse_duration(&json!("45000")), Ok(45_000));
        assert_eq!(parse_duration(&json!(20000.0)), Ok(20_000));
        assert!(matches!(
            parse_duration(&json!(20000.5)),
            Err(ControlError::DurationNotInteger(_))
        ));
        assert!(matches!(
            parse_duration(&json!("fast")),
            Err(ControlError::DurationNotInteger(_))
        ));
        assert!(matches!(
            parse_duration(&json!(null)),
            Err(ControlError::DurationNotInteger(_))
        ));
    }
}
