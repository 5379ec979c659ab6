//! Clinical threshold bands

use serde::{Deserialize, Serialize};

use super::Channel;

/// Normal/warning/critical boundaries for one channel.
///
/// Values outside `[min, max]` are critical. Inside the band, values below
/// `safe` or above the midpoint between `safe` and `max` are a warning. The
/// warning region above `safe` is intentionally narrower than the one below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelBand {
    pub min: f64,
    pub max: f64,
    pub safe: f64,
}

impl ChannelBand {
    pub const TEMPERATURE: Self = Self::new(20.0, 30.0, 24.0);
    pub const PRESSURE: Self = Self::new(990.0, 1030.0, 1000.0);
    pub const MOISTURE: Self = Self::new(20.0, 70.0, 35.0);
    pub const VIBRATION: Self = Self::new(0.0, 1.0, 0.2);

    pub const fn new(min: f64, max: f64, safe: f64) -> Self {
        Self { min, max, safe }
    }

    /// Default band for a channel.
    pub const fn default_for(channel: Channel) -> Self {
        match channel {
            Channel::Temperature => Self::TEMPERATURE,
            Channel::Pressure => Self::PRESSURE,
            Channel::Moisture => Self::MOISTURE,
            Channel::Vibration => Self::VIBRATION,
        }
    }

    /// Upper edge of the normal region: `max - (max - safe) / 2`.
    pub fn warning_upper(&self) -> f64 {
        self.max - (self.max - self.safe) / 2.0
    }

    /// Problems with this band, if any. `name` prefixes each message.
    pub fn check(&self, name: &str) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.min.is_finite() && self.max.is_finite() && self.safe.is_finite()) {
            errors.push(format!(
                "{name}: values must be finite (got min={}, max={}, safe={})",
                self.min, self.max, self.safe
            ));
            return errors;
        }
        if self.min >= self.max {
            errors.push(format!(
                "{name}: min ({}) must be less than max ({})",
                self.min, self.max
            ));
        }
        if self.safe < self.min || self.safe > self.max {
            errors.push(format!(
                "{name}: safe ({}) must lie within [{}, {}]",
                self.safe, self.min, self.max
            ));
        }
        errors
    }
}

/// One band per channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelBands {
    #[serde(default = "default_temperature")]
    pub temperature: ChannelBand,
    #[serde(default = "default_pressure")]
    pub pressure: ChannelBand,
    #[serde(default = "default_moisture")]
    pub moisture: ChannelBand,
    #[serde(default = "default_vibration")]
    pub vibration: ChannelBand,
}

const fn default_temperature() -> ChannelBand {
    ChannelBand::TEMPERATURE
}

const fn default_pressure() -> ChannelBand {
    ChannelBand::PRESSURE
}

const fn default_moisture() -> ChannelBand {
    ChannelBand::MOISTURE
}

const fn default_vibration() -> ChannelBand {
    ChannelBand::VIBRATION
}

impl Default for ChannelBands {
    fn default() -> Self {
        Self {
            temperature: ChannelBand::TEMPERATURE,
            pressure: ChannelBand::PRESSURE,
            moisture: ChannelBand::MOISTURE,
            vibration: ChannelBand::VIBRATION,
        }
    }
}

impl ChannelBands {
    pub const fn get(&self, channel: Channel) -> &ChannelBand {
        match channel {
            Channel::Temperature => &self.temperature,
            Channel::Pressure => &self.pressure,
            Channel::Moisture => &self.moisture,
            Channel::Vibration => &self.vibration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_upper_is_midpoint_of_safe_and_max() {
        assert!((ChannelBand::TEMPERATURE.warning_upper() - 27.0).abs() < 1e-9);
        assert!((ChannelBand::PRESSURE.warning_upper() - 1015.0).abs() < 1e-9);
        assert!((ChannelBand::MOISTURE.warning_upper() - 52.5).abs() < 1e-9);
        assert!((ChannelBand::VIBRATION.warning_upper() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_default_bands_check_clean() {
        let bands = ChannelBands::default();
        for channel in Channel::ALL {
            assert!(bands.get(channel).check(channel.name()).is_empty());
        }
    }

    #[test]
    fn test_inverted_band_rejected() {
        let errors = ChannelBand::new(30.0, 20.0, 24.0).check("temperature");
        assert!(errors.iter().any(|e| e.contains("min")));
    }

    #[test]
    fn test_safe_outside_band_rejected() {
        let errors = ChannelBand::new(20.0, 30.0, 35.0).check("temperature");
        assert!(errors.iter().any(|e| e.contains("safe")));
    }
}
