//! Clinical status levels

use serde::{Deserialize, Serialize};

/// Status of one channel, or the overall verdict across channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStatus {
    Normal,
    Warning,
    Critical,
    Offline,
    /// The dashboard historically spelled this `NO DATA`.
    #[serde(alias = "NO DATA")]
    NoData,
}

impl SignalStatus {
    /// Aggregation rank: CRITICAL > WARNING > OFFLINE > NO_DATA > NORMAL.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::NoData => 1,
            Self::Offline => 2,
            Self::Warning => 3,
            Self::Critical => 4,
        }
    }

    /// True when the status carries no usable measurement.
    pub const fn is_unavailable(self) -> bool {
        matches!(self, Self::Offline | Self::NoData)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Offline => "OFFLINE",
            Self::NoData => "NO_DATA",
        }
    }
}

impl std::fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SignalStatus {
    fn default() -> Self {
        Self::NoData
    }
}

/// Classification result for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub status: SignalStatus,
    /// Position within the band, always in `[0, 100]`
    pub percentage: f64,
}

impl ChannelStatus {
    pub const fn unavailable(status: SignalStatus) -> Self {
        Self {
            status,
            percentage: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        let ordered = [
            SignalStatus::Normal,
            SignalStatus::NoData,
            SignalStatus::Offline,
            SignalStatus::Warning,
            SignalStatus::Critical,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].precedence() < pair[1].precedence());
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_value(SignalStatus::NoData).unwrap(), "NO_DATA");
        let legacy: SignalStatus = serde_json::from_str("\"NO DATA\"").unwrap();
        assert_eq!(legacy, SignalStatus::NoData);
        let crit: SignalStatus = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(crit, SignalStatus::Critical);
    }
}
