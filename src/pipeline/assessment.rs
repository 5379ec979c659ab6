//! Assessment: one dashboard snapshot combining the per-channel
//! classification, the overall verdict and trend analytics.

use serde::Serialize;

use super::HistoryWindow;
use crate::processing::{aggregate, classify, summarize, TrendSummary};
use crate::types::{
    Channel, ChannelBands, ChannelValue, Reading, ReadingSnapshot, SignalStatus,
};

/// Value and classification for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelAssessment {
    pub value: ChannelValue,
    pub status: SignalStatus,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelAssessments {
    pub temperature: ChannelAssessment,
    pub pressure: ChannelAssessment,
    pub moisture: ChannelAssessment,
    pub vibration: ChannelAssessment,
}

impl ChannelAssessments {
    pub const fn get(&self, channel: Channel) -> &ChannelAssessment {
        match channel {
            Channel::Temperature => &self.temperature,
            Channel::Pressure => &self.pressure,
            Channel::Moisture => &self.moisture,
            Channel::Vibration => &self.vibration,
        }
    }

    pub fn statuses(&self) -> impl Iterator<Item = SignalStatus> + '_ {
        Channel::ALL.into_iter().map(|c| self.get(c).status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendAnalytics {
    pub temperature: TrendSummary,
    pub vibration: TrendSummary,
}

impl TrendAnalytics {
    pub fn from_history(history: &HistoryWindow) -> Self {
        Self {
            temperature: summarize(history.values(Channel::Temperature)),
            vibration: summarize(history.values(Channel::Vibration)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub channels: ChannelAssessments,
    pub overall_status: SignalStatus,
    pub analytics: TrendAnalytics,
    pub timestamp: String,
}

/// Assess the latest stored reading. `None` yields NO_DATA everywhere.
pub fn assess(
    latest: Option<&Reading>,
    bands: &ChannelBands,
    history: &HistoryWindow,
    connectivity_ok: bool,
) -> Assessment {
    assess_snapshot(&ReadingSnapshot::from(latest), bands, history, connectivity_ok)
}

/// Assess a consumer-side snapshot. When connectivity is lost every channel
/// is reported as a connection error, whatever the snapshot held.
pub fn assess_snapshot(
    snapshot: &ReadingSnapshot,
    bands: &ChannelBands,
    history: &HistoryWindow,
    connectivity_ok: bool,
) -> Assessment {
    let offline;
    let snapshot = if connectivity_ok {
        snapshot
    } else {
        offline = ReadingSnapshot::connection_error();
        &offline
    };

    let channel = |c: Channel| {
        let value = snapshot.get(c);
        let status = classify(value, bands.get(c));
        ChannelAssessment {
            value,
            status: status.status,
            percentage: status.percentage,
        }
    };
    let channels = ChannelAssessments {
        temperature: channel(Channel::Temperature),
        pressure: channel(Channel::Pressure),
        moisture: channel(Channel::Moisture),
        vibration: channel(Channel::Vibration),
    };

    Assessment {
        overall_status: aggregate(channels.statuses(), connectivity_ok),
        channels,
        analytics: TrendAnalytics::from_history(history),
        timestamp: snapshot.timestamp.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_reading() {
        let reading = Reading::now(25.0, 1005.0, 40.0, 0.3);
        let mut history = HistoryWindow::default();
        history.record_reading(&reading);
        let a = assess(Some(&reading), &ChannelBands::default(), &history, true);
        assert_eq!(a.overall_status, SignalStatus::Normal);
        assert_eq!(a.channels.temperature.status, SignalStatus::Normal);
        assert_eq!(a.analytics.temperature.avg, Some(25.0));
        assert_eq!(a.timestamp, reading.timestamp);
    }

    #[test]
    fn test_no_reading_is_no_data() {
        let a = assess(None, &ChannelBands::default(), &HistoryWindow::default(), true);
        assert_eq!(a.overall_status, SignalStatus::NoData);
        assert!(a.statuses_all(SignalStatus::NoData));
        assert!(!a.analytics.temperature.is_available());
        assert_eq!(a.timestamp, "No Data Yet");
    }

    #[test]
    fn test_connectivity_loss_hides_stale_values() {
        let reading = Reading::now(35.0, 1005.0, 40.0, 0.3);
        let a = assess(Some(&reading), &ChannelBands::default(), &HistoryWindow::default(), false);
        assert_eq!(a.overall_status, SignalStatus::Offline);
        assert!(a.statuses_all(SignalStatus::Offline));
        assert_eq!(a.channels.temperature.value, ChannelValue::CONNECTION_ERROR);
    }

    #[test]
    fn test_single_critical_channel_dominates() {
        let reading = Reading::now(25.0, 1005.0, 40.0, 1.5);
        let a = assess(Some(&reading), &ChannelBands::default(), &HistoryWindow::default(), true);
        assert_eq!(a.channels.vibration.status, SignalStatus::Critical);
        assert_eq!(a.channels.vibration.percentage, 100.0);
        assert_eq!(a.overall_status, SignalStatus::Critical);
    }

    #[test]
    fn test_wire_shape() {
        let reading = Reading::now(25.0, 1005.0, 40.0, 0.3);
        let a = assess(Some(&reading), &ChannelBands::default(), &HistoryWindow::default(), true);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["overallStatus"], "NORMAL");
        assert_eq!(json["channels"]["temperature"]["value"], 25.0);
        assert_eq!(json["analytics"]["vibration"]["avg"], "N/A");
    }

    impl Assessment {
        fn statuses_all(&self, status: SignalStatus) -> bool {
            self.channels.statuses().all(|s| s == status)
        }
    }
}
