//! Threshold classification of a single channel value

use crate::types::{ChannelBand, ChannelStatus, ChannelValue, SignalStatus, UnavailableReason};

/// Classify one channel value against its band.
///
/// Unavailable values map to OFFLINE / NO_DATA with a zero percentage.
/// Measured values get a percentage clamped to `[0, 100]` and a status:
/// CRITICAL outside `[min, max]`, WARNING below `safe` or above
/// [`ChannelBand::warning_upper`], NORMAL otherwise.
pub fn classify(value: ChannelValue, band: &ChannelBand) -> ChannelStatus {
    let v = match value {
        ChannelValue::Measured(v) => v,
        ChannelValue::Unavailable(UnavailableReason::ConnectionError) => {
            return ChannelStatus::unavailable(SignalStatus::Offline);
        }
        ChannelValue::Unavailable(UnavailableReason::NoData) => {
            return ChannelStatus::unavailable(SignalStatus::NoData);
        }
    };

    let percentage = band_percentage(v, band);

    let status = if !v.is_finite() || v < band.min || v > band.max {
        SignalStatus::Critical
    } else if v < band.safe || v > band.warning_upper() {
        SignalStatus::Warning
    } else {
        SignalStatus::Normal
    };

    ChannelStatus { status, percentage }
}

/// Position of `v` within the band as a percentage in `[0, 100]`.
fn band_percentage(v: f64, band: &ChannelBand) -> f64 {
    let raw = (v - band.min) / (band.max - band.min) * 100.0;
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}
