//! Trend analytics over the history window

use serde::{Serialize, Serializer};
use statrs::statistics::Statistics;

use crate::types::NO_DATA_SENTINEL;

/// Average and maximum of a trended channel.
///
/// Both are `None` when there is no history; on the wire that is `"N/A"`,
/// otherwise a two-decimal string such as `"24.50"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSummary {
    #[serde(serialize_with = "serialize_metric")]
    pub avg: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub max: Option<f64>,
}

impl TrendSummary {
    pub const NOT_AVAILABLE: Self = Self {
        avg: None,
        max: None,
    };

    pub const fn is_available(&self) -> bool {
        self.avg.is_some()
    }
}

/// Summarize a sequence of values: mean and max rounded to 2 decimals.
pub fn summarize<I>(values: I) -> TrendSummary
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return TrendSummary::NOT_AVAILABLE;
    }
    let avg = Statistics::mean(values.iter());
    let max = Statistics::max(values.iter());
    TrendSummary {
        avg: Some(round2(avg)),
        max: Some(round2(max)),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Render a metric the way the dashboard displays it.
pub fn format_metric(v: Option<f64>) -> String {
    v.map_or_else(|| NO_DATA_SENTINEL.to_string(), |v| format!("{v:.2}"))
}

fn serialize_metric<S: Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_metric(*v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_not_available() {
        let s = summarize(Vec::new());
        assert_eq!(s, TrendSummary::NOT_AVAILABLE);
        assert!(!s.is_available());
        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json["avg"], "N/A");
        assert_eq!(json["max"], "N/A");
    }

    #[test]
    fn test_single_element() {
        let s = summarize([5.0]);
        assert_eq!(s.avg, Some(5.0));
        assert_eq!(s.max, Some(5.0));
        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json["avg"], "5.00");
        assert_eq!(json["max"], "5.00");
    }

    #[test]
    fn test_mean_and_max_rounded() {
        let s = summarize([24.1, 25.333, 26.0]);
        assert_eq!(s.avg, Some(25.14));
        assert_eq!(s.max, Some(26.0));
    }

    #[test]
    fn test_small_vibration_values() {
        let s = summarize([0.1, 0.15, 0.2]);
        assert_eq!(s.avg, Some(0.15));
        assert_eq!(s.max, Some(0.2));
    }
}
