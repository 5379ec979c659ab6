//! Bounded per-channel history for trend display

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::defaults::HISTORY_WINDOW_SIZE;
use crate::types::{Channel, ChannelValue, Reading};

/// One recorded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: String,
    pub value: f64,
}

/// Insertion-ordered FIFO window per channel; oldest entry is evicted once
/// the capacity is exceeded.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    capacity: usize,
    channels: [VecDeque<HistoryPoint>; 4],
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(HISTORY_WINDOW_SIZE)
    }
}

impl HistoryWindow {
    /// Capacity is clamped to `1..=HISTORY_WINDOW_SIZE`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, HISTORY_WINDOW_SIZE);
        Self {
            capacity,
            channels: std::array::from_fn(|_| VecDeque::with_capacity(capacity + 1)),
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a point, evicting the oldest if the window is full.
    pub fn push(&mut self, channel: Channel, point: HistoryPoint) {
        let buf = &mut self.channels[channel.index()];
        buf.push_back(point);
        while buf.len() > self.capacity {
            buf.pop_front();
        }
    }

    /// Record a channel value if it is a measurement. Returns whether
    /// anything was recorded; unavailable values never enter the window.
    pub fn record(&mut self, channel: Channel, timestamp: &str, value: ChannelValue) -> bool {
        match value {
            ChannelValue::Measured(v) if v.is_finite() => {
                self.push(
                    channel,
                    HistoryPoint {
                        timestamp: timestamp.to_string(),
                        value: v,
                    },
                );
                true
            }
            _ => false,
        }
    }

    /// Record the trended channels of an accepted reading.
    pub fn record_reading(&mut self, reading: &Reading) {
        for channel in Channel::TRENDED {
            self.record(
                channel,
                &reading.timestamp,
                ChannelValue::Measured(reading.get(channel)),
            );
        }
    }

    /// Values in insertion order. Call again to restart.
    pub fn values(&self, channel: Channel) -> impl Iterator<Item = f64> + Clone + '_ {
        self.channels[channel.index()].iter().map(|p| p.value)
    }

    pub fn points(&self, channel: Channel) -> impl Iterator<Item = &HistoryPoint> + '_ {
        self.channels[channel.index()].iter()
    }

    pub fn len(&self, channel: Channel) -> usize {
        self.channels[channel.index()].len()
    }

    pub fn is_empty(&self, channel: Channel) -> bool {
        self.channels[channel.index()].is_empty()
    }

    pub fn clear(&mut self) {
        for buf in &mut self.channels {
            buf.clear();
        }
    }

    /// Rebuild from stored readings (oldest first), e.g. at startup.
    pub fn seed<'a, I>(&mut self, readings: I)
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        for reading in readings {
            self.record_reading(reading);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> HistoryPoint {
        HistoryPoint {
            timestamp: format!("t{i}"),
            value: i as f64,
        }
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut w = HistoryWindow::new(15);
        for i in 0..40 {
            w.push(Channel::Temperature, point(i));
            assert!(w.len(Channel::Temperature) <= 15);
        }
        assert_eq!(w.len(Channel::Temperature), 15);
    }

    #[test]
    fn test_sixteenth_push_evicts_oldest() {
        let mut w = HistoryWindow::new(15);
        for i in 0..15 {
            w.push(Channel::Vibration, point(i));
        }
        assert_eq!(w.values(Channel::Vibration).next(), Some(0.0));
        w.push(Channel::Vibration, point(15));
        let values: Vec<f64> = w.values(Channel::Vibration).collect();
        assert_eq!(values.len(), 15);
        assert_eq!(values.first(), Some(&1.0));
        assert_eq!(values.last(), Some(&15.0));
    }

    #[test]
    fn test_values_are_restartable() {
        let mut w = HistoryWindow::default();
        w.push(Channel::Temperature, point(1));
        w.push(Channel::Temperature, point(2));
        let first: Vec<f64> = w.values(Channel::Temperature).collect();
        let second: Vec<f64> = w.values(Channel::Temperature).collect();
        assert_eq!(first, vec![1.0, 2.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sentinels_not_recorded() {
        let mut w = HistoryWindow::default();
        assert!(!w.record(Channel::Temperature, "t", ChannelValue::NO_DATA));
        assert!(!w.record(Channel::Temperature, "t", ChannelValue::CONNECTION_ERROR));
        assert!(!w.record(Channel::Temperature, "t", ChannelValue::Measured(f64::NAN)));
        assert!(w.is_empty(Channel::Temperature));
        assert!(w.record(Channel::Temperature, "t", ChannelValue::Measured(22.0)));
        assert_eq!(w.len(Channel::Temperature), 1);
    }

    #[test]
    fn test_record_reading_only_trended_channels() {
        let mut w = HistoryWindow::default();
        w.record_reading(&Reading::now(22.0, 1005.0, 40.0, 0.1));
        assert_eq!(w.len(Channel::Temperature), 1);
        assert_eq!(w.len(Channel::Vibration), 1);
        assert!(w.is_empty(Channel::Pressure));
        assert!(w.is_empty(Channel::Moisture));
    }

    #[test]
    fn test_zero_capacity_raised_to_one() {
        let mut w = HistoryWindow::new(0);
        w.push(Channel::Temperature, point(1));
        w.push(Channel::Temperature, point(2));
        assert_eq!(w.capacity(), 1);
        assert_eq!(w.values(Channel::Temperature).collect::<Vec<_>>(), vec![2.0]);
    }

    #[test]
    fn test_capacity_capped_at_window_size() {
        let mut w = HistoryWindow::new(50);
        assert_eq!(w.capacity(), HISTORY_WINDOW_SIZE);
        for i in 0..40 {
            w.push(Channel::Temperature, point(i));
        }
        assert_eq!(w.len(Channel::Temperature), HISTORY_WINDOW_SIZE);
    }

    #[test]
    fn test_seed_keeps_latest() {
        let readings: Vec<Reading> = (0..20)
            .map(|i| Reading::now(20.0 + f64::from(i) * 0.1, 1000.0, 40.0, 0.1))
            .collect();
        let mut w = HistoryWindow::new(15);
        w.seed(&readings);
        assert_eq!(w.len(Channel::Temperature), 15);
        let first = w.values(Channel::Temperature).next().unwrap();
        assert!((first - 20.5).abs() < 1e-9);
    }
}
