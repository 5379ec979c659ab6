//! Application State
//!
//! Shared state for the monitor, accessible from API handlers and the
//! ingestion gateway. Wrapped in `Arc<RwLock<>>` by the server; every
//! mutation happens under one write guard.

use std::time::Instant;

use super::{DeviceControl, HistoryWindow, IngestStats, PowerStatus};
use crate::config::MonitorConfig;
use crate::types::Reading;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Power and vibration-duration settings for the device
    pub control: DeviceControl,

    /// Rolling temperature / vibration history
    pub history: HistoryWindow,

    /// Ingestion counters
    pub ingest_stats: IngestStats,

    /// System uptime
    pub uptime: Instant,
}

impl Default for AppState {
    /// Deterministic defaults suitable for tests.
    /// For production startup use [`AppState::from_config()`].
    fn default() -> Self {
        Self {
            control: DeviceControl::default(),
            history: HistoryWindow::default(),
            ingest_stats: IngestStats::default(),
            uptime: Instant::now(),
        }
    }
}

impl AppState {
    /// Build from the validated config, seeding history from stored readings
    /// (oldest first).
    pub fn from_config(cfg: &MonitorConfig, recent: &[Reading]) -> Self {
        let power = if cfg.control.default_power.eq_ignore_ascii_case("OFF") {
            PowerStatus::Off
        } else {
            PowerStatus::On
        };
        let mut history = HistoryWindow::new(cfg.history.capacity);
        history.seed(recent);
        Self {
            control: DeviceControl::new(power, cfg.control.default_vibration_duration_ms),
            history,
            ..Self::default()
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.uptime.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Channel;

    #[test]
    fn test_app_state_default() {
        let state = AppState::default();
        assert!(state.control.is_on());
        assert_eq!(state.control.vibration_duration_ms(), 10_000);
        assert_eq!(state.history.capacity(), 15);
        assert_eq!(state.ingest_stats, IngestStats::default());
    }

    #[test]
    fn test_from_config_applies_defaults_and_seeds() {
        let mut cfg = MonitorConfig::default();
        cfg.control.default_power = "OFF".to_string();
        cfg.control.default_vibration_duration_ms = 30_000;
        cfg.history.capacity = 5;
        let recent: Vec<Reading> = (0..8)
            .map(|i| Reading::now(20.0 + f64::from(i), 1000.0, 40.0, 0.1))
            .collect();

        let state = AppState::from_config(&cfg, &recent);
        assert!(!state.control.is_on());
        assert_eq!(state.control.vibration_duration_ms(), 30_000);
        assert_eq!(state.history.len(Channel::Temperature), 5);
        assert_eq!(state.history.values(Channel::Temperature).last(), Some(27.0));
    }

    #[test]
    fn test_oversized_capacity_never_exceeds_window() {
        let mut cfg = MonitorConfig::default();
        cfg.history.capacity = 50;
        let recent: Vec<Reading> = (0..40)
            .map(|i| Reading::now(20.0 + f64::from(i) * 0.1, 1000.0, 40.0, 0.1))
            .collect();

        let state = AppState::from_config(&cfg, &recent);
        assert_eq!(state.history.capacity(), 15);
        assert_eq!(state.history.len(Channel::Temperature), 15);
        assert_eq!(state.history.len(Channel::Vibration), 15);
    }
}
