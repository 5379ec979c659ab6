//! Health endpoint

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::DashboardState;
use crate::llm::NarrativeStats;
use crate::pipeline::{IngestStats, PowerStatus};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub device_power: PowerStatus,
    pub vibration_duration_ms: u32,
    pub storage_backend: &'static str,
    /// `None` when the store could not be read
    pub stored_readings: Option<usize>,
    pub narrative_backend: &'static str,
    pub ingest: IngestStats,
    pub narrative: NarrativeStats,
}

/// GET /health
pub async fn health_check(State(state): State<DashboardState>) -> Json<HealthResponse> {
    let (uptime_secs, device_power, vibration_duration_ms, ingest) = {
        let app_state = state.app_state.read().await;
        (
            app_state.uptime_secs(),
            app_state.control.power(),
            app_state.control.vibration_duration_ms(),
            app_state.ingest_stats,
        )
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs,
        device_power,
        vibration_duration_ms,
        storage_backend: state.store().backend_name(),
        stored_readings: state.store().len().ok(),
        narrative_backend: state.narrator.backend_name(),
        ingest,
        narrative: state.narrator.stats().await,
    })
}
