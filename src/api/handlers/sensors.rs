//! Sensor endpoints: device write path, latest reading, assessment, history

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::DashboardState;
use crate::api::envelope::ApiErrorResponse;
use crate::pipeline::{assess, Assessment, HistoryPoint, IngestOutcome, PowerStatus, SensorPayload};
use crate::types::{Channel, ReadingSnapshot};

/// Latest reading merged with the current power state, so the dashboard can
/// stay in sync with the control plane.
#[derive(Debug, Serialize)]
pub struct LatestResponse {
    #[serde(flatten)]
    pub reading: ReadingSnapshot,
    #[serde(rename = "devicePowerStatus")]
    pub device_power_status: PowerStatus,
}

/// GET /api/sensors/latest
pub async fn get_latest(State(state): State<DashboardState>) -> Json<LatestResponse> {
    let latest = state.latest_reading();
    let power = state.app_state.read().await.control.power();
    Json(LatestResponse {
        reading: ReadingSnapshot::from(latest.as_ref()),
        device_power_status: power,
    })
}

/// POST /api/sensors/data
///
/// 201 accepted, 202 ignored (device OFF), 400 malformed, 500 storage failure.
pub async fn post_data(
    State(state): State<DashboardState>,
    payload: Result<Json<SensorPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return ApiErrorResponse::from_rejection(&rejection),
    };

    let outcome = {
        let mut app_state = state.app_state.write().await;
        state.gateway.ingest(&mut app_state, &payload)
    };

    match outcome {
        Ok(IngestOutcome::Accepted(_)) => (
            StatusCode::CREATED,
            Json(json!({ "status": "Reading saved successfully." })),
        )
            .into_response(),
        Ok(IngestOutcome::Ignored) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "Ignored. Device is remotely OFF." })),
        )
            .into_response(),
        Ok(IngestOutcome::Rejected(reason)) => ApiErrorResponse::bad_request(reason),
        Err(e) => {
            error!(error = %e, "Failed to persist reading");
            ApiErrorResponse::internal("Failed to save reading")
        }
    }
}

/// GET /api/sensors/assessment
pub async fn get_assessment(State(state): State<DashboardState>) -> Json<Assessment> {
    let latest = state.latest_reading();
    let app_state = state.app_state.read().await;
    Json(assess(latest.as_ref(), &state.bands, &app_state.history, true))
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub capacity: usize,
    pub temperature: Vec<HistoryPoint>,
    pub vibration: Vec<HistoryPoint>,
}

/// GET /api/sensors/history
pub async fn get_history(State(state): State<DashboardState>) -> Json<HistoryResponse> {
    let app_state = state.app_state.read().await;
    let history = &app_state.history;
    Json(HistoryResponse {
        capacity: history.capacity(),
        temperature: history.points(Channel::Temperature).cloned().collect(),
        vibration: history.points(Channel::Vibration).cloned().collect(),
    })
}
