//! Vibration stimulus settings

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::{body_field, DashboardState};
use crate::api::envelope::ApiErrorResponse;
use crate::pipeline::parse_duration;

#[derive(Debug, Serialize)]
pub struct VibrationSetting {
    pub duration_ms: u32,
}

#[derive(Debug, Serialize)]
pub struct VibrationSaved {
    pub status: String,
    pub duration_ms: u32,
}

/// GET /api/settings/vibration
pub async fn get_vibration(State(state): State<DashboardState>) -> Json<VibrationSetting> {
    let app_state = state.app_state.read().await;
    Json(VibrationSetting {
        duration_ms: app_state.control.vibration_duration_ms(),
    })
}

/// POST /api/settings/vibration
///
/// Body `{ "duration_ms": n }`; `duration` is accepted as an alias.
pub async fn post_vibration(
    State(state): State<DashboardState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return ApiErrorResponse::from_rejection(&rejection),
    };

    let Some(raw) = body_field(&body, &["duration_ms", "duration"]) else {
        return ApiErrorResponse::bad_request("Missing field 'duration_ms'.");
    };

    let requested = match parse_duration(raw) {
        Ok(ms) => ms,
        Err(e) => return ApiErrorResponse::bad_request(e.to_string()),
    };

    let result = state
        .app_state
        .write()
        .await
        .control
        .set_vibration_duration(requested);

    match result {
        Ok(duration_ms) => Json(VibrationSaved {
            status: "Vibration duration saved!".to_string(),
            duration_ms,
        })
        .into_response(),
        Err(e) => ApiErrorResponse::bad_request(e.to_string()),
    }
}
