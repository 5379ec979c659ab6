//! Remote power control

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::{body_field, DashboardState};
use crate::api::envelope::ApiErrorResponse;
use crate::pipeline::{ControlError, PowerStatus};

#[derive(Debug, Serialize)]
pub struct PowerState {
    pub command: PowerStatus,
}

#[derive(Debug, Serialize)]
pub struct PowerCommanded {
    pub status: String,
    pub command: PowerStatus,
}

/// GET /api/control/power
pub async fn get_power(State(state): State<DashboardState>) -> Json<PowerState> {
    let app_state = state.app_state.read().await;
    Json(PowerState {
        command: app_state.control.power(),
    })
}

/// POST /api/control/power
pub async fn post_power(
    State(state): State<DashboardState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return ApiErrorResponse::from_rejection(&rejection),
    };

    let command = match body_field(&body, &["command"]) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => {
            return ApiErrorResponse::bad_request(
                ControlError::InvalidCommand(other.to_string()).to_string(),
            )
        }
        None => return ApiErrorResponse::bad_request("Missing field 'command'."),
    };

    let result = state.app_state.write().await.control.set_power(&command);

    match result {
        Ok(command) => Json(PowerCommanded {
            status: format!("Device successfully commanded to {command}."),
            command,
        })
        .into_response(),
        Err(e) => ApiErrorResponse::bad_request(e.to_string()),
    }
}
