//! Risk narrative endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::DashboardState;
use crate::llm::NarrativeRequest;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

/// POST /api/ai/risk-analysis
///
/// Always 200. A malformed body is treated as "no data" and answered with
/// the awaiting message. No lock is held while the backend is called.
pub async fn post_risk_analysis(
    State(state): State<DashboardState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Json<AnalysisResponse> {
    let body = body.map(|Json(v)| v).unwrap_or_default();
    let request = NarrativeRequest::from_json(&body);
    let analysis = state.narrator.narrate(&request).await;
    Json(AnalysisResponse { analysis })
}
