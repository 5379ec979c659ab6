//! API route definitions
//!
//! - /api/sensors/* - device write path and dashboard reads
//! - /api/ai/risk-analysis - clinical narrative
//! - /api/settings/vibration, /api/control/power - device control plane
//! - /health - service health

use axum::{routing::get, routing::post, Router};

use super::handlers::{self, DashboardState};

/// Create all `/api` routes
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        // Sensors
        .route("/sensors/latest", get(handlers::get_latest))
        .route("/sensors/data", post(handlers::post_data))
        .route("/sensors/assessment", get(handlers::get_assessment))
        .route("/sensors/history", get(handlers::get_history))
        // Narrative
        .route("/ai/risk-analysis", post(handlers::post_risk_analysis))
        // Control plane
        .route(
            "/settings/vibration",
            get(handlers::get_vibration).post(handlers::post_vibration),
        )
        .route(
            "/control/power",
            get(handlers::get_power).post(handlers::post_power),
        )
        .with_state(state)
}

/// Health endpoint at root level
pub fn health_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state)
}
