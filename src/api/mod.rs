//! REST API module using Axum
//!
//! HTTP endpoints for the sensing device and the monitoring dashboard. The
//! device posts readings and polls its control settings; the dashboard polls
//! the latest reading and requests narratives.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::DashboardState;

use axum::http::{header, Method};
use axum::response::Response;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::defaults::{CORS_ORIGINS_ENV, MAX_REQUEST_BODY_BYTES};
use envelope::ApiErrorResponse;

/// Build the CORS layer.
///
/// Set `SENSOR_CORS_ORIGINS` to a comma-separated list of allowed origins to
/// restrict access; otherwise any origin may poll.
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    match std::env::var(CORS_ORIGINS_ENV) {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base.allow_origin(Any),
    }
}

async fn not_found() -> Response {
    ApiErrorResponse::not_found("No such endpoint")
}

/// Create the complete application router.
///
/// Layers run top to bottom: CORS, tracing, then the body limit.
pub fn create_app(state: DashboardState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes(state.clone()))
        .merge(routes::health_routes(state))
        .fallback(not_found)
        // Each `Router::layer` call is outermost over the previous ones, so the
        // resulting order is still CORS, tracing, then the body limit.
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}
