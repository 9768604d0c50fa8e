pub mod leaderboard_handler;
pub mod score_handler;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::application::services::ScoringService;
use crate::domain::errors::StoreError;

/// Shared handler state
pub type AppState = Arc<ScoringService>;

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, error: impl ToString) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

pub(crate) fn store_error_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Constraint(_) => StatusCode::CONFLICT,
        StoreError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Limits applied to the HTTP surface
#[derive(Debug, Clone, Copy)]
pub struct RouterLimits {
    pub max_body_bytes: usize,
    pub max_concurrent_requests: usize,
}

impl Default for RouterLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
            max_concurrent_requests: 256,
        }
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "running" }))
}

pub fn router(service: AppState, limits: RouterLimits) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/events/:event_id/scores",
            post(score_handler::submit_score),
        )
        .route(
            "/events/:event_id/leaderboard",
            get(leaderboard_handler::get_leaderboard),
        )
        .route(
            "/events/:event_id/summary",
            get(leaderboard_handler::get_summary),
        )
        .route("/filters", get(leaderboard_handler::get_filter_options))
        .layer(RequestBodyLimitLayer::new(limits.max_body_bytes))
        .layer(ConcurrencyLimitLayer::new(limits.max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
