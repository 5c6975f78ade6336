//! Health check endpoints

use axum::{extract::State, http::StatusCode, routing::get, Router};
use serde::Serialize;

use super::{reply, Reply};
use crate::AppState;

/// Health payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub environment: String,
}

/// GET / and GET /health
pub async fn health_check(State(state): State<AppState>) -> Reply<HealthResponse> {
    reply(
        StatusCode::OK,
        "Song catalog API is running",
        HealthResponse {
            status: "ok".to_string(),
            module: "songbook-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: state.environment.to_string(),
        },
    )
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
}
