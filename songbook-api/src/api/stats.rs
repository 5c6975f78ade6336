//! Statistics endpoint

use axum::{extract::State, http::StatusCode, routing::get, Router};

use super::{reply, Reply};
use crate::error::ApiResult;
use crate::stats::{collect_statistics, StatisticsReport};
use crate::AppState;

/// GET /stats
pub async fn get_statistics(State(state): State<AppState>) -> ApiResult<Reply<StatisticsReport>> {
    let report = collect_statistics(&state.songs).await?;
    Ok(reply(StatusCode::OK, "Statistics retrieved successfully", report))
}

/// Build statistics routes
pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_statistics))
}
