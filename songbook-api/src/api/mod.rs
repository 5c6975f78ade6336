//! HTTP API handlers for songbook-api

pub mod health;
pub mod songs;
pub mod stats;

pub use health::health_routes;
pub use songs::song_routes;
pub use stats::stats_routes;

use axum::{http::StatusCode, http::Uri, Json};
use serde::Serialize;

use crate::error::ApiError;

/// Success envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Status code plus JSON envelope, the return shape of every handler
pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

pub(crate) fn reply<T: Serialize>(status: StatusCode, message: &str, data: T) -> Reply<T> {
    (status, Json(ApiResponse::ok(message, data)))
}

/// Fallback for requests no route matched; the message echoes the query too
pub async fn route_not_found(uri: Uri) -> ApiError {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    ApiError::RouteNotFound(target.to_string())
}
