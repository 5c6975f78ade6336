//! songbook-api library - song catalog microservice
//!
//! Record store, statistics aggregation and the HTTP surface over both.

use axum::{middleware, Router};
use songbook_common::config::RuntimeEnvironment;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod stats;

pub use crate::error::{ApiError, ApiResult};

use crate::db::SongStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Song record store over the injected connection pool
    pub songs: SongStore,
    /// Decides whether error responses include failure detail
    pub environment: RuntimeEnvironment,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, environment: RuntimeEnvironment) -> Self {
        Self {
            songs: SongStore::new(db),
            environment,
        }
    }
}

/// Build application router
///
/// Song and statistics routes are served both at the root and under `/api`.
pub fn build_router(state: AppState) -> Router {
    let catalog = Router::new()
        .merge(api::song_routes())
        .merge(api::stats_routes());

    Router::new()
        .merge(api::health_routes())
        .merge(catalog.clone())
        .nest("/api", catalog)
        .fallback(api::route_not_found)
        .layer(middleware::from_fn(error::envelope_method_not_allowed))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error::expose_failure_detail,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
