//! Song CRUD endpoints
//!
//! Handlers only unwrap the request and pick the success message; validation,
//! normalization and lookups happen in the store.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use songbook_common::db::{Song, SongDraft, SongPatch};

use super::{reply, Reply};
use crate::db::{parse_song_id, ListOptions, SongPage};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /songs
pub async fn create_song(
    State(state): State<AppState>,
    payload: Result<Json<SongDraft>, JsonRejection>,
) -> ApiResult<Reply<Song>> {
    let Json(draft) = payload.map_err(bad_body)?;
    let song = state.songs.create(draft).await?;
    Ok(reply(StatusCode::CREATED, "Song created successfully", song))
}

/// GET /songs?genre=&artist=&album=&search=&page=&limit=
pub async fn list_songs(
    State(state): State<AppState>,
    query: Result<Query<ListOptions>, QueryRejection>,
) -> ApiResult<Reply<SongPage>> {
    let Query(options) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let page = state.songs.list(&options).await?;
    Ok(reply(StatusCode::OK, "Songs retrieved successfully", page))
}

/// GET /songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply<Song>> {
    let id = parse_song_id(&id)?;
    let song = state.songs.get(id).await?;
    Ok(reply(StatusCode::OK, "Song retrieved successfully", song))
}

/// PUT /songs/:id
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SongPatch>, JsonRejection>,
) -> ApiResult<Reply<Song>> {
    let id = parse_song_id(&id)?;
    let Json(patch) = payload.map_err(bad_body)?;
    let song = state.songs.update(id, patch).await?;
    Ok(reply(StatusCode::OK, "Song updated successfully", song))
}

/// DELETE /songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply<Song>> {
    let id = parse_song_id(&id)?;
    let song = state.songs.delete(id).await?;
    Ok(reply(StatusCode::OK, "Song deleted successfully", song))
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(list_songs).post(create_song))
        .route(
            "/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
}
