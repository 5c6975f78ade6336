//! Integration tests for songbook-api HTTP endpoints
//!
//! Tests cover:
//! - Song create/read/update/delete and the response envelope
//! - Listing filters and pagination
//! - Statistics endpoint
//! - Error translation (400/404/405) and environment-dependent detail
//! - Health check, `/api` prefix and unmatched routes

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use songbook_api::{build_router, AppState};
use songbook_common::config::RuntimeEnvironment;
use songbook_common::db::init_memory_database;
use tower::ServiceExt; // for `oneshot`

/// Test helper: router over a fresh in-memory catalog
async fn setup_app(environment: RuntimeEnvironment) -> axum::Router {
    let pool = init_memory_database()
        .await
        .expect("Should create in-memory database");
    build_router(AppState::new(pool, environment))
}

/// Test helper: send a request and decode the JSON body
async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).expect("Response body should be JSON");
    (status, value)
}

async fn create(app: &axum::Router, title: &str, artist: &str, album: &str, genre: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/songs",
        Some(json!({"title": title, "artist": artist, "album": album, "genre": genre})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["data"].clone()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    for uri in ["/", "/health"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Song catalog API is running");
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["module"], "songbook-api");
        assert!(body["data"]["version"].is_string());
    }
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_create_and_fetch_round_trip() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    let (status, body) = send(
        &app,
        "POST",
        "/songs",
        Some(json!({"title": "A", "artist": "B", "album": "C", "genre": "Rock"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Song created successfully");
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"]["updatedAt"].is_string());

    let (status, body) = send(&app, "GET", &format!("/songs/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Song retrieved successfully");
    assert_eq!(body["data"]["title"], "A");
    assert_eq!(body["data"]["artist"], "B");
    assert_eq!(body["data"]["album"], "C");
    assert_eq!(body["data"]["genre"], "rock");
}

#[tokio::test]
async fn test_create_missing_field_is_400() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    let (status, body) = send(
        &app,
        "POST",
        "/songs",
        Some(json!({"title": "A", "artist": "B", "genre": "rock"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "All fields are required: title, artist, album, genre");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_create_blank_field_is_400() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    let (status, body) = send(
        &app,
        "POST",
        "/songs",
        Some(json!({"title": "   ", "artist": "B", "album": "C", "genre": "rock"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_malformed_json_is_400_envelope() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    let request = Request::builder()
        .method("POST")
        .uri("/songs")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_update_replaces_only_supplied_fields() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    let song = create(&app, "Title", "Artist", "Album", "pop").await;
    let id = song["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/songs/{}", id),
        Some(json!({"genre": "  SYNTH-POP ", "title": "New Title"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Song updated successfully");
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["title"], "New Title");
    assert_eq!(body["data"]["artist"], "Artist");
    assert_eq!(body["data"]["album"], "Album");
    assert_eq!(body["data"]["genre"], "synth-pop");
    assert_eq!(body["data"]["createdAt"], song["createdAt"]);
}

#[tokio::test]
async fn test_update_empty_field_is_400() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    let song = create(&app, "Title", "Artist", "Album", "pop").await;
    let id = song["id"].as_str().unwrap();

    let (status, body) = send(&app, "PUT", &format!("/songs/{}", id), Some(json!({"artist": ""}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "artist cannot be empty");

    // Record untouched
    let (_, body) = send(&app, "GET", &format!("/songs/{}", id), None).await;
    assert_eq!(body["data"]["artist"], "Artist");
}

#[tokio::test]
async fn test_update_missing_song_is_404() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/songs/7f1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d",
        Some(json!({"title": "X"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Song not found");
}

#[tokio::test]
async fn test_delete_returns_record_then_404_repeatedly() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    let song = create(&app, "Gone", "Artist", "Album", "rock").await;
    let uri = format!("/songs/{}", song["id"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Song deleted successfully");
    assert_eq!(body["data"]["title"], "Gone");

    for _ in 0..2 {
        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Song not found");
    }

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_400() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    for method in ["GET", "DELETE"] {
        let (status, body) = send(&app, method, "/songs/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid ID format");
    }
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_defaults_and_newest_first() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    for i in 0..12 {
        create(&app, &format!("Song {}", i), "Artist", "Album", "rock").await;
    }

    let (status, body) = send(&app, "GET", "/songs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Songs retrieved successfully");

    let data = &body["data"];
    assert_eq!(data["totalSongs"], 12);
    assert_eq!(data["totalPages"], 2);
    assert_eq!(data["currentPage"], 1);

    let songs = data["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 10);
    assert_eq!(songs[0]["title"], "Song 11");
    assert_eq!(songs[9]["title"], "Song 2");

    let (_, body) = send(&app, "GET", "/songs?page=2", None).await;
    let songs = body["data"]["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 2);
    assert_eq!(songs[1]["title"], "Song 0");
}

#[tokio::test]
async fn test_list_artist_substring_filter() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    create(&app, "One", "John Doe", "X", "rock").await;
    create(&app, "Two", "Johnny", "Y", "jazz").await;
    create(&app, "Three", "Jane", "Z", "rock").await;

    let (status, body) = send(&app, "GET", "/songs?artist=john&limit=1", None).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["totalSongs"], 2);
    assert_eq!(data["totalPages"], 2);
    assert_eq!(data["songs"].as_array().unwrap().len(), 1);
    assert_eq!(data["songs"][0]["artist"], "Johnny");
}

#[tokio::test]
async fn test_list_genre_is_exact_case_insensitive() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    create(&app, "One", "A", "X", "Rock").await;
    create(&app, "Two", "B", "Y", "Rockabilly").await;

    let (_, body) = send(&app, "GET", "/songs?genre=ROCK", None).await;
    let songs = body["data"]["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["title"], "One");
}

#[tokio::test]
async fn test_list_search_combines_with_filters() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    create(&app, "Blue Train", "John Coltrane", "Blue Train", "jazz").await;
    create(&app, "So What", "Miles Davis", "Kind of Blue", "jazz").await;
    create(&app, "Blue Monday", "New Order", "Power, Corruption & Lies", "synth").await;
    create(&app, "Red", "Taylor Swift", "Red", "pop").await;

    let (_, body) = send(&app, "GET", "/songs?search=blue", None).await;
    assert_eq!(body["data"]["totalSongs"], 3);

    let (_, body) = send(&app, "GET", "/songs?search=BLUE&genre=jazz", None).await;
    assert_eq!(body["data"]["totalSongs"], 2);

    let (_, body) = send(&app, "GET", "/songs?search=blue&album=kind", None).await;
    assert_eq!(body["data"]["totalSongs"], 1);
    assert_eq!(body["data"]["songs"][0]["title"], "So What");
}

#[tokio::test]
async fn test_list_invalid_paging_is_400() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    for uri in ["/songs?page=0", "/songs?limit=0", "/songs?page=abc"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} should be rejected", uri);
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_list_page_past_end_is_empty() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    create(&app, "Only", "A", "B", "rock").await;

    let (status, body) = send(&app, "GET", "/songs?page=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalSongs"], 1);
    assert_eq!(body["data"]["totalPages"], 1);
    assert_eq!(body["data"]["currentPage"], 5);
    assert!(body["data"]["songs"].as_array().unwrap().is_empty());
}

// =============================================================================
// Statistics
// =============================================================================

#[tokio::test]
async fn test_stats_empty_catalog() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    let (status, body) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Statistics retrieved successfully");

    let data = &body["data"];
    assert_eq!(data["totals"], json!({"songs": 0, "artists": 0, "albums": 0, "genres": 0}));
    assert!(data["mostCommonGenre"].is_null());
    assert!(data["leastCommonGenre"].is_null());
    assert!(data["topArtist"].is_null());
    assert_eq!(data["genreDistribution"], json!({}));
}

#[tokio::test]
async fn test_stats_rock_jazz_scenario() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    create(&app, "S1", "Artist A", "Album 1", "Rock").await;
    create(&app, "S2", "Artist A", "Album 2", "rock").await;
    create(&app, "S3", "Artist B", "Album 3", "jazz").await;

    let (status, body) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["songsPerGenre"], json!({"rock": 2, "jazz": 1}));
    assert_eq!(data["mostCommonGenre"], "rock");
    assert_eq!(data["leastCommonGenre"], "jazz");
    assert_eq!(data["genreDistribution"], json!({"rock": "66.67%", "jazz": "33.33%"}));
    assert_eq!(data["topArtist"], json!({"name": "Artist A", "songs": 2}));
    assert_eq!(data["albumsPerArtist"], json!({"Artist A": 2, "Artist B": 1}));
    assert_eq!(data["totals"], json!({"songs": 3, "artists": 2, "albums": 3, "genres": 2}));
}

#[tokio::test]
async fn test_stats_genre_keys_in_count_order() {
    let app = setup_app(RuntimeEnvironment::Test).await;
    create(&app, "1", "A", "X", "ambient").await;
    create(&app, "2", "A", "X", "pop").await;
    create(&app, "3", "A", "X", "pop").await;

    let request = Request::builder().uri("/stats").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    // serde_json::Value would re-sort keys, so check the raw text
    let pop = text.find(r#""songsPerGenre":{"pop":2,"ambient":1}"#);
    assert!(pop.is_some(), "unexpected body: {}", text);
}

// =============================================================================
// Routing and error envelope
// =============================================================================

#[tokio::test]
async fn test_api_prefix_serves_same_routes() {
    let app = setup_app(RuntimeEnvironment::Test).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/songs",
        Some(json!({"title": "A", "artist": "B", "album": "C", "genre": "Rock"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/api/songs/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["genre"], "rock");

    let (status, body) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totals"]["songs"], 1);
}

#[tokio::test]
async fn test_unmatched_route_is_404_envelope() {
    let app = setup_app(RuntimeEnvironment::Production).await;

    let (status, body) = send(&app, "GET", "/nowhere/at/all", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "message": "Route not found: /nowhere/at/all"})
    );
}

#[tokio::test]
async fn test_unmatched_route_message_keeps_query() {
    let app = setup_app(RuntimeEnvironment::Production).await;

    let (status, body) = send(&app, "GET", "/songz?page=2&genre=rock", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found: /songz?page=2&genre=rock");
}

#[tokio::test]
async fn test_wrong_method_is_405_envelope() {
    let app = setup_app(RuntimeEnvironment::Production).await;

    let request = Request::builder()
        .method("PATCH")
        .uri("/songs")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = response
        .headers()
        .get("allow")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(allow.contains("GET") && allow.contains("POST"), "allow header: {}", allow);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).expect("405 body should be JSON");
    assert_eq!(
        body,
        json!({"success": false, "message": "Method PATCH not allowed: /songs"})
    );

    let (status, body) = send(&app, "POST", "/api/stats", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Method POST not allowed: /api/stats");
}

#[tokio::test]
async fn test_wrong_method_detail_outside_production() {
    let app = setup_app(RuntimeEnvironment::Development).await;

    let (status, body) = send(&app, "PATCH", "/songs/7f1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert!(body["detail"].as_str().unwrap().starts_with("Method PATCH not allowed"));
}

#[tokio::test]
async fn test_error_detail_only_outside_production() {
    let dev = setup_app(RuntimeEnvironment::Development).await;
    let (_, body) = send(&dev, "GET", "/songs/not-an-id", None).await;
    assert_eq!(body["message"], "Invalid ID format");
    assert_eq!(body["detail"], "Invalid input: Invalid ID format");

    let prod = setup_app(RuntimeEnvironment::Production).await;
    let (_, body) = send(&prod, "GET", "/songs/not-an-id", None).await;
    assert_eq!(body["message"], "Invalid ID format");
    assert!(body.get("detail").is_none());
}

#[tokio::test]
async fn test_storage_failure_is_generic_500() {
    let pool = init_memory_database().await.unwrap();
    sqlx::query("DROP TABLE songs").execute(&pool).await.unwrap();
    let app = build_router(AppState::new(pool, RuntimeEnvironment::Production));

    let (status, body) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "message": "Internal Server Error"}));
}
