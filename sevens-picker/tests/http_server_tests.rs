//! HTTP Server & Routing Integration Tests

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use helpers::{catalog_album, rated, ScriptedCatalog, StubSummarizer};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sevens_common::{EnrichedAlbum, RatedAlbum};
use sevens_picker::services::{AlbumSampler, AlbumSummarizer};
use sevens_picker::{build_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

fn corpus() -> Vec<RatedAlbum> {
    vec![
        rated("Radiohead", "Kid A", 10.0),
        rated("Slowdive", "Souvlaki", 8.0),
        rated("Weezer", "Raditude", 2.0),
    ]
}

fn test_app_state(
    catalog: Arc<ScriptedCatalog>,
    summarizer: Arc<dyn AlbumSummarizer>,
) -> AppState {
    AppState::new(corpus(), AlbumSampler::new(catalog), summarizer)
}

fn default_state() -> AppState {
    test_app_state(
        Arc::new(ScriptedCatalog::new()),
        Arc::new(StubSummarizer::returning("an overview")),
    )
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_router(default_state());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "sevens-picker");
    assert_eq!(json["corpus_size"], 3);
    assert!(json.get("last_error").is_none());
}

#[tokio::test]
async fn test_random_albums_with_string_threshold() {
    let app = build_router(default_state());

    let response = app
        .oneshot(post_json("/api/random-albums", json!({"minRating": "8"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let albums = json.as_array().unwrap();
    assert_eq!(albums.len(), 2);
    for album in albums {
        assert!(album["score"].as_f64().unwrap() >= 8.0);
        assert!(album["spotifyAlbum"]["id"].is_string());
    }
}

#[tokio::test]
async fn test_random_albums_excludes_logged() {
    let app = build_router(default_state());

    let response = app
        .oneshot(post_json(
            "/api/random-albums",
            json!({
                "minRating": 8,
                "loggedAlbums": [{"artist": "Radiohead", "title": "Kid A", "logged": true}]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let albums = json.as_array().unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0]["title"], "Souvlaki");
}

#[tokio::test]
async fn test_random_albums_out_of_range_threshold() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let app = build_router(test_app_state(
        catalog.clone(),
        Arc::new(StubSummarizer::returning("x")),
    ));

    let response = app
        .oneshot(post_json("/api/random-albums", json!({"minRating": 11})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert_eq!(catalog.token_calls(), 0);
}

#[tokio::test]
async fn test_random_albums_unparsable_threshold() {
    let app = build_router(default_state());

    let response = app
        .oneshot(post_json("/api/random-albums", json!({"minRating": "seven"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_random_albums_malformed_body_uses_error_envelope() {
    let bodies = [
        json!({"minRating": true}),
        json!({"minRating": [7]}),
        json!({"loggedAlbums": []}),
    ];

    for body in bodies {
        let app = build_router(default_state());
        let response = app
            .oneshot(post_json("/api/random-albums", body.clone()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.contains("Invalid request"), "message {}", message);
    }
}

#[tokio::test]
async fn test_random_albums_non_json_body_uses_error_envelope() {
    let app = build_router(default_state());
    let request = Request::builder()
        .method("POST")
        .uri("/api/random-albums")
        .header("content-type", "application/json")
        .body(Body::from("minRating=7"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_random_albums_pool_exhausted() {
    let app = build_router(default_state());

    let response = app
        .oneshot(post_json(
            "/api/random-albums",
            json!({
                "minRating": "10",
                "loggedAlbums": [{"artist": "Radiohead", "title": "Kid A"}]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "POOL_EXHAUSTED");
}

#[tokio::test]
async fn test_random_albums_auth_failure_is_bad_gateway() {
    let state = test_app_state(
        Arc::new(ScriptedCatalog::new().failing_auth()),
        Arc::new(StubSummarizer::returning("x")),
    );
    let app = build_router(state.clone());

    let response = app
        .oneshot(post_json("/api/random-albums", json!({"minRating": 5})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(state.last_error.read().await.is_some());
}

#[tokio::test]
async fn test_random_albums_all_lookups_fail_is_empty_ok() {
    let catalog = ScriptedCatalog::new()
        .with_miss("Kid A")
        .with_error("Souvlaki");
    let app = build_router(test_app_state(
        Arc::new(catalog),
        Arc::new(StubSummarizer::returning("x")),
    ));

    let response = app
        .oneshot(post_json("/api/random-albums", json!({"minRating": 8})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_album_overview_success() {
    let summarizer = Arc::new(StubSummarizer::returning("a glacial masterpiece."));
    let catalog = Arc::new(ScriptedCatalog::new());
    let app = build_router(test_app_state(catalog, summarizer.clone()));
    let kid_a = rated("Radiohead", "Kid A", 10.0);
    let album = EnrichedAlbum::new(kid_a, catalog_album("Kid A"));

    let body = serde_json::to_value(&album).unwrap();
    let response = app
        .oneshot(post_json("/api/album-overview", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!("a glacial masterpiece."));
    assert_eq!(summarizer.calls(), 1);
}

#[tokio::test]
async fn test_album_overview_failure_contract() {
    let state = test_app_state(
        Arc::new(ScriptedCatalog::new()),
        Arc::new(StubSummarizer::failing()),
    );
    let app = build_router(state.clone());
    let kid_a = rated("Radiohead", "Kid A", 10.0);
    let album = EnrichedAlbum::new(kid_a, catalog_album("Kid A"));

    let body = serde_json::to_value(&album).unwrap();
    let response = app
        .oneshot(post_json("/api/album-overview", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Failed to fetch album overview."})
    );
    assert!(state.last_error.read().await.is_some());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = build_router(default_state());

    let request = Request::builder()
        .uri("/nope")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
