//! Album overview endpoint
//!
//! Provides POST /api/album-overview

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use sevens_common::EnrichedAlbum;
use tracing::{info, warn};

use crate::AppState;

/// Body of every failed overview response
pub const OVERVIEW_FAILURE: &str = "Failed to fetch album overview.";

/// POST /api/album-overview handler
///
/// **Request:** an enriched album as returned by `/api/random-albums`
/// **Response:** the overview as a JSON string
///
/// Any summarizer failure answers 500 with `{"error": "Failed to fetch album overview."}`;
/// clients show the album without an overview.
pub async fn album_overview(
    State(state): State<AppState>,
    Json(album): Json<EnrichedAlbum>,
) -> Response {
    match state.summarizer.summarize(&album).await {
        Ok(overview) => {
            info!(
                artist = %album.album.artist,
                title = %album.album.title,
                "Served album overview"
            );
            Json(overview).into_response()
        }
        Err(e) => {
            warn!(
                artist = %album.album.artist,
                title = %album.album.title,
                error = %e,
                "Album overview failed"
            );
            state.record_error(e.to_string()).await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": OVERVIEW_FAILURE })),
            )
                .into_response()
        }
    }
}

/// Build overview routes
pub fn overview_routes() -> Router<AppState> {
    Router::new().route("/api/album-overview", post(album_overview))
}
