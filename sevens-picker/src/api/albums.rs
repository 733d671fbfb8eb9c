//! Random album endpoint
//!
//! Provides POST /api/random-albums

use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use sevens_common::{AlbumIdentity, EnrichedAlbum};
use tracing::{info, warn};

use crate::services::SampleError;

/// Threshold as sent by clients: either a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MinRating {
    Number(f64),
    Text(String),
}

impl MinRating {
    /// Numeric threshold; range checking is left to the sampler
    pub fn value(&self) -> ApiResult<f64> {
        match self {
            MinRating::Number(n) => Ok(*n),
            MinRating::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                ApiError::BadRequest(format!("minRating must be a number. Provided: {:?}", s))
            }),
        }
    }
}

/// Request payload for a random album batch
///
/// **Request:** `{"minRating": "7", "loggedAlbums": [{"artist": "...", "title": "..."}]}`
///
/// `loggedAlbums` entries may carry extra history fields; only the identity is read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomAlbumsRequest {
    pub min_rating: MinRating,
    #[serde(default)]
    pub logged_albums: Option<Vec<AlbumIdentity>>,
}

/// POST /api/random-albums handler
///
/// **Response:** JSON array of enriched albums, possibly shorter than the batch
/// size and possibly empty.
///
/// **Errors:**
/// - 400 Bad Request: body not JSON, minRating missing, unparsable or outside [0, 10]
/// - 404 Not Found (`POOL_EXHAUSTED`): no eligible album left
/// - 502 Bad Gateway: catalog token exchange failed
pub async fn random_albums(
    State(state): State<AppState>,
    payload: Result<Json<RandomAlbumsRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<EnrichedAlbum>>> {
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let min_rating = payload.min_rating.value()?;
    let excluded = payload.logged_albums.unwrap_or_default();

    let result = if excluded.is_empty() {
        state.sampler.sample(&state.corpus, min_rating).await
    } else {
        state
            .sampler
            .sample_excluding(&state.corpus, min_rating, &excluded)
            .await
    };

    match result {
        Ok(batch) => {
            info!(min_rating, returned = batch.len(), "Served random albums");
            Ok(Json(batch))
        }
        Err(e) => {
            if let SampleError::AuthFailure(_) = &e {
                state.record_error(e.to_string()).await;
            }
            warn!(min_rating, error = %e, "Random album request failed");
            Err(e.into())
        }
    }
}

/// Build album routes
pub fn album_routes() -> Router<AppState> {
    Router::new().route("/api/random-albums", post(random_albums))
}
