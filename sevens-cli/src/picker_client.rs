//! HTTP client for the sevens-picker service

use serde::{Deserialize, Serialize};
use sevens_common::{AlbumIdentity, EnrichedAlbum};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("sevens-cli/", env!("CARGO_PKG_VERSION"));

/// Picker client errors
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Nothing left to pick at this threshold
    #[error("Nothing left to pick")]
    PoolExhausted,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    /// Overview could not be produced; the album itself is unaffected
    #[error("Overview unavailable: {0}")]
    OverviewUnavailable(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RandomAlbumsRequest<'a> {
    min_rating: String,
    #[serde(skip_serializing_if = "no_exclusions")]
    logged_albums: &'a [AlbumIdentity],
}

fn no_exclusions(excluded: &&[AlbumIdentity]) -> bool {
    excluded.is_empty()
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// sevens-picker API client
pub struct PickerClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl PickerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PickerError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PickerError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /api/random-albums
    pub async fn random_albums(
        &self,
        min_rating: u8,
        excluded: &[AlbumIdentity],
    ) -> Result<Vec<EnrichedAlbum>, PickerError> {
        let url = format!("{}/api/random-albums", self.base_url);
        let request = RandomAlbumsRequest {
            min_rating: min_rating.to_string(),
            logged_albums: excluded,
        };

        debug!(
            min_rating,
            excluded = excluded.len(),
            "Requesting random albums"
        );

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PickerError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&error_text) {
                if envelope.error.code == "POOL_EXHAUSTED" {
                    return Err(PickerError::PoolExhausted);
                }
                return Err(PickerError::ApiError(status.as_u16(), envelope.error.message));
            }
            return Err(PickerError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| PickerError::ParseError(e.to_string()))
    }

    /// POST /api/album-overview
    ///
    /// Every failure maps to [`PickerError::OverviewUnavailable`].
    pub async fn album_overview(&self, album: &EnrichedAlbum) -> Result<String, PickerError> {
        let url = format!("{}/api/album-overview", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(album)
            .send()
            .await
            .map_err(|e| PickerError::OverviewUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PickerError::OverviewUnavailable(format!("status {}", status.as_u16())));
        }

        response
            .json()
            .await
            .map_err(|e| PickerError::OverviewUnavailable(e.to_string()))
    }
}
