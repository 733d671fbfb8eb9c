//! Spotify album search
//!
//! One best-effort search per album: `q=album:<title> artist:<artist>`,
//! `type=album`, `limit=1`. Only the first item of the paged envelope is used.

use serde::Deserialize;
use sevens_common::CatalogAlbum;
use std::time::Duration;
use thiserror::Error;

use super::spotify_auth::AccessToken;

pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const USER_AGENT: &str = concat!("sevens-picker/", env!("CARGO_PKG_VERSION"));

/// Search errors; a search with zero results is not an error
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Search response envelope
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub albums: AlbumPage,
}

/// Paged album results
#[derive(Debug, Deserialize)]
pub struct AlbumPage {
    #[serde(default)]
    pub items: Vec<CatalogAlbum>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub next: Option<String>,
}

/// Search query for one album
pub fn album_query(title: &str, artist: &str) -> String {
    format!("album:{} artist:{}", title, artist)
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    api_base_url: String,
}

impl SpotifyClient {
    pub fn new(api_base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Top search hit for the album, `None` when the search is empty
    pub async fn search_album(
        &self,
        token: &AccessToken,
        title: &str,
        artist: &str,
    ) -> Result<Option<CatalogAlbum>, LookupError> {
        let url = format!("{}/search", self.api_base_url);
        let query = album_query(title, artist);

        tracing::debug!(title = %title, artist = %artist, "Querying Spotify search");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token.as_str())
            .query(&[("q", query.as_str()), ("type", "album"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 429 {
            return Err(LookupError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError(status.as_u16(), error_text));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| LookupError::ParseError(e.to_string()))?;

        let top = search.albums.items.into_iter().next();
        if let Some(album) = &top {
            tracing::debug!(
                spotify_id = %album.id,
                name = %album.name,
                "Spotify search hit"
            );
        }

        Ok(top)
    }
}
