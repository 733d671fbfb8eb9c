//! Catalog and summarizer doubles

use async_trait::async_trait;
use sevens_common::models::{CatalogImage, ExternalUrls};
use sevens_common::{CatalogAlbum, EnrichedAlbum, RatedAlbum};
use sevens_picker::services::{
    AccessToken, AlbumCatalog, AlbumSummarizer, AuthError, LookupError, SummaryError,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn rated(artist: &str, title: &str, score: f64) -> RatedAlbum {
    RatedAlbum {
        artist: artist.to_string(),
        title: title.to_string(),
        score,
        date: "2001-01-01".to_string(),
        genre: "Indie Rock".to_string(),
        transcript: Some(format!("review of {}", title)),
    }
}

pub fn catalog_album(title: &str) -> CatalogAlbum {
    let id = format!("id-{}", title.to_lowercase().replace(' ', "-"));
    CatalogAlbum {
        id: id.clone(),
        name: title.to_string(),
        album_type: "album".to_string(),
        total_tracks: 10,
        release_date: "2001".to_string(),
        release_date_precision: "year".to_string(),
        uri: format!("spotify:album:{}", id),
        href: format!("https://api.spotify.com/v1/albums/{}", id),
        external_urls: ExternalUrls {
            spotify: format!("https://open.spotify.com/album/{}", id),
        },
        images: [640, 300, 64]
            .iter()
            .map(|size| CatalogImage {
                url: format!("https://i.scdn.co/image/{}-{}", id, size),
                width: Some(*size),
                height: Some(*size),
            })
            .collect(),
        artists: Vec::new(),
    }
}

/// Catalog double: every title matches unless scripted otherwise; counts calls
#[derive(Default)]
pub struct ScriptedCatalog {
    fail_auth: bool,
    misses: HashSet<String>,
    errors: HashSet<String>,
    token_calls: AtomicUsize,
    lookups: Mutex<Vec<(String, String)>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_auth(mut self) -> Self {
        self.fail_auth = true;
        self
    }

    /// Search for this title returns zero results
    pub fn with_miss(mut self, title: &str) -> Self {
        self.misses.insert(title.to_string());
        self
    }

    /// Search for this title fails at the transport level
    pub fn with_error(mut self, title: &str) -> Self {
        self.errors.insert(title.to_string());
        self
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    /// (artist, title) of every lookup, in call order
    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlbumCatalog for ScriptedCatalog {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth {
            Err(AuthError::ApiError(400, "invalid_client".to_string()))
        } else {
            Ok(AccessToken::new("test-token"))
        }
    }

    async fn lookup(
        &self,
        token: &AccessToken,
        title: &str,
        artist: &str,
    ) -> Result<Option<CatalogAlbum>, LookupError> {
        assert_eq!(token.as_str(), "test-token");
        self.lookups
            .lock()
            .unwrap()
            .push((artist.to_string(), title.to_string()));

        if self.errors.contains(title) {
            return Err(LookupError::NetworkError("connection reset".to_string()));
        }
        if self.misses.contains(title) {
            return Ok(None);
        }
        Ok(Some(catalog_album(title)))
    }
}

/// Summarizer double returning a fixed overview, or failing
pub struct StubSummarizer {
    overview: Option<String>,
    calls: AtomicUsize,
}

impl StubSummarizer {
    pub fn returning(overview: &str) -> Self {
        Self {
            overview: Some(overview.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            overview: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlbumSummarizer for StubSummarizer {
    async fn summarize(&self, _album: &EnrichedAlbum) -> Result<String, SummaryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.overview
            .clone()
            .ok_or_else(|| SummaryError::ApiError(500, "upstream down".to_string()))
    }
}
