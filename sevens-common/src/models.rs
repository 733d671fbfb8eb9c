//! Album data model
//!
//! Shapes shared by the picker service (which produces enriched albums) and the
//! client (which persists history entries derived from them). Field names follow
//! the wire formats: the rated-album corpus, the Spotify album object and the
//! camelCase history blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

use crate::time::parse_log_date;

/// Identity of an album: exact, case-sensitive (artist, title) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlbumIdentity {
    pub artist: String,
    pub title: String,
}

impl AlbumIdentity {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }

    /// True when the given artist/title pair names this album
    pub fn matches(&self, artist: &str, title: &str) -> bool {
        self.artist == artist && self.title == title
    }
}

impl fmt::Display for AlbumIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.artist)
    }
}

/// A reviewed album from the static corpus. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedAlbum {
    pub artist: String,
    pub title: String,
    /// Critic score, 0-10
    pub score: f64,
    /// Release date as published in the corpus
    pub date: String,
    pub genre: String,
    /// Full review transcript, when the corpus has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl RatedAlbum {
    pub fn identity(&self) -> AlbumIdentity {
        AlbumIdentity::new(&self.artist, &self.title)
    }
}

/// Spotify `external_urls` object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

/// Cover art variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Artist as returned by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Album record from the external catalog (Spotify album object)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogAlbum {
    /// Canonical catalog id
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub total_tracks: u32,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub release_date_precision: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    /// Cover art, largest first
    #[serde(default)]
    pub images: Vec<CatalogImage>,
    #[serde(default)]
    pub artists: Vec<CatalogArtist>,
}

/// Cover art size requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// Second-largest variant (300px on Spotify)
    Medium,
    /// Third-largest variant (64px on Spotify)
    Small,
}

impl ImageSize {
    fn index(self) -> usize {
        match self {
            ImageSize::Medium => 1,
            ImageSize::Small => 2,
        }
    }
}

/// A corpus album that was successfully matched in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedAlbum {
    #[serde(flatten)]
    pub album: RatedAlbum,
    #[serde(rename = "spotifyAlbum")]
    pub catalog: CatalogAlbum,
}

impl EnrichedAlbum {
    pub fn new(album: RatedAlbum, catalog: CatalogAlbum) -> Self {
        Self { album, catalog }
    }

    pub fn identity(&self) -> AlbumIdentity {
        self.album.identity()
    }

    /// "<title> by <artist>"
    pub fn display_name(&self) -> String {
        format!("{} by {}", self.album.title, self.album.artist)
    }

    pub fn external_url(&self) -> &str {
        &self.catalog.external_urls.spotify
    }

    /// Cover art of the requested size, falling back to the smallest variant
    /// the catalog returned
    pub fn image(&self, size: ImageSize) -> Option<&CatalogImage> {
        self.catalog
            .images
            .get(size.index())
            .or_else(|| self.catalog.images.last())
    }

    /// History record for this album, carrying display fields for offline rendering
    pub fn to_history_entry(&self, liked: bool, logged: bool) -> HistoryEntry {
        HistoryEntry {
            title: self.album.title.clone(),
            artist: self.album.artist.clone(),
            logged,
            log_date: None,
            liked,
            album_cover_url: self.image(ImageSize::Medium).map(|img| img.url.clone()),
            spotify_url: Some(self.external_url().to_string()).filter(|url| !url.is_empty()),
        }
    }
}

/// Per-album status record kept by the history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub logged: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_log_date"
    )]
    pub log_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub liked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_url: Option<String>,
}

/// Read `logDate` without letting a bad timestamp reject the whole entry
fn lenient_log_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(raw) => {
            let parsed = parse_log_date(&raw);
            if parsed.is_none() {
                warn!(log_date = %raw, "Unparsable log date, dropping it");
            }
            Ok(parsed)
        }
        other => {
            warn!(log_date = %other, "Log date is not a string, dropping it");
            Ok(None)
        }
    }
}

impl HistoryEntry {
    /// Bare entry with no status flags and no display fields
    pub fn from_identity(identity: &AlbumIdentity) -> Self {
        Self {
            title: identity.title.clone(),
            artist: identity.artist.clone(),
            logged: false,
            log_date: None,
            liked: false,
            album_cover_url: None,
            spotify_url: None,
        }
    }

    pub fn identity(&self) -> AlbumIdentity {
        AlbumIdentity::new(&self.artist, &self.title)
    }

    pub fn is(&self, identity: &AlbumIdentity) -> bool {
        identity.matches(&self.artist, &self.title)
    }
}
