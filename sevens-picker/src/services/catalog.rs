//! Album catalog seam used by the sampler

use async_trait::async_trait;
use sevens_common::CatalogAlbum;
use std::time::Duration;

use super::spotify_auth::{AccessToken, AuthError, SpotifyAuthClient};
use super::spotify_client::{LookupError, SpotifyClient};

/// External album catalog: one token per batch, one lookup per candidate
#[async_trait]
pub trait AlbumCatalog: Send + Sync {
    /// Acquire a bearer token for a batch of lookups
    async fn access_token(&self) -> Result<AccessToken, AuthError>;

    /// Best match for the album, `Ok(None)` when the catalog has nothing
    async fn lookup(
        &self,
        token: &AccessToken,
        title: &str,
        artist: &str,
    ) -> Result<Option<CatalogAlbum>, LookupError>;
}

/// Client credentials for the catalog
#[derive(Clone)]
pub struct CatalogCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for CatalogCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"..")
            .finish()
    }
}

/// Spotify-backed catalog
pub struct SpotifyCatalog {
    auth: SpotifyAuthClient,
    client: SpotifyClient,
    credentials: CatalogCredentials,
}

impl SpotifyCatalog {
    pub fn new(
        token_url: &str,
        api_base_url: &str,
        credentials: CatalogCredentials,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            auth: SpotifyAuthClient::new(token_url, timeout)?,
            client: SpotifyClient::new(api_base_url, timeout)?,
            credentials,
        })
    }
}

#[async_trait]
impl AlbumCatalog for SpotifyCatalog {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        self.auth
            .get_token(&self.credentials.client_id, &self.credentials.client_secret)
            .await
    }

    async fn lookup(
        &self,
        token: &AccessToken,
        title: &str,
        artist: &str,
    ) -> Result<Option<CatalogAlbum>, LookupError> {
        self.client.search_album(token, title, artist).await
    }
}
