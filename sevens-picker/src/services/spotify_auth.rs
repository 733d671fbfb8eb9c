//! Spotify client-credentials token exchange

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const USER_AGENT: &str = concat!("sevens-picker/", env!("CARGO_PKG_VERSION"));

/// Token exchange errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Token response carried no access token")]
    MissingToken,
}

/// Short-lived bearer token for catalog queries
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the secret out of logs
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// `Authorization` header value for the exchange: `Basic base64(id:secret)`
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
    let pair = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(pair))
}

/// Client for the accounts service token endpoint
pub struct SpotifyAuthClient {
    http_client: reqwest::Client,
    token_url: String,
}

impl SpotifyAuthClient {
    pub fn new(token_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            token_url: token_url.into(),
        })
    }

    /// Exchange a client id/secret pair for a bearer token
    pub async fn get_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken, AuthError> {
        tracing::debug!(url = %self.token_url, "Requesting Spotify access token");

        let response = self
            .http_client
            .post(&self.token_url)
            .header(AUTHORIZATION, basic_credentials(client_id, client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::ApiError(status.as_u16(), error_text));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ParseError(e.to_string()))?;

        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        tracing::info!(expires_in = ?body.expires_in, "Obtained Spotify access token");
        Ok(AccessToken::new(token))
    }
}
