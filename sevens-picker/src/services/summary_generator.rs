//! Album overview generation through an OpenAI-compatible chat completions API
//!
//! One request per album, no retries. Any failure is reported as a
//! [`SummaryError`] and the caller shows the album without prose.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sevens_common::EnrichedAlbum;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You write two-paragraph previews of music albums for listeners who \
have not heard them yet. The first line of the user message gives the album's title, artist, \
release date and genre; the rest is the transcript of a full review. Open with a short hook or \
anecdote under 250 characters, then expand on the album, its listening notes and the reviewer's \
opinion. If the transcript is missing, write the first paragraph only. Reply with the preview \
alone, in lowercase except for acronyms and the names of artists, albums and songs, which keep \
their original capitalization.";

/// Overview failures; every variant means "summary unavailable"
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Summary unavailable: network error: {0}")]
    NetworkError(String),

    #[error("Summary unavailable: API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Summary unavailable: parse error: {0}")]
    ParseError(String),

    #[error("Summary unavailable: completion carried no text")]
    EmptyCompletion,

    #[error("Summary unavailable: no API key configured")]
    MissingApiKey,
}

/// Produces prose for one enriched album
#[async_trait]
pub trait AlbumSummarizer: Send + Sync {
    async fn summarize(&self, album: &EnrichedAlbum) -> Result<String, SummaryError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// User message: metadata line, blank line, then the transcript
pub fn user_message(album: &EnrichedAlbum) -> String {
    let a = &album.album;
    format!(
        "TITLE: {}, ARTIST: {}, RELEASE_DATE: {}, GENRE: {}.\n\n TRANSCRIPT: {}",
        a.title,
        a.artist,
        a.date,
        a.genre,
        a.transcript.as_deref().unwrap_or("")
    )
}

/// Chat-completions backed summarizer
pub struct SummaryGenerator {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl SummaryGenerator {
    /// `api_key = None` keeps the service running with overviews disabled
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SummaryError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SummaryError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl AlbumSummarizer for SummaryGenerator {
    async fn summarize(&self, album: &EnrichedAlbum) -> Result<String, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or(SummaryError::MissingApiKey)?;

        let url = format!("{}/chat/completions", self.base_url);
        let content = user_message(album);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &content,
                },
            ],
        };

        debug!(
            model = %self.model,
            artist = %album.album.artist,
            title = %album.album.title,
            has_transcript = album.album.transcript.is_some(),
            "Requesting album overview"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummaryError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SummaryError::ApiError(status.as_u16(), error_text));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::ParseError(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(SummaryError::EmptyCompletion)
    }
}
