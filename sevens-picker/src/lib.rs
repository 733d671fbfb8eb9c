//! sevens-picker library interface
//!
//! Exposes the router, state and services for the binary and for integration testing

pub mod api;
pub mod config;
pub mod corpus;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sevens_common::RatedAlbum;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::services::{AlbumSampler, AlbumSummarizer};

/// Process-wide state, built once in `main` and shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Rated corpus, read-only after startup
    pub corpus: Arc<Vec<RatedAlbum>>,
    pub sampler: Arc<AlbumSampler>,
    pub summarizer: Arc<dyn AlbumSummarizer>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        corpus: Vec<RatedAlbum>,
        sampler: AlbumSampler,
        summarizer: Arc<dyn AlbumSummarizer>,
    ) -> Self {
        Self {
            corpus: Arc::new(corpus),
            sampler: Arc::new(sampler),
            summarizer,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember the most recent failure for `/health`
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::album_routes())
        .merge(api::overview_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
