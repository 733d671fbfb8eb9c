//! Random album sampler
//!
//! Draws a batch of albums from the rated corpus:
//!
//! 1. Reject thresholds outside [0, 10] before any I/O
//! 2. Pool = corpus albums scoring at least the threshold, minus excluded
//!    identities (first occurrence wins if the corpus repeats an identity)
//! 3. Empty pool → [`SampleError::PoolExhausted`]
//! 4. One catalog token for the whole batch
//! 5. Until the batch is full or the pool is empty: pick a remaining candidate
//!    uniformly at random, remove it, look it up once. A hit is enriched and
//!    kept; a miss or a failed lookup is logged and the candidate dropped.
//!
//! Lookups run one after another. A short batch is a normal result.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sevens_common::{AlbumIdentity, EnrichedAlbum, RatedAlbum};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::catalog::AlbumCatalog;
use super::spotify_auth::AuthError;

/// Target batch size
pub const BATCH_SIZE: usize = 10;
pub const MIN_RATING_FLOOR: f64 = 0.0;
pub const MIN_RATING_CEILING: f64 = 10.0;

/// Sampler failures; per-album lookup failures never surface here
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No albums left to pick")]
    PoolExhausted,

    #[error("Catalog authentication failed: {0}")]
    AuthFailure(#[from] AuthError),
}

/// Reject NaN and thresholds outside [0, 10]
pub fn validate_min_rating(min_rating: f64) -> Result<(), SampleError> {
    if min_rating.is_finite() && (MIN_RATING_FLOOR..=MIN_RATING_CEILING).contains(&min_rating) {
        Ok(())
    } else {
        Err(SampleError::InvalidArgument(format!(
            "The minRating must be between {} and {}. Provided: {}",
            MIN_RATING_FLOOR, MIN_RATING_CEILING, min_rating
        )))
    }
}

/// Eligible candidates for one sample call
pub fn candidate_pool<'a>(
    corpus: &'a [RatedAlbum],
    min_rating: f64,
    excluded: &[AlbumIdentity],
) -> Vec<&'a RatedAlbum> {
    let excluded: HashSet<(&str, &str)> = excluded
        .iter()
        .map(|id| (id.artist.as_str(), id.title.as_str()))
        .collect();
    let mut seen = HashSet::new();

    corpus
        .iter()
        .filter(|album| album.score >= min_rating)
        .filter(|album| !excluded.contains(&(album.artist.as_str(), album.title.as_str())))
        .filter(|album| seen.insert((album.artist.as_str(), album.title.as_str())))
        .collect()
}

/// Samples and enriches album batches
pub struct AlbumSampler {
    catalog: Arc<dyn AlbumCatalog>,
    batch_size: usize,
}

impl AlbumSampler {
    pub fn new(catalog: Arc<dyn AlbumCatalog>) -> Self {
        Self {
            catalog,
            batch_size: BATCH_SIZE,
        }
    }

    /// Override the target batch size (at least 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Sample by rating threshold only
    pub async fn sample(
        &self,
        corpus: &[RatedAlbum],
        min_rating: f64,
    ) -> Result<Vec<EnrichedAlbum>, SampleError> {
        self.sample_excluding(corpus, min_rating, &[]).await
    }

    /// Sample by rating threshold, skipping the given identities
    pub async fn sample_excluding(
        &self,
        corpus: &[RatedAlbum],
        min_rating: f64,
        excluded: &[AlbumIdentity],
    ) -> Result<Vec<EnrichedAlbum>, SampleError> {
        let mut rng = StdRng::from_entropy();
        self.sample_with_rng(corpus, min_rating, excluded, &mut rng)
            .await
    }

    /// Sampling with a caller-supplied random source
    pub async fn sample_with_rng<R: Rng + Send>(
        &self,
        corpus: &[RatedAlbum],
        min_rating: f64,
        excluded: &[AlbumIdentity],
        rng: &mut R,
    ) -> Result<Vec<EnrichedAlbum>, SampleError> {
        validate_min_rating(min_rating)?;

        let mut pool = candidate_pool(corpus, min_rating, excluded);
        if pool.is_empty() {
            info!(
                min_rating,
                excluded = excluded.len(),
                "No eligible albums left"
            );
            return Err(SampleError::PoolExhausted);
        }

        info!(
            min_rating,
            pool_size = pool.len(),
            excluded = excluded.len(),
            "Sampling albums"
        );

        let token = self.catalog.access_token().await.map_err(|e| {
            error!(error = %e, "Catalog token exchange failed, aborting sample");
            SampleError::AuthFailure(e)
        })?;

        let mut batch = Vec::with_capacity(self.batch_size.min(pool.len()));

        while batch.len() < self.batch_size && !pool.is_empty() {
            let index = rng.gen_range(0..pool.len());
            let candidate = pool.swap_remove(index);

            match self
                .catalog
                .lookup(&token, &candidate.title, &candidate.artist)
                .await
            {
                Ok(Some(record)) => {
                    debug!(
                        artist = %candidate.artist,
                        title = %candidate.title,
                        catalog_id = %record.id,
                        "Enriched album"
                    );
                    batch.push(EnrichedAlbum::new(candidate.clone(), record));
                }
                Ok(None) => {
                    warn!(
                        artist = %candidate.artist,
                        title = %candidate.title,
                        "Could not retrieve album info: no catalog match"
                    );
                }
                Err(e) => {
                    warn!(
                        artist = %candidate.artist,
                        title = %candidate.title,
                        error = %e,
                        "Could not retrieve album info: lookup failed"
                    );
                }
            }
        }

        info!(
            returned = batch.len(),
            remaining = pool.len(),
            "Sample complete"
        );

        Ok(batch)
    }
}
