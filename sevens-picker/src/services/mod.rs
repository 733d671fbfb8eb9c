//! External services and the sampling core
//!
//! - `spotify_auth` / `spotify_client`: catalog token exchange and album search
//! - `catalog`: the [`AlbumCatalog`] seam the sampler talks to
//! - `album_sampler`: random batch selection with enrichment
//! - `summary_generator`: chat-completions album overviews

pub mod album_sampler;
pub mod catalog;
pub mod spotify_auth;
pub mod spotify_client;
pub mod summary_generator;

pub use album_sampler::{AlbumSampler, SampleError, BATCH_SIZE};
pub use catalog::{AlbumCatalog, CatalogCredentials, SpotifyCatalog};
pub use spotify_auth::{AccessToken, AuthError, SpotifyAuthClient};
pub use spotify_client::{LookupError, SpotifyClient};
pub use summary_generator::{AlbumSummarizer, SummaryError, SummaryGenerator};
