//! # sevens common library
//!
//! Shared code for the picker service and the client:
//! - Album data model (rated, enriched, history entries)
//! - Key-value storage capability and its backends
//! - History and preference stores, spin counter, backup
//! - Configuration loading and logging setup

pub mod backup;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod preference;
pub mod spins;
pub mod storage;
pub mod time;

pub use error::{Error, Result};
pub use history::{HistoryStore, MigrationReport};
pub use models::{AlbumIdentity, CatalogAlbum, EnrichedAlbum, HistoryEntry, ImageSize, RatedAlbum};
pub use preference::PreferenceStore;
pub use spins::SpinCounter;
pub use storage::KeyValueStore;
