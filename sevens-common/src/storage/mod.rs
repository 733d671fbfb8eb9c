//! Key-value storage capability
//!
//! The history, preference and spin-count stores never touch files or databases
//! directly. They depend on [`KeyValueStore`], which has four backends:
//!
//! - [`MemoryStore`]: in-memory map, used by tests
//! - [`JsonFileStore`]: single JSON object file, the primary "local storage"
//! - [`CookieJarStore`]: cookie-style text file, the legacy location
//! - [`SqliteStore`]: `key_value` table (feature `sqlx`)

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::Result;

pub mod cookie_jar;
pub mod json_file;
pub mod memory;
#[cfg(feature = "sqlx")]
pub mod sqlite;

pub use cookie_jar::CookieJarStore;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteStore;

/// Key holding the history blob in the primary store
pub const HISTORY_KEY: &str = "albumHistory";
/// Key holding the history blob in the legacy cookie jar
pub const LEGACY_HISTORY_KEY: &str = "loggedAlbums";
/// Key holding the minimum rating preference
pub const MIN_RATING_KEY: &str = "minRating";
/// Key holding the lifetime spin counter
pub const LIFETIME_SPINS_KEY: &str = "lifetimeSpins";

/// File name of the primary JSON store inside the data folder
pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";
/// File name of the legacy cookie jar inside the data folder
pub const COOKIE_JAR_FILE: &str = "cookies.txt";
/// File name of the SQLite store inside the data folder
pub const SQLITE_FILE: &str = "sevens.db";

/// String key-value storage
///
/// Values are opaque strings; callers choose their own encoding (JSON for the
/// history blob and the rating, plain decimal for the spin counter).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// All keys currently present
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Open the primary store selected by configuration
pub async fn open_primary_store(
    config: &StorageConfig,
    data_folder: &Path,
) -> Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StorageBackend::Json => {
            let path = data_folder.join(LOCAL_STORAGE_FILE);
            tracing::debug!(path = %path.display(), "Using JSON file storage");
            Ok(Arc::new(JsonFileStore::new(path)))
        }
        #[cfg(feature = "sqlx")]
        StorageBackend::Sqlite => {
            let path = data_folder.join(SQLITE_FILE);
            tracing::debug!(path = %path.display(), "Using SQLite storage");
            Ok(Arc::new(SqliteStore::open(&path).await?))
        }
        #[cfg(not(feature = "sqlx"))]
        StorageBackend::Sqlite => Err(crate::Error::Config(
            "storage.backend = \"sqlite\" requires the sqlx feature".to_string(),
        )),
    }
}

/// Open the legacy cookie jar
pub fn open_legacy_store(data_folder: &Path) -> Arc<dyn KeyValueStore> {
    Arc::new(CookieJarStore::new(data_folder.join(COOKIE_JAR_FILE)))
}
