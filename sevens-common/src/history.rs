//! Album history store
//!
//! Ordered collection of [`HistoryEntry`] records, one per album identity,
//! persisted as a single JSON array under [`HISTORY_KEY`]. Every operation
//! loads the whole array, changes it in memory and writes it back in full.
//!
//! # Uniqueness
//!
//! Every mutator looks the identity up before inserting, so the stored array
//! never holds two entries for the same (artist, title).
//!
//! # Legacy migration
//!
//! Older clients kept history in the cookie jar under [`LEGACY_HISTORY_KEY`]
//! (same shape, no cover URL or link). The first operation on a store instance
//! merges those entries into the primary array, existing identities winning,
//! then clears the legacy cookie. Later operations skip the step.
//!
//! # Concurrency
//!
//! Mutators on one store instance are serialized. Two processes writing the
//! same storage are last-write-wins.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::models::{AlbumIdentity, HistoryEntry};
use crate::storage::{KeyValueStore, HISTORY_KEY, LEGACY_HISTORY_KEY};
use crate::time::now;
use crate::Result;

/// Outcome of merging the legacy location into the primary store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Legacy entries appended to the primary store
    pub imported: usize,
    /// Legacy entries dropped because the identity already existed
    pub skipped: usize,
}

/// Persistent per-album logged/liked state
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    legacy: Option<Arc<dyn KeyValueStore>>,
    migration: OnceCell<()>,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Store with no legacy location to migrate from
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            legacy: None,
            migration: OnceCell::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store that migrates the legacy cookie jar on first access
    pub fn with_legacy(storage: Arc<dyn KeyValueStore>, legacy: Arc<dyn KeyValueStore>) -> Self {
        Self {
            legacy: Some(legacy),
            ..Self::new(storage)
        }
    }

    /// Run the legacy migration once for this store instance
    ///
    /// A failed migration is logged and not retried until the next process;
    /// the legacy data stays where it was.
    pub async fn ensure_migrated(&self) {
        self.migration
            .get_or_init(|| async {
                if let Err(e) = self.migrate_legacy().await {
                    warn!(error = %e, "Legacy history migration failed");
                }
            })
            .await;
    }

    /// Merge legacy entries into the primary store and clear the legacy key
    ///
    /// Idempotent: with an empty legacy location nothing is read or written.
    pub async fn migrate_legacy(&self) -> Result<MigrationReport> {
        let Some(legacy) = &self.legacy else {
            return Ok(MigrationReport::default());
        };

        let Some(raw) = legacy.get(LEGACY_HISTORY_KEY).await? else {
            return Ok(MigrationReport::default());
        };

        let _guard = self.write_lock.lock().await;

        let legacy_entries = parse_entries(&raw, LEGACY_HISTORY_KEY);
        let mut entries = self.load().await?;
        let mut report = MigrationReport::default();

        for entry in legacy_entries {
            let identity = entry.identity();
            if entries.iter().any(|e| e.is(&identity)) {
                report.skipped += 1;
            } else {
                entries.push(entry);
                report.imported += 1;
            }
        }

        if report.imported > 0 {
            self.save(&entries).await?;
        }
        legacy.delete(LEGACY_HISTORY_KEY).await?;

        info!(
            imported = report.imported,
            skipped = report.skipped,
            "Migrated legacy album history"
        );

        Ok(report)
    }

    /// All entries in insertion order
    pub async fn entries(&self) -> Result<Vec<HistoryEntry>> {
        self.ensure_migrated().await;
        self.load().await
    }

    pub async fn get(&self, identity: &AlbumIdentity) -> Result<Option<HistoryEntry>> {
        Ok(self.entries().await?.into_iter().find(|e| e.is(identity)))
    }

    /// Identities of logged albums, for the sampler's exclusion list
    pub async fn logged_identities(&self) -> Result<Vec<AlbumIdentity>> {
        Ok(self
            .entries()
            .await?
            .iter()
            .filter(|e| e.logged)
            .map(HistoryEntry::identity)
            .collect())
    }

    pub async fn liked_entries(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|e| e.liked)
            .collect())
    }

    /// Append the entry unless its identity is already present
    ///
    /// Returns whether the entry was inserted.
    pub async fn add(&self, entry: HistoryEntry) -> Result<bool> {
        self.ensure_migrated().await;
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;
        let identity = entry.identity();
        if entries.iter().any(|e| e.is(&identity)) {
            debug!(album = %identity, "Album already in history");
            return Ok(false);
        }

        entries.push(entry);
        self.save(&entries).await?;
        Ok(true)
    }

    /// Set the logged flag
    ///
    /// Logging stamps `log_date` with the current time; unlogging clears it.
    /// Unlogging an album with no entry does nothing. Logging one inserts
    /// `template` with `logged = true`.
    pub async fn update_log_status(&self, template: &HistoryEntry, logged: bool) -> Result<()> {
        self.ensure_migrated().await;
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;
        let identity = template.identity();
        let log_date = logged.then(now);

        match entries.iter_mut().find(|e| e.is(&identity)) {
            Some(existing) => {
                existing.logged = logged;
                existing.log_date = log_date;
            }
            None if logged => {
                let mut entry = template.clone();
                entry.logged = true;
                entry.log_date = log_date;
                entries.push(entry);
            }
            None => return Ok(()),
        }

        debug!(album = %identity, logged, "Updated log status");
        self.save(&entries).await
    }

    /// Set the liked flag, with the same upsert rules as [`Self::update_log_status`]
    pub async fn update_like_status(&self, template: &HistoryEntry, liked: bool) -> Result<()> {
        self.ensure_migrated().await;
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;
        let identity = template.identity();

        match entries.iter_mut().find(|e| e.is(&identity)) {
            Some(existing) => existing.liked = liked,
            None if liked => {
                let mut entry = template.clone();
                entry.liked = true;
                entries.push(entry);
            }
            None => return Ok(()),
        }

        debug!(album = %identity, liked, "Updated like status");
        self.save(&entries).await
    }

    /// Delete the entry; returns whether one was removed
    pub async fn remove(&self, identity: &AlbumIdentity) -> Result<bool> {
        self.ensure_migrated().await;
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;
        let Some(index) = entries.iter().position(|e| e.is(identity)) else {
            return Ok(false);
        };

        entries.remove(index);
        self.save(&entries).await?;
        Ok(true)
    }

    pub async fn is_logged(&self, identity: &AlbumIdentity) -> Result<bool> {
        Ok(self.get(identity).await?.map_or(false, |e| e.logged))
    }

    pub async fn is_liked(&self, identity: &AlbumIdentity) -> Result<bool> {
        Ok(self.get(identity).await?.map_or(false, |e| e.liked))
    }

    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        match self.storage.get(HISTORY_KEY).await? {
            Some(raw) => Ok(parse_entries(&raw, HISTORY_KEY)),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries)?;
        self.storage.set(HISTORY_KEY, &raw).await
    }
}

/// Decode a history blob
///
/// A blob that is not a JSON array reads as empty. Elements without a title
/// and artist, or with wrongly typed flags, are skipped individually, as are
/// repeated identities after the first. An unreadable `logDate` only loses the
/// date.
fn parse_entries(raw: &str, key: &str) -> Vec<HistoryEntry> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(key, error = %e, "History blob is corrupt, treating as empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<HistoryEntry>(value) {
            Ok(entry) => {
                if seen.insert(entry.identity()) {
                    entries.push(entry);
                } else {
                    warn!(
                        key,
                        index,
                        album = %entry.identity(),
                        "Dropping duplicate history entry"
                    );
                }
            }
            Err(e) => warn!(key, index, error = %e, "Skipping malformed history entry"),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries_not_an_array() {
        assert!(parse_entries("{\"title\":\"x\"}", HISTORY_KEY).is_empty());
        assert!(parse_entries("garbage", HISTORY_KEY).is_empty());
    }

    #[test]
    fn test_parse_entries_skips_bad_elements() {
        let raw = r#"[
            {"title":"Blonde","artist":"Frank Ocean","logged":true,"liked":false},
            {"title":"Bad Date","artist":"X","logged":true,"liked":false,"logDate":"not a date"},
            {"artist":"Missing Title"},
            {"title":"Bad Flag","artist":"X","logged":"yes"},
            {"title":"Blonde","artist":"Frank Ocean","logged":false,"liked":true}
        ]"#;
        let entries = parse_entries(raw, HISTORY_KEY);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Blonde");
        assert!(entries[0].logged);
        assert_eq!(entries[1].title, "Bad Date");
        assert!(entries[1].logged);
        assert!(entries[1].log_date.is_none());
    }
}
