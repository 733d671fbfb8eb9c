//! Minimum rating preference

use std::sync::Arc;
use tracing::debug;

use crate::storage::{KeyValueStore, MIN_RATING_KEY};
use crate::Result;

/// Lowest accepted rating
pub const MIN_RATING_FLOOR: i64 = 0;
/// Highest accepted rating
pub const MIN_RATING_CEILING: i64 = 10;

/// Persists the minimum rating threshold across sessions
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Stored threshold, or `None` when unset or not an integer in [0, 10]
    pub async fn get_min_rating(&self) -> Result<Option<u8>> {
        let Some(raw) = self.storage.get(MIN_RATING_KEY).await? else {
            return Ok(None);
        };

        let parsed = serde_json::from_str::<i64>(raw.trim())
            .ok()
            .filter(|v| (MIN_RATING_FLOOR..=MIN_RATING_CEILING).contains(v))
            .and_then(|v| u8::try_from(v).ok());

        if parsed.is_none() {
            debug!(raw = %raw, "Ignoring invalid stored minimum rating");
        }
        Ok(parsed)
    }

    /// Persist the threshold as-is; range checks belong to the caller
    pub async fn set_min_rating(&self, min_rating: i64) -> Result<()> {
        let raw = serde_json::to_string(&min_rating)?;
        self.storage.set(MIN_RATING_KEY, &raw).await
    }
}

/// True when `value` is a threshold the sampler accepts
pub fn is_valid_min_rating(value: i64) -> bool {
    (MIN_RATING_FLOOR..=MIN_RATING_CEILING).contains(&value)
}
