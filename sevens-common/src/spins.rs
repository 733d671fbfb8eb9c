//! Lifetime spin counter

use std::sync::Arc;

use crate::storage::{KeyValueStore, LIFETIME_SPINS_KEY};
use crate::Result;

/// Counts successful picks over the lifetime of the local storage
pub struct SpinCounter {
    storage: Arc<dyn KeyValueStore>,
}

impl SpinCounter {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Current count; absent or unparsable values read as 0
    pub async fn get(&self) -> Result<u64> {
        Ok(self
            .storage
            .get(LIFETIME_SPINS_KEY)
            .await?
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0))
    }

    /// Add one spin and return the new count
    pub async fn increment(&self) -> Result<u64> {
        let spins = self.get().await?.saturating_add(1);
        self.storage
            .set(LIFETIME_SPINS_KEY, &spins.to_string())
            .await?;
        Ok(spins)
    }
}
