//! Export, import and reset of all locally stored user data

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::storage::KeyValueStore;
use crate::{Error, Result};

/// Snapshot of both storage locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    /// Legacy cookie jar contents
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    /// Primary store contents
    #[serde(default, rename = "localStorage")]
    pub local_storage: BTreeMap<String, String>,
}

impl UserData {
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.local_storage.is_empty()
    }

    /// Pretty-printed JSON file
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub async fn read_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| {
            Error::InvalidInput(format!("{} is not a valid backup: {}", path.display(), e))
        })
    }
}

async fn dump(store: &dyn KeyValueStore) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for key in store.keys().await? {
        if let Some(value) = store.get(&key).await? {
            map.insert(key, value);
        }
    }
    Ok(map)
}

/// Collect every key from both locations
pub async fn export_user_data(
    primary: &dyn KeyValueStore,
    legacy: Option<&dyn KeyValueStore>,
) -> Result<UserData> {
    let cookies = match legacy {
        Some(store) => dump(store).await?,
        None => BTreeMap::new(),
    };
    let local_storage = dump(primary).await?;

    info!(
        cookies = cookies.len(),
        local_storage = local_storage.len(),
        "Exported user data"
    );
    Ok(UserData {
        cookies,
        local_storage,
    })
}

/// Write every key of the snapshot back, overwriting existing values
///
/// Cookies in the snapshot are skipped when there is no legacy store.
pub async fn import_user_data(
    data: &UserData,
    primary: &dyn KeyValueStore,
    legacy: Option<&dyn KeyValueStore>,
) -> Result<()> {
    if let Some(store) = legacy {
        for (key, value) in &data.cookies {
            store.set(key, value).await?;
        }
    }
    for (key, value) in &data.local_storage {
        primary.set(key, value).await?;
    }

    info!(
        cookies = data.cookies.len(),
        local_storage = data.local_storage.len(),
        "Imported user data"
    );
    Ok(())
}

/// Delete every key from both locations
pub async fn reset_user_data(
    primary: &dyn KeyValueStore,
    legacy: Option<&dyn KeyValueStore>,
) -> Result<()> {
    for key in primary.keys().await? {
        primary.delete(&key).await?;
    }
    if let Some(store) = legacy {
        for key in store.keys().await? {
            store.delete(&key).await?;
        }
    }
    info!("Cleared all local user data");
    Ok(())
}
