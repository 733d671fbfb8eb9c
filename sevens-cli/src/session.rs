//! Client session: local stores plus the picker connection
//!
//! Built once in `main` and passed by reference to every command.

use sevens_common::config::TomlConfig;
use sevens_common::storage::{open_legacy_store, open_primary_store};
use sevens_common::{HistoryStore, KeyValueStore, PreferenceStore, SpinCounter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::picker_client::PickerClient;

pub struct ClientSession {
    pub history: HistoryStore,
    pub preferences: PreferenceStore,
    pub spins: SpinCounter,
    pub picker: PickerClient,
    primary: Arc<dyn KeyValueStore>,
    legacy: Option<Arc<dyn KeyValueStore>>,
}

impl ClientSession {
    pub fn new(
        primary: Arc<dyn KeyValueStore>,
        legacy: Option<Arc<dyn KeyValueStore>>,
        picker: PickerClient,
    ) -> Self {
        let history = match &legacy {
            Some(legacy) => HistoryStore::with_legacy(primary.clone(), legacy.clone()),
            None => HistoryStore::new(primary.clone()),
        };

        Self {
            history,
            preferences: PreferenceStore::new(primary.clone()),
            spins: SpinCounter::new(primary.clone()),
            picker,
            primary,
            legacy,
        }
    }

    /// Open the configured on-disk stores under `data_folder`
    pub async fn open(
        config: &TomlConfig,
        data_folder: &Path,
        picker_url: &str,
    ) -> anyhow::Result<Self> {
        let primary = open_primary_store(&config.storage, data_folder).await?;
        let legacy = open_legacy_store(data_folder);
        let picker = PickerClient::new(
            picker_url,
            Duration::from_secs(config.picker.request_timeout_secs.max(1)),
        )?;

        info!(
            data_folder = %data_folder.display(),
            picker = %picker.base_url(),
            "Client session ready"
        );

        Ok(Self::new(primary, Some(legacy), picker))
    }

    pub fn primary(&self) -> &dyn KeyValueStore {
        self.primary.as_ref()
    }

    pub fn legacy(&self) -> Option<&dyn KeyValueStore> {
        self.legacy.as_deref()
    }
}
