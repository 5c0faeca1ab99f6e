//! Wiring of storage, device identity, and preference store for commands.

use std::path::Path;
use std::sync::Arc;

use reachme_core::config::StoreConfig;
use reachme_core::device::{StoredDeviceIdentity, DEVICE_KEY_STORAGE};
use reachme_core::models::StoredPreference;
use reachme_core::storage::{JsonFileStorage, LocalStorage};
use reachme_core::store::{
    LocalPreferenceStore, PreferenceStore, StoreResult, SupabasePreferenceStore,
};
use reachme_core::PreferenceController;

use crate::error::CliError;

pub type CliIdentity = StoredDeviceIdentity<Arc<JsonFileStorage>>;
pub type CliController = PreferenceController<CliIdentity, CliPreferenceStore>;

/// Supabase when configured, otherwise the local storage file.
pub enum CliPreferenceStore {
    Supabase(SupabasePreferenceStore),
    Local(LocalPreferenceStore<Arc<JsonFileStorage>>),
}

impl CliPreferenceStore {
    pub fn open(config: &StoreConfig, storage: Arc<JsonFileStorage>) -> Result<Self, CliError> {
        match config.resolve()? {
            Some(settings) => Ok(Self::Supabase(SupabasePreferenceStore::new(
                settings.url,
                settings.anon_key,
            )?)),
            None => {
                tracing::warn!(
                    "Supabase is not configured; preferences are kept in {}",
                    storage.path().display()
                );
                Ok(Self::Local(LocalPreferenceStore::new(storage)))
            }
        }
    }

    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Supabase(_) => "supabase",
            Self::Local(_) => "local",
        }
    }
}

impl PreferenceStore for CliPreferenceStore {
    async fn fetch(&self, user_key: &str) -> StoreResult<Option<StoredPreference>> {
        match self {
            Self::Supabase(store) => store.fetch(user_key).await,
            Self::Local(store) => store.fetch(user_key).await,
        }
    }

    async fn upsert(&self, user_key: &str, show_details: bool) -> StoreResult<()> {
        match self {
            Self::Supabase(store) => store.upsert(user_key, show_details).await,
            Self::Local(store) => store.upsert(user_key, show_details).await,
        }
    }
}

/// Device identity backed by the storage file. `reset` forgets the stored
/// key so a new one is generated.
pub fn open_identity(storage_path: &Path, reset: bool) -> Result<CliIdentity, CliError> {
    let storage = Arc::new(JsonFileStorage::new(storage_path));
    if reset {
        storage.remove_item(DEVICE_KEY_STORAGE)?;
        tracing::info!("Cleared stored device key in {}", storage.path().display());
    }
    Ok(StoredDeviceIdentity::new(storage))
}

pub fn open_controller(
    storage_path: &Path,
    store_config: &StoreConfig,
) -> Result<CliController, CliError> {
    let storage = Arc::new(JsonFileStorage::new(storage_path));
    let store = CliPreferenceStore::open(store_config, Arc::clone(&storage))?;
    Ok(PreferenceController::new(
        StoredDeviceIdentity::new(storage),
        store,
    ))
}
