//! Offline preference store kept in local storage.

use super::{PreferenceStore, StoreError, StoreResult};
use crate::models::StoredPreference;
use crate::storage::LocalStorage;

const KEY_PREFIX: &str = "reachme_preferences:";

/// Keeps preferences on this machine only.
///
/// Used when no remote store is configured.
#[derive(Debug)]
pub struct LocalPreferenceStore<L> {
    storage: L,
}

impl<L: LocalStorage> LocalPreferenceStore<L> {
    pub const fn new(storage: L) -> Self {
        Self { storage }
    }
}

fn storage_key(user_key: &str) -> String {
    format!("{KEY_PREFIX}{user_key}")
}

impl<L: LocalStorage> PreferenceStore for LocalPreferenceStore<L> {
    async fn fetch(&self, user_key: &str) -> StoreResult<Option<StoredPreference>> {
        let Some(raw) = self.storage.get_item(&storage_key(user_key))? else {
            return Ok(None);
        };

        let show_details = match raw.trim() {
            "true" => true,
            "false" => false,
            other => {
                return Err(StoreError::InvalidPayload(format!(
                    "expected true/false for {user_key}, found '{other}'"
                )))
            }
        };
        Ok(Some(StoredPreference { show_details }))
    }

    async fn upsert(&self, user_key: &str, show_details: bool) -> StoreResult<()> {
        let value = if show_details { "true" } else { "false" };
        self.storage.set_item(&storage_key(user_key), value)?;
        Ok(())
    }
}
