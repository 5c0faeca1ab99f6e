//! Persistence of the detail-sharing preference, keyed by device.

mod local;
mod supabase;

use std::future::Future;

use thiserror::Error;

use crate::models::StoredPreference;

pub use local::LocalPreferenceStore;
pub use supabase::{normalize_rest_url, SupabasePreferenceStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid store configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Preference API error: {0}")]
    Api(String),
    #[error("Invalid stored preference: {0}")]
    InvalidPayload(String),
    #[error("Local storage error: {0}")]
    Local(#[from] crate::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-by-key / upsert-by-key preference service.
///
/// A missing record is `Ok(None)` from [`PreferenceStore::fetch`], never an
/// error.
pub trait PreferenceStore: Send + Sync + 'static {
    fn fetch(
        &self,
        user_key: &str,
    ) -> impl Future<Output = StoreResult<Option<StoredPreference>>> + Send;

    fn upsert(
        &self,
        user_key: &str,
        show_details: bool,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}
