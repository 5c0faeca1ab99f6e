//! Preference store configuration.
//!
//! Supabase values are public (URL + anon key) and safe to ship with a client
//! build. When neither is present the clients fall back to local storage.

use serde::{Deserialize, Serialize};

use crate::store::{StoreError, StoreResult};
use crate::util::{is_http_url, normalize_text_option};

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
}

/// Validated Supabase connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

impl StoreConfig {
    /// Read `SUPABASE_URL` / `SUPABASE_ANON_KEY` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            supabase_url: lookup(ENV_SUPABASE_URL),
            supabase_anon_key: lookup(ENV_SUPABASE_ANON_KEY),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Fill unset values from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            supabase_url: normalize_text_option(self.supabase_url)
                .or_else(|| normalize_text_option(fallback.supabase_url)),
            supabase_anon_key: normalize_text_option(self.supabase_anon_key)
                .or_else(|| normalize_text_option(fallback.supabase_anon_key)),
        }
    }

    /// Returns `Ok(None)` when Supabase is not configured at all.
    ///
    /// A half-configured pair is an error rather than a silent fallback.
    pub fn resolve(&self) -> StoreResult<Option<SupabaseSettings>> {
        let url = normalize_text_option(self.supabase_url.clone());
        let anon_key = normalize_text_option(self.supabase_anon_key.clone());

        match (url, anon_key) {
            (None, None) => Ok(None),
            (Some(url), Some(anon_key)) => {
                if !is_http_url(&url) {
                    return Err(StoreError::InvalidConfiguration(
                        "Supabase URL must include http:// or https://",
                    ));
                }
                Ok(Some(SupabaseSettings { url, anon_key }))
            }
            _ => Err(StoreError::InvalidConfiguration(
                "SUPABASE_URL and SUPABASE_ANON_KEY must be set together",
            )),
        }
    }
}
