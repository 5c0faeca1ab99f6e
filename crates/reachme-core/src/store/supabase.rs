//! Supabase (PostgREST) backed preference store.

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use super::{PreferenceStore, StoreError, StoreResult};
use crate::models::{StoredPreference, DEFAULT_SHOW_DETAILS};
use crate::util::compact_text;

const PREFERENCES_TABLE: &str = "user_preferences";
const SINGLE_OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";
/// PostgREST code for "single object requested, zero rows returned".
const NO_ROWS_CODE: &str = "PGRST116";

/// Client for the `user_preferences` table.
///
/// Rows are `(user_key text primary key, show_details boolean)`.
#[derive(Clone)]
pub struct SupabasePreferenceStore {
    rest_url: String,
    anon_key: String,
    client: Client,
}

impl std::fmt::Debug for SupabasePreferenceStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SupabasePreferenceStore")
            .field("rest_url", &self.rest_url)
            .field("anon_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SupabasePreferenceStore {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>) -> StoreResult<Self> {
        let rest_url = normalize_rest_url(url.as_ref())?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            rest_url,
            anon_key,
            client: Client::builder().build()?,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/{PREFERENCES_TABLE}", self.rest_url)
    }

    fn public_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }
}

impl PreferenceStore for SupabasePreferenceStore {
    async fn fetch(&self, user_key: &str) -> StoreResult<Option<StoredPreference>> {
        let filter = format!("eq.{user_key}");
        let request = self.public_request(
            self.client
                .get(self.table_url())
                .query(&[("select", "show_details"), ("user_key", filter.as_str())])
                .header(ACCEPT, SINGLE_OBJECT_MEDIA_TYPE),
        );

        let response = request.send().await?;
        if response.status().is_success() {
            let record = response.json::<PreferenceRecord>().await?;
            return Ok(Some(StoredPreference {
                show_details: record.show_details.unwrap_or(DEFAULT_SHOW_DETAILS),
            }));
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if is_no_rows_error(&body) {
            tracing::debug!("No stored preference for {}", user_key);
            return Ok(None);
        }
        Err(StoreError::Api(parse_api_error(status, &body)))
    }

    async fn upsert(&self, user_key: &str, show_details: bool) -> StoreResult<()> {
        let row = PreferenceRow {
            user_key,
            show_details,
        };
        let request = self.public_request(
            self.client
                .post(self.table_url())
                .query(&[("on_conflict", "user_key")])
                .header("Prefer", UPSERT_PREFER)
                .json(&row),
        );

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(parse_api_error(status, &body)));
        }
        Ok(())
    }
}

/// Normalize a Supabase project URL to its PostgREST base.
pub fn normalize_rest_url(url: &str) -> StoreResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(StoreError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }
    if trimmed.ends_with("/rest/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/rest/v1"))
    }
}

#[derive(Debug, Serialize)]
struct PreferenceRow<'a> {
    user_key: &'a str,
    show_details: bool,
}

/// `show_details` is nullable in the table; a null reads as the default.
#[derive(Debug, Deserialize)]
struct PreferenceRecord {
    #[serde(default)]
    show_details: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorResponse {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

fn is_no_rows_error(body: &str) -> bool {
    serde_json::from_str::<PostgrestErrorResponse>(body)
        .ok()
        .and_then(|payload| payload.code)
        .is_some_and(|code| code == NO_ROWS_CODE)
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorResponse>(body) {
        if let Some(message) = payload.message.or(payload.details).or(payload.hint) {
            return match payload.code {
                Some(code) => format!("{} [{code}] ({})", message.trim(), status.as_u16()),
                None => format!("{} ({})", message.trim(), status.as_u16()),
            };
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
