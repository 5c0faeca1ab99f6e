//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use reachme_core::config::StoreConfig;
use reachme_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "reachme";
const CONFIG_FILE_NAME: &str = "cli-config.json";
const STORAGE_FILE_NAME: &str = "local-storage.json";
const ENV_CARD_PATH: &str = "REACHME_CARD";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    #[serde(default)]
    pub card_path: Option<PathBuf>,
}

const fn default_config_version() -> u32 {
    1
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    app_dir(dirs::config_dir()).join(CONFIG_FILE_NAME)
}

pub fn default_storage_path() -> PathBuf {
    app_dir(dirs::data_local_dir()).join(STORAGE_FILE_NAME)
}

pub fn resolve_storage_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(default_storage_path)
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self {
                version: default_config_version(),
                ..Self::default()
            });
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Store settings with `SUPABASE_URL` / `SUPABASE_ANON_KEY` taking
    /// precedence over the file.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::from_env().or(self.file_store_config())
    }

    pub fn file_store_config(&self) -> StoreConfig {
        StoreConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
        }
    }

    /// Card path from the flag, then `REACHME_CARD`, then the config file.
    pub fn resolve_card_path(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit
            .or_else(|| {
                normalize_text_option(std::env::var(ENV_CARD_PATH).ok()).map(PathBuf::from)
            })
            .or_else(|| self.card_path.clone())
    }

    fn normalize(&mut self) {
        self.supabase_url = normalize_text_option(self.supabase_url.clone())
            .map(|url| url.trim_end_matches('/').to_string());
        self.supabase_anon_key = normalize_text_option(self.supabase_anon_key.clone());
        self.card_path = self
            .card_path
            .take()
            .filter(|path| !path.as_os_str().is_empty());
    }
}
