use std::path::{Path, PathBuf};

use reachme_core::util::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::config::{default_config_path, CliConfig};
use crate::error::CliError;

const VISIBLE_KEY_CHARS: usize = 6;

pub fn run_config(command: ConfigCommands) -> Result<(), CliError> {
    let path = default_config_path();
    match command {
        ConfigCommands::Init {
            supabase_url,
            supabase_anon_key,
            card,
        } => run_config_init(&path, supabase_url, supabase_anon_key, card),
        ConfigCommands::Show => {
            let config = CliConfig::load_from_path(&path).map_err(CliError::Config)?;
            println!("{}", serde_json::to_string_pretty(&redacted(config))?);
            Ok(())
        }
    }
}

pub fn run_config_init(
    path: &Path,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    card: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = merge_config(
        CliConfig::load_from_path(path).map_err(CliError::Config)?,
        supabase_url,
        supabase_anon_key,
        card,
    )?;
    config.save_to_path(path).map_err(CliError::Config)?;
    let config = CliConfig::load_from_path(path).map_err(CliError::Config)?;
    println!("Config saved to {}", path.display());

    let missing = missing_fields(&config);
    if missing.is_empty() {
        println!("Preferences will be stored in Supabase.");
    } else {
        println!("Config is missing: {}", missing.join(", "));
    }
    Ok(())
}

pub fn merge_config(
    mut config: CliConfig,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    card: Option<PathBuf>,
) -> Result<CliConfig, CliError> {
    if let Some(url) = normalize_text_option(supabase_url) {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "supabase_url must include http:// or https://".to_string(),
            ));
        }
        config.supabase_url = Some(url);
    }
    if let Some(key) = normalize_text_option(supabase_anon_key) {
        config.supabase_anon_key = Some(key);
    }
    if let Some(card) = card.filter(|path| !path.as_os_str().is_empty()) {
        config.card_path = Some(card);
    }
    Ok(config)
}

pub fn missing_fields(config: &CliConfig) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if config.supabase_url.is_none() {
        missing.push("supabase_url");
    }
    if config.supabase_anon_key.is_none() {
        missing.push("supabase_anon_key");
    }
    if config.card_path.is_none() {
        missing.push("card_path");
    }
    missing
}

pub fn redacted(mut config: CliConfig) -> CliConfig {
    config.supabase_anon_key = config.supabase_anon_key.map(|key| {
        let visible = key.chars().take(VISIBLE_KEY_CHARS).collect::<String>();
        format!("{visible}***")
    });
    config
}
