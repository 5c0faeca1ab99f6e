//! REACH.MME CLI - vehicle contact card from the command line
//!
//! Shows the owner's card, and lets the owner reveal or hide their contact
//! details with the PIN.

mod cli;
mod commands;
mod config;
mod context;
mod error;

use std::path::Path;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::{
    run_config, run_contact, run_device_key, run_emergency, run_show, run_status, run_toggle,
};
use crate::config::{resolve_storage_path, CliConfig};
use crate::context::{open_controller, CliController};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["reachme=info", "reachme_core=info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage_path = resolve_storage_path(cli.storage);

    match cli.command {
        Commands::Show { card, json } => {
            let (config, controller) = open_session(&storage_path)?;
            run_show(&controller, &config, card, json).await?;
        }
        Commands::Status { json } => {
            let (_, controller) = open_session(&storage_path)?;
            run_status(&controller, json).await?;
        }
        Commands::Toggle {
            visibility,
            pin,
            no_wait,
        } => {
            let (_, controller) = open_session(&storage_path)?;
            run_toggle(&controller, visibility, pin, no_wait).await?;
        }
        Commands::Contact {
            index,
            via,
            card,
            yes,
        } => {
            let (config, controller) = open_session(&storage_path)?;
            run_contact(&controller, &config, index, via, card, yes).await?;
        }
        Commands::Emergency => run_emergency(),
        Commands::DeviceKey { reset } => run_device_key(&storage_path, reset)?,
        Commands::Config { command } => run_config(command)?,
    }

    Ok(())
}

fn open_session(storage_path: &Path) -> Result<(CliConfig, CliController), CliError> {
    let config = CliConfig::load().map_err(CliError::Config)?;
    let controller = open_controller(storage_path, &config.store_config())?;
    Ok((config, controller))
}
