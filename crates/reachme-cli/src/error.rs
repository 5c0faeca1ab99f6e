use std::io;

use thiserror::Error;

use reachme_core::card::INVALID_PIN_MESSAGE;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] reachme_core::Error),
    #[error(transparent)]
    Store(#[from] reachme_core::store::StoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("{}", INVALID_PIN_MESSAGE)]
    InvalidPin,
    #[error("No PIN provided")]
    EmptyPin,
    #[error("Contact details are hidden. Turn them on with `reachme toggle on`.")]
    DetailsHidden,
    #[error("No contact #{0} on this card")]
    ContactNotFound(usize),
    #[error(
        "No contact card configured. Pass --card, set REACHME_CARD, or run `reachme config init --card <PATH>`."
    )]
    CardNotConfigured,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
