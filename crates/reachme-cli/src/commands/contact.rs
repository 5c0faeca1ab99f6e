use std::path::PathBuf;

use reachme_core::card::CONTACT_WARNING;

use crate::cli::Channel;
use crate::commands::common::{is_affirmative, load_card, read_line};
use crate::config::CliConfig;
use crate::context::CliController;
use crate::error::CliError;

pub async fn run_contact(
    controller: &CliController,
    config: &CliConfig,
    index: usize,
    channel: Channel,
    card_path: Option<PathBuf>,
    assume_yes: bool,
) -> Result<(), CliError> {
    let card = load_card(config, card_path)?;
    controller.initialize().await;
    if !controller.state().show_details() {
        return Err(CliError::DetailsHidden);
    }

    let contact = index
        .checked_sub(1)
        .and_then(|position| card.contact(position))
        .ok_or(CliError::ContactNotFound(index))?;

    println!("{CONTACT_WARNING}");
    if !assume_yes {
        let answer = read_line("Continue? [y/N] ")?;
        if !is_affirmative(&answer) {
            println!("Cancelled.");
            return Ok(());
        }
    }

    println!("{}", contact.link(channel.into()));
    Ok(())
}
