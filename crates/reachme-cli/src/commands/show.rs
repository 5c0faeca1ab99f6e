use std::path::PathBuf;

use crate::commands::common::{load_card, render_card_lines, CardView};
use crate::config::CliConfig;
use crate::context::CliController;
use crate::error::CliError;

pub async fn run_show(
    controller: &CliController,
    config: &CliConfig,
    card_path: Option<PathBuf>,
    as_json: bool,
) -> Result<(), CliError> {
    let card = load_card(config, card_path)?;
    controller.initialize().await;
    let details_visible = controller.state().show_details();

    if as_json {
        let view = CardView::new(&card, details_visible);
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        for line in render_card_lines(&card, details_visible) {
            println!("{line}");
        }
    }

    Ok(())
}
