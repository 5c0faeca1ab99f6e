use crate::commands::common::StatusView;
use crate::context::CliController;
use crate::error::CliError;

pub async fn run_status(controller: &CliController, as_json: bool) -> Result<(), CliError> {
    controller.initialize().await;
    let state = controller.state();
    let view = StatusView::new(&state, controller.store().backend_name());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if let Some(device_key) = view.device_key {
        println!("Device:  {device_key}");
    }
    println!("Store:   {}", view.backend);
    println!(
        "Details: {}",
        if view.show_details { "visible" } else { "hidden" }
    );
    if let Some(error) = view.error {
        println!("Warning: {error}");
    }

    Ok(())
}
