use std::io::{self, IsTerminal, Write};

use reachme_core::card::PIN_MAX_LENGTH;
use reachme_core::controller::AUTO_LOGOUT_SECONDS;

use crate::cli::Visibility;
use crate::commands::common::read_line;
use crate::context::CliController;
use crate::error::CliError;

pub async fn run_toggle(
    controller: &CliController,
    visibility: Visibility,
    pin: Option<String>,
    no_wait: bool,
) -> Result<(), CliError> {
    let pin = match pin {
        Some(pin) => pin,
        None => read_line("Owner PIN: ")?,
    };
    check_pin(controller, &pin)?;

    controller.initialize().await;
    controller
        .request_preference_change(visibility.show_details())
        .await?;

    let state = controller.state();
    if let Some(error) = &state.error {
        tracing::warn!("{}", error);
    }

    if !visibility.show_details() {
        println!("Contact details hidden.");
        return Ok(());
    }

    if no_wait {
        println!("Contact details visible. Auto-logout is not tracked after exit.");
        return Ok(());
    }

    println!("Contact details visible. Auto-logout in {AUTO_LOGOUT_SECONDS}s, Ctrl+C to stop waiting.");
    wait_for_auto_logout(controller).await
}

pub fn check_pin(controller: &CliController, pin: &str) -> Result<(), CliError> {
    if pin.is_empty() {
        return Err(CliError::EmptyPin);
    }
    if pin.chars().count() > PIN_MAX_LENGTH || !controller.verify_pin(pin) {
        return Err(CliError::InvalidPin);
    }
    Ok(())
}

async fn wait_for_auto_logout(controller: &CliController) -> Result<(), CliError> {
    let mut updates = controller.subscribe();
    let interactive = io::stdout().is_terminal();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let (active, countdown) = {
            let state = updates.borrow_and_update();
            (state.auto_logout_active, state.auto_logout_countdown)
        };
        if !active {
            break;
        }
        if interactive {
            print!("\rAuto-logout in {countdown:>2}s ");
            io::stdout().flush()?;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            signal = &mut ctrl_c => {
                signal?;
                controller.cancel_auto_logout();
                if interactive {
                    println!();
                }
                println!("Stopped waiting; auto-logout cancelled, contact details stay visible.");
                return Ok(());
            }
        }
    }

    if interactive {
        println!();
    }
    if controller.state().show_details() {
        println!("Auto-logout cancelled.");
        return Ok(());
    }

    // Expiry only hides details in memory; save it so later runs stay hidden.
    controller.request_preference_change(false).await?;
    match controller.state().error {
        Some(error) => {
            tracing::warn!("{}", error);
            println!("Auto-logout: contact details hidden here, but saving failed.");
        }
        None => println!("Auto-logout: contact details hidden."),
    }
    Ok(())
}
