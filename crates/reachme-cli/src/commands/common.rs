use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use reachme_core::card::{ContactCard, ContactNumber, EmergencyContact, EMERGENCY_CONTACTS};
use reachme_core::PreferenceState;
use serde::Serialize;

use crate::config::CliConfig;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct CardView<'a> {
    pub registration: &'a str,
    pub model: &'a str,
    pub message: &'a [String],
    pub details_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<ContactView<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<String>,
    pub emergency: &'static [EmergencyContact],
}

#[derive(Debug, Serialize)]
pub struct ContactView<'a> {
    pub label: &'a str,
    pub display: String,
    pub call: String,
    pub whatsapp: String,
}

#[derive(Debug, Serialize)]
pub struct LocationView<'a> {
    pub address: &'a str,
    pub map: String,
}

impl<'a> CardView<'a> {
    pub fn new(card: &'a ContactCard, details_visible: bool) -> Self {
        let contacts = details_visible.then(|| card.contacts.iter().map(ContactView::from).collect());
        let location = card
            .location
            .as_ref()
            .filter(|_| details_visible)
            .map(|location| LocationView {
                address: &location.address,
                map: location.map_link(),
            });

        Self {
            registration: &card.vehicle.registration,
            model: &card.vehicle.model,
            message: &card.message,
            details_visible,
            contacts,
            location,
            support: card.support_link(),
            emergency: &EMERGENCY_CONTACTS,
        }
    }
}

impl<'a> From<&'a ContactNumber> for ContactView<'a> {
    fn from(contact: &'a ContactNumber) -> Self {
        Self {
            label: &contact.label,
            display: contact.masked(),
            call: contact.call_link(),
            whatsapp: contact.whatsapp_link(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusView<'a> {
    pub device_key: Option<&'a str>,
    pub show_details: bool,
    pub loading: bool,
    pub auto_logout_active: bool,
    pub auto_logout_countdown: u32,
    pub error: Option<&'a str>,
    pub backend: &'a str,
}

impl<'a> StatusView<'a> {
    pub fn new(state: &'a PreferenceState, backend: &'a str) -> Self {
        Self {
            device_key: state
                .preferences
                .as_ref()
                .map(|preferences| preferences.user_key.as_str()),
            show_details: state.show_details(),
            loading: state.loading,
            auto_logout_active: state.auto_logout_active,
            auto_logout_countdown: state.auto_logout_countdown,
            error: state.error.as_deref(),
            backend,
        }
    }
}

pub fn render_card_lines(card: &ContactCard, details_visible: bool) -> Vec<String> {
    let mut lines = vec![
        card.vehicle.registration.clone(),
        card.vehicle.model.clone(),
    ];
    if !card.message.is_empty() {
        lines.push(String::new());
        lines.extend(card.message.iter().cloned());
    }

    lines.push(String::new());
    if details_visible {
        for (position, contact) in card.contacts.iter().enumerate() {
            lines.push(format!("[{}] {}: {}", position + 1, contact.label, contact.masked()));
        }
        if let Some(location) = &card.location {
            lines.push(format!("Location: {}", location.address));
            lines.push(format!("  {}", location.map_link()));
        }
    } else {
        lines.push("Owner contact details are hidden.".to_string());
    }

    lines.push(String::new());
    lines.extend(render_emergency_lines());

    if let Some(link) = card.support_link() {
        lines.push(String::new());
        lines.push(format!("Want your own sticker? {link}"));
    }
    lines
}

pub fn render_emergency_lines() -> Vec<String> {
    let mut lines = vec!["Emergency Contacts (India)".to_string()];
    lines.extend(
        EMERGENCY_CONTACTS
            .iter()
            .map(|contact| format!("  {:<10} {}", contact.name, contact.number)),
    );
    lines
}

pub fn load_card(config: &CliConfig, explicit: Option<PathBuf>) -> Result<ContactCard, CliError> {
    let path = config
        .resolve_card_path(explicit)
        .ok_or(CliError::CardNotConfigured)?;
    Ok(ContactCard::load_from_path(&path)?)
}

/// Strip the line ending from one line of input, nothing else.
pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(&['\r', '\n'][..])
}

/// Read one line, printing `prompt` first when stdin is a terminal.
pub fn read_line(prompt: &str) -> Result<String, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        print!("{prompt}");
        io::stdout().flush()?;
    }

    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(strip_line_ending(&line).to_string())
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
