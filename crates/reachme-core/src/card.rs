//! Contact card shown to whoever finds the vehicle.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const MAPS_SEARCH_BASE: &str = "https://www.google.com/maps/search/";
const WHATSAPP_BASE: &str = "https://wa.me/";
const VISIBLE_DIGITS: usize = 4;

/// Shown before any call or message is started.
pub const CONTACT_WARNING: &str = "Please avoid unnecessary calls or messages.\nMisuse, spam, or harassment may lead to legal action.";

/// Shown when a PIN check fails.
pub const INVALID_PIN_MESSAGE: &str = "Invalid PIN. Please try again.";

/// Longest PIN the entry prompt accepts.
pub const PIN_MAX_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmergencyContact {
    pub name: &'static str,
    pub number: &'static str,
}

/// Emergency numbers (India), always visible.
pub const EMERGENCY_CONTACTS: [EmergencyContact; 3] = [
    EmergencyContact {
        name: "Police",
        number: "100",
    },
    EmergencyContact {
        name: "Ambulance",
        number: "102",
    },
    EmergencyContact {
        name: "Fire",
        number: "101",
    },
];

impl EmergencyContact {
    pub fn call_link(&self) -> String {
        format!("tel:{}", self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCard {
    pub vehicle: Vehicle,
    /// Note shown under the vehicle, one entry per line.
    #[serde(default)]
    pub message: Vec<String>,
    #[serde(default)]
    pub contacts: Vec<ContactNumber>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub support_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub registration: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactNumber {
    /// e.g. "Primary Number"
    pub label: String,
    /// Country calling code including `+`, e.g. "+91"
    pub country_code: String,
    /// Subscriber number without the country code
    pub national_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactChannel {
    Call,
    WhatsApp,
}

impl ContactCard {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let card: Self = serde_json::from_str(&raw)?;
        card.validate()?;
        Ok(card)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vehicle.registration.trim().is_empty() {
            return Err(Error::InvalidInput(
                "vehicle registration must not be empty".to_string(),
            ));
        }
        for contact in &self.contacts {
            contact.validate()?;
        }
        Ok(())
    }

    /// Contact by zero-based position.
    pub fn contact(&self, index: usize) -> Option<&ContactNumber> {
        self.contacts.get(index)
    }

    pub fn support_link(&self) -> Option<String> {
        self.support_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(|email| format!("mailto:{email}"))
    }
}

impl ContactNumber {
    fn validate(&self) -> Result<()> {
        let code = self.country_code.strip_prefix('+').unwrap_or_default();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidInput(format!(
                "country code '{}' must look like +91",
                self.country_code
            )));
        }
        if self.national_number.is_empty()
            || !self.national_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(Error::InvalidInput(format!(
                "number for '{}' must contain only digits",
                self.label
            )));
        }
        Ok(())
    }

    /// Full international form, e.g. `+918951225584`.
    pub fn e164(&self) -> String {
        format!("{}{}", self.country_code, self.national_number)
    }

    /// Display form with all but the last four digits hidden: `+91 ******5584`.
    pub fn masked(&self) -> String {
        let digits: Vec<char> = self.national_number.chars().collect();
        let hidden = digits.len().saturating_sub(VISIBLE_DIGITS);
        let tail: String = digits[hidden..].iter().collect();
        format!("{} {}{tail}", self.country_code, "*".repeat(hidden))
    }

    pub fn call_link(&self) -> String {
        format!("tel:{}", self.e164())
    }

    pub fn whatsapp_link(&self) -> String {
        format!("{WHATSAPP_BASE}{}", self.e164().trim_start_matches('+'))
    }

    pub fn link(&self, channel: ContactChannel) -> String {
        match channel {
            ContactChannel::Call => self.call_link(),
            ContactChannel::WhatsApp => self.whatsapp_link(),
        }
    }
}

impl Location {
    /// Google Maps search URL for the address.
    pub fn map_link(&self) -> String {
        let query = self
            .address
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|word| !word.is_empty())
            .map(|word| urlencoding::encode(word).into_owned())
            .collect::<Vec<_>>()
            .join("+");
        format!("{MAPS_SEARCH_BASE}{query}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn primary() -> ContactNumber {
        ContactNumber {
            label: "Primary Number".to_string(),
            country_code: "+91".to_string(),
            national_number: "8951225584".to_string(),
        }
    }

    fn sample_card() -> ContactCard {
        ContactCard {
            vehicle: Vehicle {
                registration: "KA 05 MQ 1326".to_string(),
                model: "Ertiga Maruti Suzuki".to_string(),
            },
            message: vec!["Sorry for any inconvenience caused.".to_string()],
            contacts: vec![primary()],
            location: Some(Location {
                address: "Amar Layout, Bangalore, Karnataka, 560045, India".to_string(),
            }),
            support_email: Some("hello@example.com".to_string()),
        }
    }

    #[test]
    fn masked_number_keeps_last_four_digits() {
        assert_eq!(primary().masked(), "+91 ******5584");
    }

    #[test]
    fn short_number_is_not_masked() {
        let contact = ContactNumber {
            national_number: "123".to_string(),
            ..primary()
        };
        assert_eq!(contact.masked(), "+91 123");
    }

    #[test]
    fn contact_links() {
        let contact = primary();
        assert_eq!(contact.call_link(), "tel:+918951225584");
        assert_eq!(contact.whatsapp_link(), "https://wa.me/918951225584");
        assert_eq!(contact.link(ContactChannel::Call), contact.call_link());
    }

    #[test]
    fn map_link_joins_address_words() {
        let location = sample_card().location.unwrap();
        assert_eq!(
            location.map_link(),
            "https://www.google.com/maps/search/Amar+Layout+Bangalore+Karnataka+560045+India"
        );
    }

    #[test]
    fn support_link_uses_mailto() {
        assert_eq!(
            sample_card().support_link().as_deref(),
            Some("mailto:hello@example.com")
        );
    }

    #[test]
    fn validate_rejects_non_digit_numbers() {
        let mut card = sample_card();
        card.contacts[0].national_number = "89512-25584".to_string();
        assert!(matches!(card.validate(), Err(Error::InvalidInput(_))));

        let mut card = sample_card();
        card.contacts[0].country_code = "91".to_string();
        assert!(matches!(card.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn card_loads_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");
        std::fs::write(&path, serde_json::to_string(&sample_card()).unwrap()).unwrap();

        let loaded = ContactCard::load_from_path(&path).unwrap();
        assert_eq!(loaded, sample_card());
    }

    #[test]
    fn emergency_contacts_are_dialable() {
        let links: Vec<String> = EMERGENCY_CONTACTS
            .iter()
            .map(EmergencyContact::call_link)
            .collect();
        assert_eq!(links, vec!["tel:100", "tel:102", "tel:101"]);
    }
}
