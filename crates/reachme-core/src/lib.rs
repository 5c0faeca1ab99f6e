//! reachme-core - Core library for REACH.MME
//!
//! This crate contains the preference controller that gates the owner's
//! contact details behind a PIN, together with the device identity, storage
//! backends, and contact card model used by the REACH.MME clients.

pub mod card;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;
pub mod util;

pub use controller::{PreferenceController, PreferenceState};
pub use error::{Error, Result};
pub use models::{DeviceKey, Preferences};
