//! Data models for REACH.MME

mod device_key;
mod preferences;

pub use device_key::DeviceKey;
pub use preferences::{Preferences, StoredPreference, DEFAULT_SHOW_DETAILS};
