//! Detail-sharing preference model

use serde::{Deserialize, Serialize};

use super::DeviceKey;

/// Visibility used when no stored preference exists or loading fails.
pub const DEFAULT_SHOW_DETAILS: bool = true;

/// Preferences for one device.
///
/// `user_key` never changes once obtained; `show_details` is the only
/// mutable flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Whether the owner's contact details are visible
    pub show_details: bool,
    /// Device key the preference is stored under
    pub user_key: DeviceKey,
}

impl Preferences {
    pub const fn new(user_key: DeviceKey, show_details: bool) -> Self {
        Self {
            show_details,
            user_key,
        }
    }
}

/// Row shape of the remote `user_preferences` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPreference {
    pub show_details: bool,
}
