//! Stable per-device identity.

use std::sync::OnceLock;

use crate::models::DeviceKey;
use crate::storage::LocalStorage;
use crate::util::normalize_text_option;

/// Local storage key holding the device key.
pub const DEVICE_KEY_STORAGE: &str = "reachme_device_key";

/// Source of the key that identifies this installation.
///
/// Implementations must return the same key on every call once one exists.
pub trait DeviceIdentity: Send + Sync + 'static {
    fn device_key(&self) -> DeviceKey;
}

/// Device identity persisted in a [`LocalStorage`].
///
/// The key is created on first use and written back. Storage failures are
/// logged and never surface; the key is cached so later calls in this process
/// agree even when the write did not stick.
#[derive(Debug)]
pub struct StoredDeviceIdentity<L> {
    storage: L,
    cached: OnceLock<DeviceKey>,
}

impl<L: LocalStorage> StoredDeviceIdentity<L> {
    pub const fn new(storage: L) -> Self {
        Self {
            storage,
            cached: OnceLock::new(),
        }
    }

    fn load_or_create(&self) -> DeviceKey {
        match self.storage.get_item(DEVICE_KEY_STORAGE) {
            Ok(stored) => {
                if let Some(key) = normalize_text_option(stored) {
                    return DeviceKey::from(key);
                }
            }
            Err(error) => {
                tracing::warn!("Failed to read stored device key: {}", error);
            }
        }

        let key = DeviceKey::generate();
        if let Err(error) = self.storage.set_item(DEVICE_KEY_STORAGE, key.as_str()) {
            tracing::warn!("Failed to persist device key: {}", error);
        } else {
            tracing::debug!("Created device key {}", key);
        }
        key
    }
}

impl<L: LocalStorage> DeviceIdentity for StoredDeviceIdentity<L> {
    fn device_key(&self) -> DeviceKey {
        self.cached.get_or_init(|| self.load_or_create()).clone()
    }
}
