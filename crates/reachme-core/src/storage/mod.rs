//! Local key-value storage used for device-scoped values.
//!
//! Mirrors the browser `localStorage` contract: string keys, string values,
//! and a missing key reads as `None`.

mod file;
mod memory;

use std::sync::Arc;

use crate::Result;

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;

/// String key-value storage that survives across sessions.
pub trait LocalStorage: Send + Sync + 'static {
    /// Read a value, `None` when the key was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

impl<T: LocalStorage + ?Sized> LocalStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}
