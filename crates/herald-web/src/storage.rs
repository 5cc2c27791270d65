//! `localStorage`-backed key-value store.

use gloo_storage::{LocalStorage, Storage};

use herald_client::ports::KeyValueStore;
use herald_client::StorageError;

/// The browser's `localStorage`. Values are stored JSON-encoded, the same
/// way the role login flows store their credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::get::<String>(key).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::set(key, value).map_err(|e| StorageError(e.to_string()))
    }

    fn delete(&self, key: &str) {
        LocalStorage::delete(key);
    }
}
