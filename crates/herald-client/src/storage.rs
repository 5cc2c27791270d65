//! In-memory store and the typed device-registration cache on top of any
//! [`KeyValueStore`].

use std::cell::RefCell;
use std::collections::HashMap;

use herald_common::Platform;

use crate::acquire::DeviceRegistration;
use crate::error::StorageError;
use crate::ports::KeyValueStore;

/// `HashMap`-backed store. Used outside the browser and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

// ── Registration cache ──────────────────────────────────────────────

/// Read the cached registration for `platform`. An unreadable entry is
/// discarded so the next registration starts clean.
pub fn load_registration(store: &dyn KeyValueStore, platform: Platform) -> Option<DeviceRegistration> {
    let key = platform.registration_key();
    let raw = store.get(&key)?;
    match serde_json::from_str::<DeviceRegistration>(&raw) {
        Ok(reg) if reg.platform == platform && !reg.token.is_empty() => Some(reg),
        Ok(_) => {
            log::warn!("discarding cached push registration with mismatched platform or empty token");
            store.delete(&key);
            None
        }
        Err(e) => {
            log::warn!("discarding unreadable cached push registration: {e}");
            store.delete(&key);
            None
        }
    }
}

/// Cache `registration` under its platform key, replacing any previous one.
pub fn save_registration(
    store: &dyn KeyValueStore,
    registration: &DeviceRegistration,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(registration).map_err(|e| StorageError(e.to_string()))?;
    store.set(&registration.platform.registration_key(), &json)
}

pub fn clear_registration(store: &dyn KeyValueStore, platform: Platform) {
    store.delete(&platform.registration_key());
}
