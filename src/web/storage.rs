//! `localStorage` adapter. Falls back to memory when storage is blocked
//! (private browsing, sandboxed iframes); individual failures are logged and dropped.

use web_sys::{Storage, Window};

use crate::capabilities::{KeyValueStore, MemoryStore};
use crate::error::MascotError;

pub struct LocalStore {
    storage: Option<Storage>,
    fallback: MemoryStore,
}

impl LocalStore {
    pub fn open(win: &Window) -> Self {
        let storage = match win.local_storage() {
            Ok(Some(s)) => Some(s),
            Ok(None) => {
                log::warn!("localStorage missing; mascot state will not persist");
                None
            }
            Err(err) => {
                log::warn!("{}; mascot state will not persist", MascotError::storage(err));
                None
            }
        };
        Self { storage, fallback: MemoryStore::new() }
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    fn try_get(storage: &Storage, key: &str) -> Result<Option<String>, MascotError> {
        storage.get_item(key).map_err(MascotError::storage)
    }

    fn try_set(storage: &Storage, key: &str, value: &str) -> Result<(), MascotError> {
        storage.set_item(key, value).map_err(MascotError::storage)
    }

    fn try_remove(storage: &Storage, key: &str) -> Result<(), MascotError> {
        storage.remove_item(key).map_err(MascotError::storage)
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        match &self.storage {
            Some(s) => Self::try_get(s, key).unwrap_or_else(|err| {
                log::warn!("read {key}: {err}");
                None
            }),
            None => self.fallback.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match &self.storage {
            Some(s) => {
                if let Err(err) = Self::try_set(s, key, value) {
                    log::warn!("write {key}: {err}");
                }
            }
            None => self.fallback.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) {
        match &self.storage {
            Some(s) => {
                if let Err(err) = Self::try_remove(s, key) {
                    log::warn!("remove {key}: {err}");
                }
            }
            None => self.fallback.remove(key),
        }
    }
}
