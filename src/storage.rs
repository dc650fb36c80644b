use crate::{error::StorageError, ffi};
use std::{cell::RefCell, collections::HashMap};

/// Durable string key/value slots shared by the whole application.
///
/// Every connector built on the same store sees the same slots, there is
/// no locking between them.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store, for tests and non browser hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

/// The browser's `window.localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    fn with<T>(
        f: impl FnOnce(&ffi::Storage) -> Result<T, wasm_bindgen::JsValue>,
    ) -> Result<T, StorageError> {
        ffi::local_storage::LOCAL_STORAGE.with(|storage| {
            let Some(storage) = storage else {
                return Err(StorageError("window.localStorage is not available".to_owned()));
            };
            f(storage).map_err(|error| StorageError(format!("{error:?}")))
        })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::with(|storage| storage.get_item(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::with(|storage| storage.set_item(key, value))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::with(|storage| storage.remove_item(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_slots() {
        let store = MemoryStore::new();
        assert_eq!(store.get("key").unwrap(), None);

        store.set("key", "0xA").unwrap();
        store.set("key", "0xB").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("0xB"));

        store.remove("key").unwrap();
        store.remove("key").unwrap();
        assert_eq!(store.get("key").unwrap(), None);
    }
}
