//! Web storage implementation using browser LocalStorage.

use gloo_storage::{LocalStorage, Storage as GlooStorage};

use crate::platform::storage::{Storage, StorageError};

/// Web storage backed by the browser's `localStorage`.
///
/// Values are stored verbatim; they are already JSON documents.
#[derive(Debug, Default)]
pub struct WebStorage;

impl WebStorage {
    /// Create a new web storage instance.
    pub fn new() -> Self {
        Self
    }
}

fn js_error(context: &str, e: wasm_bindgen::JsValue) -> StorageError {
    StorageError::NotAvailable(format!("{context}: {e:?}"))
}

impl Storage for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| js_error("Failed to read from localStorage", e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| js_error("Failed to write to localStorage", e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        LocalStorage::delete(key);
        Ok(())
    }
}
