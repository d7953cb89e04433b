use web_sys::Storage;

use crate::error::{js_message, StorageError};
use crate::storage::DraftStore;

/// `window.localStorage`, or nothing when the browser blocks it (private
/// mode, disabled cookies). Without storage every call fails softly.
pub struct LocalDraftStore {
    storage: Option<Storage>,
}

impl LocalDraftStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable, drafts will not be kept");
        }
        LocalDraftStore { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl Default for LocalDraftStore {
    fn default() -> Self {
        LocalDraftStore::new()
    }
}

impl DraftStore for LocalDraftStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Operation(js_message(&e)))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Operation(js_message(&e)))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Operation(js_message(&e)))
    }
}
