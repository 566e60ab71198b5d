//! `localStorage` backend for the web build.

use web_sys::{Storage, Window};

use crate::key_value::KeyValueStore;
use crate::save_error::SaveError;

fn window() -> Result<Window, SaveError> {
    web_sys::window().ok_or_else(|| SaveError::Storage("no window".to_string()))
}

/// `localStorage` can be missing or throw (private browsing, disabled
/// storage); both surface as `SaveError::Storage`.
fn local_storage() -> Result<Storage, SaveError> {
    window()?
        .local_storage()
        .map_err(|e| SaveError::Storage(format!("localStorage error: {e:?}")))?
        .ok_or_else(|| SaveError::Storage("no localStorage".to_string()))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WebStore;

impl KeyValueStore for WebStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| SaveError::Storage(format!("failed to read '{key}': {e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SaveError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| SaveError::Storage(format!("failed to write '{key}': {e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), SaveError> {
        local_storage()?
            .remove_item(key)
            .map_err(|e| SaveError::Storage(format!("failed to remove '{key}': {e:?}")))
    }
}
