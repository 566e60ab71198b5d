//! String key-value backends for the persisted selection.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::save_error::SaveError;

/// Environment variable naming the native storage directory.
pub const DATA_DIR_ENV: &str = "WATERWATCH_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = ".waterwatch";

/// A durable string store. `get` of a missing key is `Ok(None)`; `remove`
/// of a missing key is `Ok(())`.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SaveError>;
    fn remove(&self, key: &str) -> Result<(), SaveError>;
}

/// Process-local store, for tests and for running with persistence off.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, SaveError> {
        self.entries
            .lock()
            .map_err(|_| SaveError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SaveError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SaveError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Native file backend
// ---------------------------------------------------------------------------

/// One `{key}.json` file per key inside `dir`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory from `WATERWATCH_DATA_DIR`, or `.waterwatch`.
    pub fn from_env() -> Self {
        let dir = std::env::var(DATA_DIR_ENV)
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        Self::new(dir)
    }

    pub fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            // Non-UTF-8 contents are corrupt data, not an I/O failure.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                Err(SaveError::Decode(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SaveError> {
        crate::atomic_write::atomic_write(&self.path_for(key), value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SaveError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The backend for this platform: files on native, `localStorage` on wasm.
pub fn platform_store() -> std::sync::Arc<dyn KeyValueStore> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::sync::Arc::new(FileStore::from_env())
    }
    #[cfg(target_arch = "wasm32")]
    {
        std::sync::Arc::new(crate::web_storage::WebStore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::default();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(!store.contains("k"));
        store.remove("k").unwrap();
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_round_trip() {
        let dir = std::path::PathBuf::from("/tmp/waterwatch_file_store_test");
        let _ = std::fs::remove_dir_all(&dir);
        let store = FileStore::new(&dir);

        assert_eq!(store.get("waterwatch.central.selection").unwrap(), None);
        store.set("waterwatch.central.selection", "{}").unwrap();
        assert!(dir.join("waterwatch.central.selection.json").exists());
        assert_eq!(
            store.get("waterwatch.central.selection").unwrap().as_deref(),
            Some("{}")
        );
        store.remove("waterwatch.central.selection").unwrap();
        store.remove("waterwatch.central.selection").unwrap();
        assert_eq!(store.get("waterwatch.central.selection").unwrap(), None);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_non_utf8_is_decode_error() {
        let dir = std::path::PathBuf::from("/tmp/waterwatch_file_store_binary_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let store = FileStore::new(&dir);
        std::fs::write(store.path_for("k"), [0xFF, 0xFE, 0x00]).unwrap();

        assert!(matches!(store.get("k"), Err(SaveError::Decode(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
