use std::sync::Arc;

use bevy::prelude::*;

use dashboard::selection::{PartialSelection, SelectionState};
use dashboard::selection_store::SelectionPersistence;

use crate::key_value::KeyValueStore;
use crate::save_error::SaveError;
use crate::save_migrate::build_migration_registry;
use crate::save_migrate_registry::MigrationRegistry;
use crate::selection_codec::{decode_selection, encode_selection};

/// Best-effort persistence of the selection under one namespaced key.
///
/// Never fails: unreadable blobs are discarded and deleted, write and delete
/// failures are logged and dropped.
pub struct StoragePersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
    registry: MigrationRegistry,
}

impl StoragePersistence {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            registry: build_migration_registry(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn try_load(&self) -> Result<PartialSelection, SaveError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(PartialSelection::default());
        };
        let (partial, report) = decode_selection(&raw, &self.registry)?;
        if report.steps_applied() > 0 {
            info!(
                "Migrated persisted selection '{}' from v{} to v{}",
                self.key, report.original_version, report.final_version
            );
        }
        Ok(partial)
    }

    fn discard(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            warn!("Could not delete persisted selection '{}': {e}", self.key);
        }
    }
}

impl SelectionPersistence for StoragePersistence {
    fn load(&self) -> PartialSelection {
        match self.try_load() {
            Ok(partial) => partial,
            // Backend unavailable: nothing to discard.
            Err(e @ (SaveError::Io(_) | SaveError::Storage(_))) => {
                warn!("Persisted selection '{}' unavailable: {e}", self.key);
                PartialSelection::default()
            }
            Err(e) => {
                warn!("Discarding persisted selection '{}': {e}", self.key);
                self.discard();
                PartialSelection::default()
            }
        }
    }

    fn save(&self, state: &SelectionState) {
        let result = encode_selection(state).and_then(|raw| self.store.set(&self.key, &raw));
        if let Err(e) = result {
            warn!("Could not persist selection '{}': {e}", self.key);
        }
    }
}
