use std::sync::Arc;

use bevy::prelude::*;

use dashboard::config::DashboardConfig;
use dashboard::selection_store::SelectionStore;

use crate::key_value::{platform_store, KeyValueStore};
use crate::storage_persistence::StoragePersistence;

/// Backend the selection is persisted to. Defaults to the platform store;
/// insert a different one before `PreStartup` to override.
#[derive(Resource, Clone)]
pub struct SelectionBackend(pub Arc<dyn KeyValueStore>);

impl Default for SelectionBackend {
    fn default() -> Self {
        Self(platform_store())
    }
}

/// Restores the selection for the configured dashboard variant before the
/// first frame and persists it on every change afterwards.
pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectionBackend>()
            .add_systems(PreStartup, restore_selection);
    }
}

fn restore_selection(
    mut commands: Commands,
    config: Res<DashboardConfig>,
    backend: Res<SelectionBackend>,
) {
    let persistence = StoragePersistence::new(Arc::clone(&backend.0), config.storage_key());
    info!("Restoring selection from '{}'", persistence.key());
    commands.insert_resource(SelectionStore::restore(Arc::new(persistence)));
}
