#[cfg(not(target_arch = "wasm32"))]
mod atomic_write;
pub mod key_value;
mod save_error;
mod save_migrate;
mod save_migrate_registry;
mod save_plugin;
mod selection_codec;
mod storage_persistence;

#[cfg(target_arch = "wasm32")]
mod web_storage;

pub use save_error::SaveError;
pub use save_migrate::CURRENT_SELECTION_VERSION;
pub use save_plugin::{SavePlugin, SelectionBackend};
pub use storage_persistence::StoragePersistence;
