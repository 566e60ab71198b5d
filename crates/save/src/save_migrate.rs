use crate::save_migrate_registry::{Blob, MigrationRegistry, MigrationStep};

/// Version written by this build.
pub const CURRENT_SELECTION_VERSION: u32 = 1;

/// v0 blobs are the original unversioned layout: the same flat object with
/// `geo`, `scheme`, `duration`, `department` and `activeTab`, minus `version`.
fn stamp_version(blob: &mut Blob) {
    blob.insert("version".to_string(), 1.into());
}

pub(crate) fn build_migration_registry() -> MigrationRegistry {
    MigrationRegistry::new(
        vec![MigrationStep {
            from_version: 0,
            description: "v0 -> v1: add schema version to unversioned selection",
            migrate_fn: stamp_version,
        }],
        CURRENT_SELECTION_VERSION,
    )
}
