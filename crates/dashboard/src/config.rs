use bevy::prelude::*;

use crate::data_source::DashboardLevel;

/// Prefix for every storage key written by the dashboard.
pub const STORAGE_NAMESPACE: &str = "waterwatch";

/// Composite score at or above which an entity is "good".
pub const GOOD_SCORE_THRESHOLD: f32 = 70.0;
/// Composite score at or above which an entity "needs attention".
pub const NEEDS_ATTENTION_SCORE_THRESHOLD: f32 = 40.0;

/// Service norm for rural supply, litres per capita per day.
pub const LPCD_SERVICE_NORM: f32 = 55.0;

/// Rows shown in the performance table.
pub const PERFORMANCE_TABLE_ROWS: usize = 10;

/// Seed for the mock data source, so every run shows the same country.
pub const MOCK_DATA_SEED: u64 = 0x5EED_0A7E;

/// Selects the mounted variant: `central`, `state` or `district`.
pub const VARIANT_ENV: &str = "WATERWATCH_VARIANT";
/// Entity id for the `state` and `district` variants.
pub const ENTITY_ID_ENV: &str = "WATERWATCH_ENTITY_ID";

/// Which dashboard is mounted. Each variant persists its selection under its
/// own storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DashboardVariant {
    #[default]
    Central,
    State,
    District,
}

impl DashboardVariant {
    pub fn key(self) -> &'static str {
        match self {
            Self::Central => "central",
            Self::State => "state",
            Self::District => "district",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        [Self::Central, Self::State, Self::District]
            .into_iter()
            .find(|v| v.key() == key)
    }
}

/// Mount-time configuration for the dashboard.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardConfig {
    pub variant: DashboardVariant,
    /// Entity the dashboard is scoped to. Required for non-central variants.
    pub entity_id: Option<String>,
}

impl DashboardConfig {
    pub fn central() -> Self {
        Self::default()
    }

    pub fn scoped(variant: DashboardVariant, entity_id: impl Into<String>) -> Self {
        Self {
            variant,
            entity_id: Some(entity_id.into()),
        }
    }

    /// Reads `WATERWATCH_VARIANT` and `WATERWATCH_ENTITY_ID`.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(VARIANT_ENV).ok().as_deref(),
            std::env::var(ENTITY_ID_ENV).ok(),
        )
    }

    /// Unknown variants fall back to the central dashboard. A scoped variant
    /// without an id is kept as-is; its fetch reports the missing id.
    pub fn from_vars(variant: Option<&str>, entity_id: Option<String>) -> Self {
        let variant = match variant.map(str::trim).filter(|v| !v.is_empty()) {
            None => DashboardVariant::Central,
            Some(key) => DashboardVariant::from_key(&key.to_ascii_lowercase())
                .unwrap_or_else(|| {
                    warn!("Unknown dashboard variant '{key}', using central");
                    DashboardVariant::Central
                }),
        };
        let entity_id = match variant {
            DashboardVariant::Central => None,
            _ => entity_id.filter(|id| !id.trim().is_empty()),
        };
        Self { variant, entity_id }
    }

    /// Storage key for the persisted selection, e.g. `waterwatch.central.selection`.
    pub fn storage_key(&self) -> String {
        selection_storage_key(self.variant)
    }

    pub fn fetch_level(&self) -> DashboardLevel {
        match self.variant {
            DashboardVariant::Central => DashboardLevel::Central,
            DashboardVariant::State => DashboardLevel::State,
            DashboardVariant::District => DashboardLevel::District,
        }
    }
}

pub fn selection_storage_key(variant: DashboardVariant) -> String {
    format!("{STORAGE_NAMESPACE}.{}.selection", variant.key())
}
