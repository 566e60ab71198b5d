//! Data-source contract: what a provider returns and how it can fail.
//!
//! Providers hand back the raw JSON document. [`decode_dashboard_data`] turns
//! it into a [`DashboardData`], rejecting documents with missing required
//! fields so the projector never sees a malformed dataset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityPerformance, HierarchyOptions, LevelDatasets, OptionItem};
use crate::hierarchy::{GeoLevel, HierarchyLevel};
use crate::projector::OutageRow;
use crate::selection::DateRange;

/// Granularity a fetch is issued at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DashboardLevel {
    Central,
    State,
    District,
    Block,
    GramPanchayat,
    Village,
}

impl DashboardLevel {
    pub fn requires_entity_id(self) -> bool {
        self != Self::Central
    }
}

impl fmt::Display for DashboardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Central => "central",
            Self::State => "state",
            Self::District => "district",
            Self::Block => "block",
            Self::GramPanchayat => "gram panchayat",
            Self::Village => "village",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Payload
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandSupplyPoint {
    pub period: String,
    /// Million litres per day.
    pub demand: f32,
    pub supply: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSubmissionStatus {
    pub compliant: u32,
    pub anomalous: u32,
    pub pending: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpOperatorSummary {
    pub total: u32,
    pub active: u32,
    pub inactive: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoEvidenceRow {
    pub name: String,
    pub compliant: u32,
    pub non_compliant: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpOperatorPerformance {
    pub name: String,
    pub village: String,
    /// Percent of scheduled supply days reported on time.
    pub reporting_rate: f32,
    pub photo_compliance: f32,
}

/// Everything the dashboard needs for one mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    /// Base entity list for the fetch level (states for the central view).
    pub map_data: Vec<EntityPerformance>,
    /// Ancestors of the `map_data` entities, ancestor first. Empty for the
    /// central document.
    #[serde(default)]
    pub scope: Vec<OptionItem>,
    pub demand_supply: Vec<DemandSupplyPoint>,
    pub image_submission_status: ImageSubmissionStatus,
    /// Aggregate outage causes; see `projector::project_outage_breakdown`.
    pub water_supply_outages: Vec<OutageRow>,
    pub pump_operators: PumpOperatorSummary,
    pub photo_evidence_compliance: Vec<PhotoEvidenceRow>,
    #[serde(default)]
    pub leading_pump_operators: Option<Vec<PumpOperatorPerformance>>,
    #[serde(default)]
    pub bottom_pump_operators: Option<Vec<PumpOperatorPerformance>>,
    #[serde(default)]
    pub hierarchy: LevelDatasets,
    #[serde(default)]
    pub department_options: HierarchyOptions,
    #[serde(default)]
    pub schemes: Vec<crate::entity::OptionItem>,
    #[serde(default)]
    pub duration_presets: Vec<DateRange>,
}

impl DashboardData {
    /// Level of the `map_data` entities.
    pub fn base_level(&self) -> GeoLevel {
        GeoLevel::from_index(self.scope.len()).unwrap_or(GeoLevel::Village)
    }

    /// Ids of `scope`, ancestor first.
    pub fn scope_path(&self) -> Vec<String> {
        self.scope.iter().map(|o| o.id.clone()).collect()
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a dashboard fetch did not produce usable data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// The request failed or timed out. Carries the underlying message when
    /// one is available.
    Request(Option<String>),
    /// A non-central level was requested without an entity id.
    MissingEntityId(DashboardLevel),
    /// The response did not have the required shape.
    InvalidData(String),
}

impl DataSourceError {
    pub const GENERIC_MESSAGE: &'static str = "Unable to load dashboard data. Please try again.";

    /// Message for the full-screen error state.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(Some(msg)) if !msg.trim().is_empty() => msg.clone(),
            Self::Request(_) | Self::MissingEntityId(_) => Self::GENERIC_MESSAGE.to_string(),
            Self::InvalidData(_) => {
                "The dashboard received incomplete data and cannot display it.".to_string()
            }
        }
    }

    pub fn is_invalid_data(&self) -> bool {
        matches!(self, Self::InvalidData(_))
    }
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(Some(msg)) => write!(f, "Request failed: {msg}"),
            Self::Request(None) => write!(f, "Request failed"),
            Self::MissingEntityId(level) => {
                write!(f, "An entity id is required to fetch {level} data")
            }
            Self::InvalidData(msg) => write!(f, "Invalid dashboard data: {msg}"),
        }
    }
}

impl std::error::Error for DataSourceError {}

impl From<serde_json::Error> for DataSourceError {
    fn from(e: serde_json::Error) -> Self {
        DataSourceError::InvalidData(e.to_string())
    }
}

// =============================================================================
// Provider trait
// =============================================================================

/// A provider of dashboard documents.
///
/// `fetch` is called off the main thread on native targets.
pub trait DataSource: Send + Sync + 'static {
    fn fetch(
        &self,
        level: DashboardLevel,
        entity_id: Option<&str>,
    ) -> Result<serde_json::Value, DataSourceError>;
}

/// Decodes a raw provider document. Any missing required field is an
/// `InvalidData` error.
pub fn decode_dashboard_data(raw: serde_json::Value) -> Result<DashboardData, DataSourceError> {
    if !raw.is_object() {
        return Err(DataSourceError::InvalidData(
            "expected a JSON object".to_string(),
        ));
    }
    Ok(serde_json::from_value(raw)?)
}

/// Fetches and decodes in one step.
pub fn load_dashboard(
    source: &dyn DataSource,
    level: DashboardLevel,
    entity_id: Option<&str>,
) -> Result<DashboardData, DataSourceError> {
    if level.requires_entity_id() && entity_id.map_or(true, str::is_empty) {
        return Err(DataSourceError::MissingEntityId(level));
    }
    let raw = source.fetch(level, entity_id)?;
    decode_dashboard_data(raw)
}
