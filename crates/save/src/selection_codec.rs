//! JSON layout of the persisted selection.
//!
//! ```json
//! {
//!   "version": 1,
//!   "geo": { "state": "S01", "district": "", ... },
//!   "scheme": "",
//!   "duration": { "startDate": "2024-04-01", "endDate": "2025-03-31", "preset": "FY 2024-25" },
//!   "department": { "state": "", "zone": "", ... },
//!   "activeTab": "geographic"
//! }
//! ```
//!
//! Decoding is shallow and field-by-field: a field with the wrong shape is
//! treated as absent rather than failing the whole blob. Only a blob that is
//! not a JSON object, or whose version cannot be handled, is an error.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use dashboard::hierarchy::{HierarchyLevel, OrderedHierarchy};
use dashboard::selection::{DateRange, FilterTab, PartialSelection, SelectionState};

use crate::save_error::SaveError;
use crate::save_migrate::CURRENT_SELECTION_VERSION;
use crate::save_migrate_registry::{Blob, MigrationRegistry, MigrationReport};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectionRecord<'a> {
    version: u32,
    geo: BTreeMap<&'static str, &'a str>,
    scheme: &'a str,
    duration: Option<&'a DateRange>,
    department: BTreeMap<&'static str, &'a str>,
    active_tab: FilterTab,
}

fn levels_to_map<L: HierarchyLevel>(hierarchy: &OrderedHierarchy<L>) -> BTreeMap<&'static str, &str> {
    hierarchy.iter().map(|(level, value)| (level.key(), value)).collect()
}

pub fn encode_selection(state: &SelectionState) -> Result<String, SaveError> {
    let record = SelectionRecord {
        version: CURRENT_SELECTION_VERSION,
        geo: levels_to_map(state.geo()),
        scheme: state.scheme(),
        duration: state.duration(),
        department: levels_to_map(state.department()),
        active_tab: state.active_tab(),
    };
    serde_json::to_string(&record).map_err(|e| SaveError::Encode(e.to_string()))
}

/// Parses, migrates and shallow-validates a stored blob.
pub fn decode_selection(
    raw: &str,
    registry: &MigrationRegistry,
) -> Result<(PartialSelection, MigrationReport), SaveError> {
    let Value::Object(mut blob) = serde_json::from_str::<Value>(raw)? else {
        return Err(SaveError::Decode(
            "selection is not a JSON object".to_string(),
        ));
    };
    let version = blob_version(&blob)?;
    let report = registry.migrate(&mut blob, version)?;
    Ok((partial_from_blob(&blob), report))
}

/// Missing `version` means an unversioned (v0) blob.
fn blob_version(blob: &Blob) -> Result<u32, SaveError> {
    match blob.get("version") {
        None => Ok(0),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| SaveError::Decode(format!("invalid selection version {value}"))),
    }
}

fn partial_from_blob(blob: &Blob) -> PartialSelection {
    PartialSelection {
        geo: hierarchy_from(blob.get("geo")),
        scheme: blob.get("scheme").and_then(Value::as_str).map(str::to_string),
        duration: duration_from(blob.get("duration")),
        department: hierarchy_from(blob.get("department")),
        active_tab: blob
            .get("activeTab")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
    }
}

/// Object keyed by level key. Non-string values read as empty, and the
/// cascade invariant is re-established by `from_values`.
fn hierarchy_from<L: HierarchyLevel>(value: Option<&Value>) -> Option<OrderedHierarchy<L>> {
    let levels = value?.as_object()?;
    Some(OrderedHierarchy::from_values(L::ALL.iter().map(|level| {
        levels
            .get(level.key())
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    })))
}

/// Accepted only as an object carrying both `startDate` and `endDate`.
fn duration_from(value: Option<&Value>) -> Option<DateRange> {
    let range = value?.as_object()?;
    if !range.contains_key("startDate") || !range.contains_key("endDate") {
        return None;
    }
    serde_json::from_value(Value::Object(range.clone())).ok()
}
