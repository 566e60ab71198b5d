//! Per-level dataset projector.
//!
//! Turns the resolved level plus the raw per-level datasets into what the
//! shared chart and table components consume: the entity list, its axis
//! label, a per-entity outage breakdown, and the ranked performance table.

use serde::{Deserialize, Serialize};

use crate::data_source::DashboardData;
use crate::entity::{EntityPerformance, LevelDatasets, PerformanceStatus};
use crate::hierarchy::{GeoLevel, GeoSelection, HierarchyLevel};
use crate::resolver::{resolve_screen, DashboardScreen};
use crate::selection::SelectionState;

/// Outage counts by cause for one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutageRow {
    pub name: String,
    pub electricity_failure: u32,
    pub pipeline_leak: u32,
    pub pump_failure: u32,
    pub valve_issue: u32,
    pub source_drying: u32,
}

impl OutageRow {
    pub fn zeroed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn total(&self) -> u32 {
        self.electricity_failure
            + self.pipeline_leak
            + self.pump_failure
            + self.valve_issue
            + self.source_drying
    }

    /// `(label, count)` per cause, in chart order.
    pub fn causes(&self) -> [(&'static str, u32); 5] {
        [
            ("Electricity", self.electricity_failure),
            ("Pipeline leak", self.pipeline_leak),
            ("Pump failure", self.pump_failure),
            ("Valve issue", self.valve_issue),
            ("Source drying", self.source_drying),
        ]
    }
}

/// Entity list and the label that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedEntities {
    pub entities: Vec<EntityPerformance>,
    pub label: &'static str,
}

/// Entities listed for the current selection: the siblings at the deepest
/// selected level, or `base` (entities of `base_level`) when nothing below
/// `base_level` is selected.
///
/// Stale ids resolve to an empty list, never an error.
pub fn project_entities(
    geo: &GeoSelection,
    base: &[EntityPerformance],
    base_level: GeoLevel,
    datasets: &LevelDatasets,
) -> ProjectedEntities {
    let level = geo.listed_level(base_level);
    let siblings = (level != base_level)
        .then(|| level.parent().zip(datasets.for_child_level(level)))
        .flatten();
    let entities = match siblings {
        Some((parent, dataset)) => dataset.children(geo.get(parent)).to_vec(),
        None => base.to_vec(),
    };
    ProjectedEntities {
        entities,
        label: level.plural_label(),
    }
}

/// One outage row per visible entity.
///
/// The source only has aggregate rows, so they are handed out cyclically
/// (`aggregate[i % len]`) with the name replaced by the entity's. This is an
/// approximation: no true per-entity breakdown exists upstream. With no
/// aggregate rows at all, each entity gets a zero-filled row.
pub fn project_outage_breakdown(
    entities: &[EntityPerformance],
    aggregate: &[OutageRow],
) -> Vec<OutageRow> {
    entities
        .iter()
        .enumerate()
        .map(|(index, entity)| {
            if aggregate.is_empty() {
                OutageRow::zeroed(entity.name.clone())
            } else {
                OutageRow {
                    name: entity.name.clone(),
                    ..aggregate[index % aggregate.len()].clone()
                }
            }
        })
        .collect()
}

/// A row of the ranked performance table.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    pub rank: usize,
    pub entity: EntityPerformance,
}

/// Entities sorted by composite score (best first), ranked from 1, at most
/// `limit` rows. Ties keep source order.
pub fn performance_rows(entities: &[EntityPerformance], limit: usize) -> Vec<PerformanceRow> {
    let mut sorted: Vec<&EntityPerformance> = entities.iter().collect();
    sorted.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, entity)| PerformanceRow {
            rank: i + 1,
            entity: entity.clone(),
        })
        .collect()
}

/// Headline KPIs for the visible entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiSummary {
    pub entity_count: usize,
    pub avg_coverage: f32,
    pub avg_regularity: f32,
    pub avg_continuity: f32,
    pub avg_quantity: f32,
    pub good: usize,
    pub needs_attention: usize,
    pub critical: usize,
}

pub fn summarize(entities: &[EntityPerformance]) -> KpiSummary {
    if entities.is_empty() {
        return KpiSummary::default();
    }
    let n = entities.len() as f32;
    let mut summary = KpiSummary {
        entity_count: entities.len(),
        ..Default::default()
    };
    for e in entities {
        summary.avg_coverage += e.coverage;
        summary.avg_regularity += e.regularity;
        summary.avg_continuity += e.continuity;
        summary.avg_quantity += e.quantity;
        match e.status {
            PerformanceStatus::Good => summary.good += 1,
            PerformanceStatus::NeedsAttention => summary.needs_attention += 1,
            PerformanceStatus::Critical => summary.critical += 1,
        }
    }
    summary.avg_coverage /= n;
    summary.avg_regularity /= n;
    summary.avg_continuity /= n;
    summary.avg_quantity /= n;
    summary
}

// =============================================================================
// ResolvedView
// =============================================================================

/// Everything derived from the selection and the loaded data for one frame.
/// Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedView {
    /// Deepest selected geographic level, `None` on the central view.
    pub level: Option<GeoLevel>,
    /// `false` when the deepest selected level is pinned by the data scope.
    pub can_go_up: bool,
    pub entities: Vec<EntityPerformance>,
    pub label: &'static str,
    pub screen: DashboardScreen,
    pub outages: Vec<OutageRow>,
    pub table: Vec<PerformanceRow>,
    pub summary: KpiSummary,
}

impl ResolvedView {
    pub fn resolve(selection: &SelectionState, data: &DashboardData, table_rows: usize) -> Self {
        let geo = selection.geo();
        let projected =
            project_entities(geo, &data.map_data, data.base_level(), &data.hierarchy);
        let outages = project_outage_breakdown(&projected.entities, &data.water_supply_outages);
        let table = performance_rows(&projected.entities, table_rows);
        let summary = summarize(&projected.entities);
        Self {
            level: geo.deepest_selected(),
            can_go_up: geo
                .deepest_selected()
                .is_some_and(|level| level.index() >= data.scope.len()),
            label: projected.label,
            screen: resolve_screen(geo),
            entities: projected.entities,
            outages,
            table,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::LevelDataset;

    fn entity(id: &str, score: f32) -> EntityPerformance {
        EntityPerformance {
            id: id.to_string(),
            name: id.to_uppercase(),
            coverage: score,
            regularity: score,
            continuity: 10.0,
            quantity: 40.0,
            composite_score: score,
            status: PerformanceStatus::from_score(score),
        }
    }

    fn datasets() -> LevelDatasets {
        let mut d = LevelDatasets::default();
        d.districts_by_state
            .insert("s1", vec![entity("d1", 50.0), entity("d2", 80.0)]);
        d.blocks_by_district
            .insert("d1", vec![entity("b1", 30.0), entity("b2", 40.0), entity("b3", 90.0)]);
        d.gram_panchayats_by_block.insert("b1", vec![entity("g1", 60.0)]);
        d.villages_by_gram_panchayat
            .insert("g1", vec![entity("v1", 70.0), entity("v2", 20.0)]);
        d.villages_by_gram_panchayat
            .insert("g2", vec![entity("other", 70.0)]);
        d
    }

    fn base() -> Vec<EntityPerformance> {
        vec![entity("s1", 55.0), entity("s2", 75.0)]
    }

    fn outage(name: &str, n: u32) -> OutageRow {
        OutageRow {
            name: name.to_string(),
            electricity_failure: n,
            pipeline_leak: n + 1,
            pump_failure: 0,
            valve_issue: 0,
            source_drying: 0,
        }
    }

    fn ids(projected: &ProjectedEntities) -> Vec<&str> {
        projected.entities.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_default_projects_base_states() {
        let p = project_entities(&GeoSelection::new(), &base(), GeoLevel::State, &datasets());
        assert_eq!(p.label, "States/UTs");
        assert_eq!(ids(&p), vec!["s1", "s2"]);
    }

    #[test]
    fn test_state_selected_still_lists_states() {
        let geo = GeoSelection::from_values(["s1"]);
        let p = project_entities(&geo, &base(), GeoLevel::State, &datasets());
        assert_eq!(p.label, "States/UTs");
        assert_eq!(ids(&p), vec!["s1", "s2"]);
    }

    #[test]
    fn test_label_and_entities_move_together() {
        let cases: [(&[&str], &str, Vec<&str>); 4] = [
            (&["s1", "d1"], "Districts", vec!["d1", "d2"]),
            (&["s1", "d1", "b1"], "Blocks", vec!["b1", "b2", "b3"]),
            (&["s1", "d1", "b1", "g1"], "Gram Panchayats", vec!["g1"]),
            (&["s1", "d1", "b1", "g1", "v2"], "Villages", vec!["v1", "v2"]),
        ];
        for (values, label, expected) in cases {
            let geo = GeoSelection::from_values(values.iter().copied());
            let p = project_entities(&geo, &base(), GeoLevel::State, &datasets());
            assert_eq!(p.label, label, "{values:?}");
            assert_eq!(ids(&p), expected, "{values:?}");
        }
    }

    #[test]
    fn test_scoped_base_keeps_its_own_label() {
        let districts = vec![entity("d1", 50.0), entity("d2", 80.0)];
        let geo = GeoSelection::from_values(["s1"]);
        let p = project_entities(&geo, &districts, GeoLevel::District, &datasets());
        assert_eq!(p.label, "Districts");
        assert_eq!(ids(&p), vec!["d1", "d2"]);

        let geo = GeoSelection::from_values(["s1", "d1", "b1"]);
        let p = project_entities(&geo, &districts, GeoLevel::District, &datasets());
        assert_eq!(p.label, "Blocks");
        assert_eq!(ids(&p), vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn test_stale_parent_id_yields_empty_list() {
        let geo = GeoSelection::from_values(["gone", "d-unknown"]);
        let p = project_entities(&geo, &base(), GeoLevel::State, &datasets());
        assert_eq!(p.label, "Districts");
        assert!(p.entities.is_empty());
    }

    #[test]
    fn test_outage_fan_out_reuses_aggregate_cyclically() {
        let children = vec![entity("a", 1.0), entity("b", 1.0), entity("c", 1.0)];
        let aggregate = vec![outage("agg-0", 10), outage("agg-1", 20)];
        let rows = project_outage_breakdown(&children, &aggregate);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[0].electricity_failure, 10);
        assert_eq!(rows[1].name, "B");
        assert_eq!(rows[1].electricity_failure, 20);
        assert_eq!(rows[2].name, "C");
        assert_eq!(rows[2].electricity_failure, 10, "index 2 % 2 == 0");
        assert_eq!(rows[2].pipeline_leak, 11);
    }

    #[test]
    fn test_outage_fan_out_zero_fills_without_aggregate() {
        let children = vec![entity("a", 1.0), entity("b", 1.0)];
        let rows = project_outage_breakdown(&children, &[]);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.total() == 0));
        assert_eq!(rows[1].name, "B");
    }

    #[test]
    fn test_outage_fan_out_one_row_per_entity_for_any_sizes() {
        let aggregate: Vec<OutageRow> = (0..4).map(|i| outage("x", i)).collect();
        for n_entities in 0..9 {
            let children: Vec<EntityPerformance> =
                (0..n_entities).map(|i| entity(&format!("e{i}"), 1.0)).collect();
            for n_agg in 0..=aggregate.len() {
                let rows = project_outage_breakdown(&children, &aggregate[..n_agg]);
                assert_eq!(rows.len(), n_entities);
            }
        }
    }

    #[test]
    fn test_performance_rows_sorted_ranked_and_limited() {
        let entities = vec![entity("a", 30.0), entity("b", 90.0), entity("c", 60.0)];
        let rows = performance_rows(&entities, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].entity.id, "b");
        assert_eq!(rows[1].entity.id, "c");
    }

    #[test]
    fn test_summarize_counts_statuses() {
        let entities = vec![entity("a", 30.0), entity("b", 90.0), entity("c", 60.0)];
        let s = summarize(&entities);
        assert_eq!(s.entity_count, 3);
        assert_eq!((s.good, s.needs_attention, s.critical), (1, 1, 1));
        assert!((s.avg_coverage - 60.0).abs() < 0.001);
        assert_eq!(summarize(&[]), KpiSummary::default());
    }
}
