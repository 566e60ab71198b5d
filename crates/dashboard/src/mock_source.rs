//! Deterministic in-process data source.
//!
//! Generates a whole synthetic country (states down to villages), the
//! department hierarchy, schemes, reporting periods and chart series from a
//! fixed seed, so the dashboard is fully explorable without a backend.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::MOCK_DATA_SEED;
use crate::data_source::{
    DashboardData, DashboardLevel, DataSource, DataSourceError, DemandSupplyPoint,
    ImageSubmissionStatus, PhotoEvidenceRow, PumpOperatorPerformance, PumpOperatorSummary,
};
use crate::entity::{
    composite_score, EntityPerformance, HierarchyOptions, LevelDatasets, OptionItem,
    PerformanceStatus,
};
use crate::hierarchy::{DepartmentLevel, GeoLevel, HierarchyLevel};
use crate::projector::OutageRow;
use crate::selection::DateRange;

const STATE_NAMES: [&str; 8] = [
    "Rajasthan",
    "Maharashtra",
    "Odisha",
    "Bihar",
    "Karnataka",
    "Assam",
    "Gujarat",
    "Jharkhand",
];

const NAME_STEMS: [&str; 12] = [
    "Ram", "Shiv", "Kal", "Chand", "Bel", "Nar", "Dev", "Har", "Gop", "Sur", "Kes", "Madh",
];

const NAME_SUFFIXES: [&str; 8] = [
    "pur", "garh", "nagar", "abad", "ganj", "wadi", "kot", "pura",
];

const MONTHS: [&str; 12] = [
    "2024-04", "2024-05", "2024-06", "2024-07", "2024-08", "2024-09", "2024-10", "2024-11",
    "2024-12", "2025-01", "2025-02", "2025-03",
];

/// Children generated per parent, by child level (inclusive ranges).
const CHILD_COUNTS: [(usize, usize); 4] = [(3, 5), (2, 4), (2, 3), (2, 4)];

pub struct MockDataSource {
    central: DashboardData,
}

impl MockDataSource {
    pub fn new(seed: u64) -> Self {
        Self {
            central: generate(seed),
        }
    }

    /// The generated central document, before JSON encoding.
    pub fn central_data(&self) -> &DashboardData {
        &self.central
    }

    /// Base entities for a scoped fetch: the children of `id` at `level`
    /// (or the village itself at the leaf).
    fn scoped_entities(&self, level: DashboardLevel, id: &str) -> Option<Vec<EntityPerformance>> {
        let h = &self.central.hierarchy;
        let children = match level {
            DashboardLevel::Central => return Some(self.central.map_data.clone()),
            DashboardLevel::State => h.districts_by_state.0.get(id),
            DashboardLevel::District => h.blocks_by_district.0.get(id),
            DashboardLevel::Block => h.gram_panchayats_by_block.0.get(id),
            DashboardLevel::GramPanchayat => h.villages_by_gram_panchayat.0.get(id),
            DashboardLevel::Village => {
                return h
                    .villages_by_gram_panchayat
                    .0
                    .values()
                    .flatten()
                    .find(|v| v.id == id)
                    .map(|v| vec![v.clone()]);
            }
        };
        children.cloned()
    }

    /// Ancestors of the entities listed by a scoped fetch for `id`,
    /// ancestor first. Ids nest, so every `-` separated prefix of `id` is
    /// an ancestor.
    fn scope_of(&self, level: DashboardLevel, id: &str) -> Vec<OptionItem> {
        let mut path: Vec<OptionItem> = id
            .match_indices('-')
            .map(|(end, _)| &id[..end])
            .chain(std::iter::once(id))
            .map(|ancestor| {
                OptionItem::new(ancestor, self.entity_name(ancestor).unwrap_or(ancestor))
            })
            .collect();
        if level == DashboardLevel::Village {
            path.pop();
        }
        path
    }

    fn entity_name(&self, id: &str) -> Option<&str> {
        let h = &self.central.hierarchy;
        self.central
            .map_data
            .iter()
            .chain(
                GeoLevel::ALL
                    .iter()
                    .filter_map(|level| h.for_child_level(*level))
                    .flat_map(|dataset| dataset.0.values().flatten()),
            )
            .find(|e| e.id == id)
            .map(|e| e.name.as_str())
    }
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new(MOCK_DATA_SEED)
    }
}

impl DataSource for MockDataSource {
    fn fetch(
        &self,
        level: DashboardLevel,
        entity_id: Option<&str>,
    ) -> Result<serde_json::Value, DataSourceError> {
        let mut data = self.central.clone();
        if level.requires_entity_id() {
            let id = entity_id
                .filter(|id| !id.is_empty())
                .ok_or(DataSourceError::MissingEntityId(level))?;
            data.map_data = self.scoped_entities(level, id).ok_or_else(|| {
                DataSourceError::Request(Some(format!("No {level} found with id '{id}'")))
            })?;
            data.scope = self.scope_of(level, id);
        }
        Ok(serde_json::to_value(&data)?)
    }
}

// =============================================================================
// Generation
// =============================================================================

fn generate(seed: u64) -> DashboardData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let states: Vec<EntityPerformance> = STATE_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| random_entity(&mut rng, format!("S{:02}", i + 1), name.to_string()))
        .collect();

    let mut hierarchy = LevelDatasets::default();
    let mut parents = states.clone();
    for (child_level, &(min, max)) in GeoLevel::ALL[1..].iter().zip(CHILD_COUNTS.iter()) {
        let mut next_parents = Vec::new();
        let mut by_parent = BTreeMap::new();
        for parent in &parents {
            let count = rng.gen_range(min..=max);
            let children: Vec<EntityPerformance> = (1..=count)
                .map(|n| {
                    let id = format!("{}-{}{:02}", parent.id, level_prefix(*child_level), n);
                    let name = random_place_name(&mut rng);
                    random_entity(&mut rng, id, name)
                })
                .collect();
            next_parents.extend(children.iter().cloned());
            by_parent.insert(parent.id.clone(), children);
        }
        if let Some(dataset) = hierarchy.for_child_level_mut(*child_level) {
            dataset.0 = by_parent;
        }
        parents = next_parents;
    }

    let water_supply_outages = states
        .iter()
        .map(|s| OutageRow {
            name: s.name.clone(),
            electricity_failure: rng.gen_range(0..40),
            pipeline_leak: rng.gen_range(0..30),
            pump_failure: rng.gen_range(0..25),
            valve_issue: rng.gen_range(0..15),
            source_drying: rng.gen_range(0..10),
        })
        .collect();

    let demand_supply = MONTHS
        .iter()
        .map(|period| {
            let demand: f32 = rng.gen_range(180.0..240.0);
            DemandSupplyPoint {
                period: period.to_string(),
                demand,
                supply: demand * rng.gen_range(0.7_f32..1.05),
            }
        })
        .collect();

    let photo_evidence_compliance = states
        .iter()
        .map(|s| PhotoEvidenceRow {
            name: s.name.clone(),
            compliant: rng.gen_range(200..900),
            non_compliant: rng.gen_range(10..200),
        })
        .collect();

    let total_operators: u32 = rng.gen_range(4_000..6_000);
    let active = (total_operators as f32 * rng.gen_range(0.75_f32..0.95)) as u32;
    let pump_operators = PumpOperatorSummary {
        total: total_operators,
        active,
        inactive: total_operators - active,
    };

    let mut operators: Vec<PumpOperatorPerformance> = parents
        .iter()
        .take(40)
        .map(|village| PumpOperatorPerformance {
            name: random_person_name(&mut rng),
            village: village.name.clone(),
            reporting_rate: rng.gen_range(20.0..100.0),
            photo_compliance: rng.gen_range(10.0..100.0),
        })
        .collect();
    operators.sort_by(|a, b| b.reporting_rate.total_cmp(&a.reporting_rate));
    let leading = operators.iter().take(5).cloned().collect();
    let bottom = operators.iter().rev().take(5).cloned().collect();

    let image_submission_status = ImageSubmissionStatus {
        compliant: rng.gen_range(8_000..12_000),
        anomalous: rng.gen_range(200..900),
        pending: rng.gen_range(100..600),
    };

    let department_options = generate_department_options(&mut rng, &states);

    let schemes = (1..=6)
        .map(|n| OptionItem::new(format!("SCH-{n:03}"), format!("Piped Water Supply Scheme {n}")))
        .collect();

    let duration_presets = vec![
        DateRange::new("2023-04-01", "2024-03-31").with_preset("FY 2023-24"),
        DateRange::new("2024-04-01", "2025-03-31").with_preset("FY 2024-25"),
        DateRange::new("2024-04-01", "2024-06-30").with_preset("Q1 FY 2024-25"),
        DateRange::new("2024-07-01", "2024-09-30").with_preset("Q2 FY 2024-25"),
        DateRange::new("2024-10-01", "2024-12-31").with_preset("Q3 FY 2024-25"),
        DateRange::new("2025-01-01", "2025-03-31").with_preset("Q4 FY 2024-25"),
    ];

    DashboardData {
        map_data: states,
        scope: Vec::new(),
        demand_supply,
        image_submission_status,
        water_supply_outages,
        pump_operators,
        photo_evidence_compliance,
        leading_pump_operators: Some(leading),
        bottom_pump_operators: Some(bottom),
        hierarchy,
        department_options,
        schemes,
        duration_presets,
    }
}

fn generate_department_options(
    rng: &mut ChaCha8Rng,
    states: &[EntityPerformance],
) -> HierarchyOptions {
    let mut options = HierarchyOptions {
        roots: states.iter().map(OptionItem::from).collect(),
        by_parent: vec![BTreeMap::new(); DepartmentLevel::ALL.len() - 1],
    };
    let mut parents: Vec<OptionItem> = options.roots.clone();
    for level in &DepartmentLevel::ALL[1..] {
        let mut next = Vec::new();
        for parent in &parents {
            let count = if *level == DepartmentLevel::Village { 3 } else { 2 };
            let children: Vec<OptionItem> = (1..=count)
                .map(|n| {
                    let id = format!("{}-{}{}", parent.id, department_prefix(*level), n);
                    let name = match level {
                        DepartmentLevel::Village => random_place_name(rng),
                        _ => format!("{} {} {}", random_place_name(rng), level.label(), n),
                    };
                    OptionItem::new(id, name)
                })
                .collect();
            next.extend(children.iter().cloned());
            options.by_parent[level.index() - 1].insert(parent.id.clone(), children);
        }
        parents = next;
    }
    options
}

fn random_entity(rng: &mut ChaCha8Rng, id: String, name: String) -> EntityPerformance {
    let coverage = rng.gen_range(35.0..100.0);
    let regularity = rng.gen_range(25.0..100.0);
    let continuity = rng.gen_range(2.0..24.0);
    let quantity = rng.gen_range(15.0..75.0);
    let score = composite_score(coverage, regularity, continuity, quantity);
    EntityPerformance {
        id,
        name,
        coverage,
        regularity,
        continuity,
        quantity,
        composite_score: score,
        status: PerformanceStatus::from_score(score),
    }
}

fn random_place_name(rng: &mut ChaCha8Rng) -> String {
    let stem = NAME_STEMS[rng.gen_range(0..NAME_STEMS.len())];
    let suffix = NAME_SUFFIXES[rng.gen_range(0..NAME_SUFFIXES.len())];
    format!("{stem}{suffix}")
}

fn random_person_name(rng: &mut ChaCha8Rng) -> String {
    const FIRST: [&str; 8] = ["Anil", "Sunita", "Ravi", "Meena", "Suresh", "Pooja", "Vikram", "Asha"];
    const LAST: [&str; 6] = ["Kumar", "Devi", "Singh", "Patel", "Naik", "Das"];
    format!(
        "{} {}",
        FIRST[rng.gen_range(0..FIRST.len())],
        LAST[rng.gen_range(0..LAST.len())]
    )
}

fn level_prefix(level: GeoLevel) -> &'static str {
    match level {
        GeoLevel::State => "S",
        GeoLevel::District => "D",
        GeoLevel::Block => "B",
        GeoLevel::GramPanchayat => "G",
        GeoLevel::Village => "V",
    }
}

fn department_prefix(level: DepartmentLevel) -> &'static str {
    match level {
        DepartmentLevel::State => "S",
        DepartmentLevel::Zone => "Z",
        DepartmentLevel::Circle => "C",
        DepartmentLevel::Division => "DV",
        DepartmentLevel::Subdivision => "SD",
        DepartmentLevel::Village => "V",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{decode_dashboard_data, load_dashboard};

    #[test]
    fn test_generation_is_deterministic() {
        let a = MockDataSource::new(7);
        let b = MockDataSource::new(7);
        assert_eq!(a.central_data(), b.central_data());
    }

    #[test]
    fn test_every_state_has_districts_down_to_villages() {
        let source = MockDataSource::default();
        let data = source.central_data();
        assert_eq!(data.map_data.len(), STATE_NAMES.len());
        for state in &data.map_data {
            let districts = data.hierarchy.districts_by_state.children(&state.id);
            assert!((3..=5).contains(&districts.len()));
            let district = &districts[0];
            let blocks = data.hierarchy.blocks_by_district.children(&district.id);
            assert!(!blocks.is_empty());
            let gps = data.hierarchy.gram_panchayats_by_block.children(&blocks[0].id);
            assert!(!gps.is_empty());
            let villages = data.hierarchy.villages_by_gram_panchayat.children(&gps[0].id);
            assert!(!villages.is_empty());
        }
    }

    #[test]
    fn test_central_fetch_decodes() {
        let source = MockDataSource::default();
        let data = load_dashboard(&source, DashboardLevel::Central, None).unwrap();
        assert_eq!(&data, source.central_data());
        assert_eq!(data.water_supply_outages.len(), data.map_data.len());
        assert_eq!(data.leading_pump_operators.as_ref().map(Vec::len), Some(5));
    }

    #[test]
    fn test_scoped_fetch_lists_children() {
        let source = MockDataSource::default();
        let raw = source.fetch(DashboardLevel::State, Some("S01")).unwrap();
        let data = decode_dashboard_data(raw).unwrap();
        let expected = source
            .central_data()
            .hierarchy
            .districts_by_state
            .children("S01");
        assert_eq!(data.map_data, expected);
        assert_eq!(data.base_level(), GeoLevel::District);
        assert_eq!(data.scope_path(), vec!["S01"]);
        assert_eq!(data.scope[0].name, STATE_NAMES[0]);
    }

    #[test]
    fn test_scoped_fetch_scope_stops_above_listed_level() {
        let source = MockDataSource::default();
        let h = &source.central_data().hierarchy;
        let village = &h.villages_by_gram_panchayat.children("S01-D01-B01-G01")[0];

        let raw = source.fetch(DashboardLevel::District, Some("S01-D01")).unwrap();
        let data = decode_dashboard_data(raw).unwrap();
        assert_eq!(data.base_level(), GeoLevel::Block);
        assert_eq!(data.scope_path(), vec!["S01", "S01-D01"]);

        let raw = source.fetch(DashboardLevel::Village, Some(&village.id)).unwrap();
        let data = decode_dashboard_data(raw).unwrap();
        assert_eq!(data.base_level(), GeoLevel::Village);
        assert_eq!(data.map_data, vec![village.clone()]);
        assert_eq!(data.scope.last().map(|o| o.id.as_str()), Some("S01-D01-B01-G01"));
    }

    #[test]
    fn test_scoped_fetch_without_id_fails() {
        let source = MockDataSource::default();
        let err = source.fetch(DashboardLevel::Block, None).unwrap_err();
        assert_eq!(err, DataSourceError::MissingEntityId(DashboardLevel::Block));
    }

    #[test]
    fn test_scoped_fetch_unknown_id_is_request_error() {
        let source = MockDataSource::default();
        let err = source.fetch(DashboardLevel::District, Some("nope")).unwrap_err();
        assert!(matches!(err, DataSourceError::Request(Some(_))));
    }

    #[test]
    fn test_department_options_cover_every_level() {
        let source = MockDataSource::default();
        let options = &source.central_data().department_options;
        let mut parent = options.roots[0].id.clone();
        for level in &DepartmentLevel::ALL[1..] {
            let children = options.options_for(*level, &parent);
            assert!(!children.is_empty(), "{level:?} under {parent}");
            parent = children[0].id.clone();
        }
    }

    #[test]
    fn test_statuses_match_scores() {
        let source = MockDataSource::default();
        for e in &source.central_data().map_data {
            assert_eq!(e.status, PerformanceStatus::from_score(e.composite_score));
        }
    }
}
