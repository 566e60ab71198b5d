//! Per-entity performance rows and the parent-keyed datasets that hold them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{
    GOOD_SCORE_THRESHOLD, LPCD_SERVICE_NORM, NEEDS_ATTENTION_SCORE_THRESHOLD,
};
use crate::hierarchy::{GeoLevel, HierarchyLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceStatus {
    Good,
    NeedsAttention,
    Critical,
}

impl PerformanceStatus {
    pub fn from_score(score: f32) -> Self {
        if score >= GOOD_SCORE_THRESHOLD {
            Self::Good
        } else if score >= NEEDS_ATTENTION_SCORE_THRESHOLD {
            Self::NeedsAttention
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::NeedsAttention => "Needs attention",
            Self::Critical => "Critical",
        }
    }
}

/// One administrative unit's service snapshot. Never mutated by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPerformance {
    pub id: String,
    pub name: String,
    /// Household tap coverage, percent.
    pub coverage: f32,
    /// Supply regularity, percent of scheduled days served.
    pub regularity: f32,
    /// Average hours of supply per day.
    pub continuity: f32,
    /// Litres per capita per day.
    pub quantity: f32,
    pub composite_score: f32,
    pub status: PerformanceStatus,
}

/// Mean of coverage, regularity, continuity (as a share of 24h) and quantity
/// (as a share of the LPCD norm), each capped at 100.
pub fn composite_score(coverage: f32, regularity: f32, continuity: f32, quantity: f32) -> f32 {
    let continuity_pct = (continuity / 24.0 * 100.0).clamp(0.0, 100.0);
    let quantity_pct = (quantity / LPCD_SERVICE_NORM * 100.0).clamp(0.0, 100.0);
    (coverage.clamp(0.0, 100.0) + regularity.clamp(0.0, 100.0) + continuity_pct + quantity_pct)
        / 4.0
}

/// Parent id → ordered children. A missing key means "no children".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelDataset(pub BTreeMap<String, Vec<EntityPerformance>>);

impl LevelDataset {
    pub fn children(&self, parent_id: &str) -> &[EntityPerformance] {
        if parent_id.is_empty() {
            return &[];
        }
        self.0.get(parent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insert(&mut self, parent_id: impl Into<String>, children: Vec<EntityPerformance>) {
        self.0.insert(parent_id.into(), children);
    }
}

/// One dataset per geographic transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelDatasets {
    pub districts_by_state: LevelDataset,
    pub blocks_by_district: LevelDataset,
    pub gram_panchayats_by_block: LevelDataset,
    pub villages_by_gram_panchayat: LevelDataset,
}

impl LevelDatasets {
    /// Dataset whose children are entities of `child` level. `None` for the
    /// top level, whose entities come from the base list.
    pub fn for_child_level(&self, child: GeoLevel) -> Option<&LevelDataset> {
        match child {
            GeoLevel::State => None,
            GeoLevel::District => Some(&self.districts_by_state),
            GeoLevel::Block => Some(&self.blocks_by_district),
            GeoLevel::GramPanchayat => Some(&self.gram_panchayats_by_block),
            GeoLevel::Village => Some(&self.villages_by_gram_panchayat),
        }
    }

    pub fn for_child_level_mut(&mut self, child: GeoLevel) -> Option<&mut LevelDataset> {
        match child {
            GeoLevel::State => None,
            GeoLevel::District => Some(&mut self.districts_by_state),
            GeoLevel::Block => Some(&mut self.blocks_by_district),
            GeoLevel::GramPanchayat => Some(&mut self.gram_panchayats_by_block),
            GeoLevel::Village => Some(&mut self.villages_by_gram_panchayat),
        }
    }
}

// =============================================================================
// Option catalogues
// =============================================================================

/// One entry in a selector's drop-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: String,
    pub name: String,
}

impl OptionItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&EntityPerformance> for OptionItem {
    fn from(entity: &EntityPerformance) -> Self {
        Self::new(entity.id.clone(), entity.name.clone())
    }
}

/// Selector options for a whole hierarchy.
///
/// `by_parent[i]` maps a parent id to the options of level `i + 1`, so each
/// transition has its own map and ids may repeat across levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HierarchyOptions {
    pub roots: Vec<OptionItem>,
    pub by_parent: Vec<BTreeMap<String, Vec<OptionItem>>>,
}

impl HierarchyOptions {
    /// Options for `level`, keyed by `parent_value` (ignored for the root).
    /// An empty parent never matches, even if the map has an `""` key.
    pub fn options_for<L: HierarchyLevel>(&self, level: L, parent_value: &str) -> &[OptionItem] {
        let index = level.index();
        if index == 0 {
            return &self.roots;
        }
        if parent_value.is_empty() {
            return &[];
        }
        self.by_parent
            .get(index - 1)
            .and_then(|map| map.get(parent_value))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Display name for `id` at `level`, searching every parent bucket.
    pub fn name_of<L: HierarchyLevel>(&self, level: L, id: &str) -> Option<&str> {
        let index = level.index();
        if index == 0 {
            return self.roots.iter().find(|o| o.id == id).map(|o| o.name.as_str());
        }
        self.by_parent.get(index - 1).and_then(|map| {
            map.values()
                .flatten()
                .find(|o| o.id == id)
                .map(|o| o.name.as_str())
        })
    }

    /// Geographic options derived from the base list and the datasets.
    ///
    /// `scope` is the ancestor path of `base`. When it is empty `base` holds
    /// the states; otherwise the only root is the scoped state and `base`
    /// becomes the children of the last scope entry.
    pub fn from_datasets(
        base: &[EntityPerformance],
        scope: &[OptionItem],
        datasets: &LevelDatasets,
    ) -> Self {
        let mut by_parent: Vec<BTreeMap<String, Vec<OptionItem>>> = GeoLevel::ALL
            .iter()
            .filter_map(|level| datasets.for_child_level(*level))
            .map(|dataset| {
                dataset
                    .0
                    .iter()
                    .map(|(parent, children)| {
                        (
                            parent.clone(),
                            children.iter().map(OptionItem::from).collect(),
                        )
                    })
                    .collect()
            })
            .collect();
        let base: Vec<OptionItem> = base.iter().map(OptionItem::from).collect();

        let Some(root) = scope.first() else {
            return Self {
                roots: base,
                by_parent,
            };
        };
        for (index, pair) in scope.windows(2).enumerate() {
            if let Some(bucket) = by_parent.get_mut(index) {
                let children = bucket.entry(pair[0].id.clone()).or_default();
                if !children.iter().any(|o| o.id == pair[1].id) {
                    children.push(pair[1].clone());
                }
            }
        }
        let parent = &scope[scope.len() - 1];
        if let Some(bucket) = by_parent.get_mut(scope.len() - 1) {
            bucket.insert(parent.id.clone(), base);
        }
        Self {
            roots: vec![root.clone()],
            by_parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::DepartmentLevel;

    fn entity(id: &str, score: f32) -> EntityPerformance {
        EntityPerformance {
            id: id.to_string(),
            name: format!("Name {id}"),
            coverage: score,
            regularity: score,
            continuity: 12.0,
            quantity: 40.0,
            composite_score: score,
            status: PerformanceStatus::from_score(score),
        }
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(PerformanceStatus::from_score(95.0), PerformanceStatus::Good);
        assert_eq!(PerformanceStatus::from_score(70.0), PerformanceStatus::Good);
        assert_eq!(
            PerformanceStatus::from_score(69.9),
            PerformanceStatus::NeedsAttention
        );
        assert_eq!(
            PerformanceStatus::from_score(40.0),
            PerformanceStatus::NeedsAttention
        );
        assert_eq!(PerformanceStatus::from_score(39.9), PerformanceStatus::Critical);
    }

    #[test]
    fn test_composite_score_caps_components() {
        let full = composite_score(100.0, 100.0, 24.0, 55.0);
        assert!((full - 100.0).abs() < 0.001, "got {full}");
        let over = composite_score(120.0, 100.0, 30.0, 200.0);
        assert!((over - 100.0).abs() < 0.001, "got {over}");
        let half = composite_score(50.0, 50.0, 12.0, 27.5);
        assert!((half - 50.0).abs() < 0.001, "got {half}");
    }

    #[test]
    fn test_missing_parent_degrades_to_empty() {
        let mut dataset = LevelDataset::default();
        dataset.insert("A", vec![entity("a1", 50.0)]);
        assert_eq!(dataset.children("A").len(), 1);
        assert!(dataset.children("stale-id").is_empty());
    }

    #[test]
    fn test_empty_parent_never_matches() {
        let mut dataset = LevelDataset::default();
        dataset.insert("", vec![entity("ghost", 50.0)]);
        assert!(dataset.children("").is_empty());

        let mut options = HierarchyOptions::default();
        options.by_parent.push(BTreeMap::from([(
            String::new(),
            vec![OptionItem::new("ghost", "Ghost")],
        )]));
        assert!(options.options_for(GeoLevel::District, "").is_empty());
    }

    #[test]
    fn test_status_serialises_kebab_case() {
        let json = serde_json::to_string(&PerformanceStatus::NeedsAttention).unwrap();
        assert_eq!(json, "\"needs-attention\"");
    }

    #[test]
    fn test_options_from_datasets() {
        let states = vec![entity("S1", 80.0), entity("S2", 30.0)];
        let mut datasets = LevelDatasets::default();
        datasets
            .districts_by_state
            .insert("S1", vec![entity("D1", 60.0), entity("D2", 20.0)]);
        datasets.blocks_by_district.insert("D1", vec![entity("B1", 50.0)]);

        let options = HierarchyOptions::from_datasets(&states, &[], &datasets);
        assert_eq!(options.options_for(GeoLevel::State, "").len(), 2);
        assert_eq!(options.options_for(GeoLevel::District, "S1").len(), 2);
        assert!(options.options_for(GeoLevel::District, "S2").is_empty());
        assert_eq!(options.options_for(GeoLevel::Block, "D1")[0].id, "B1");
        assert!(options.options_for(GeoLevel::Village, "anything").is_empty());
        assert_eq!(options.name_of(GeoLevel::Block, "B1"), Some("Name B1"));
        assert_eq!(options.name_of(GeoLevel::State, "S2"), Some("Name S2"));
    }

    #[test]
    fn test_scoped_options_root_at_the_scope() {
        let districts = vec![entity("D1", 60.0), entity("D2", 20.0)];
        let mut datasets = LevelDatasets::default();
        datasets.blocks_by_district.insert("D1", vec![entity("B1", 50.0)]);
        let scope = [OptionItem::new("S1", "Alpha")];

        let options = HierarchyOptions::from_datasets(&districts, &scope, &datasets);
        assert_eq!(options.options_for(GeoLevel::State, ""), &scope);
        let listed: Vec<&str> = options
            .options_for(GeoLevel::District, "S1")
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(listed, vec!["D1", "D2"]);
        assert_eq!(options.options_for(GeoLevel::Block, "D1")[0].id, "B1");
        assert_eq!(options.name_of(GeoLevel::State, "S1"), Some("Alpha"));
    }

    #[test]
    fn test_scoped_options_fill_missing_ancestors() {
        let blocks = vec![entity("B1", 50.0)];
        let scope = [OptionItem::new("S1", "Alpha"), OptionItem::new("D1", "Beta")];

        let options = HierarchyOptions::from_datasets(&blocks, &scope, &LevelDatasets::default());
        assert_eq!(options.options_for(GeoLevel::District, "S1"), &scope[1..]);
        assert_eq!(options.options_for(GeoLevel::Block, "D1")[0].id, "B1");
    }

    #[test]
    fn test_options_generic_over_department_levels() {
        let mut options = HierarchyOptions {
            roots: vec![OptionItem::new("S", "State")],
            by_parent: vec![BTreeMap::new()],
        };
        options.by_parent[0].insert("S".into(), vec![OptionItem::new("Z", "Zone")]);
        assert_eq!(options.options_for(DepartmentLevel::Zone, "S").len(), 1);
        assert!(options.options_for(DepartmentLevel::Circle, "Z").is_empty());
    }
}
