//! Ordered administrative hierarchies.
//!
//! Both filter hierarchies (geographic and departmental) share one shape: an
//! ordered list of levels where each level holds a string id or is empty.
//! [`OrderedHierarchy`] stores the values and enforces the cascade rule:
//! when level *i* changes, every level deeper than *i* is cleared.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A level in an ordered hierarchy.
///
/// `ALL` lists the levels ancestor-first; `index()` must match the position
/// of the level in `ALL`.
pub trait HierarchyLevel: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn index(self) -> usize;

    /// Stable key used in the persisted JSON blob.
    fn key(self) -> &'static str;

    /// Singular display label ("District").
    fn label(self) -> &'static str;

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.key() == key)
    }

    fn parent(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    fn child(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }
}

// =============================================================================
// Geographic hierarchy
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeoLevel {
    State,
    District,
    Block,
    GramPanchayat,
    Village,
}

impl GeoLevel {
    /// Plural axis/table label used when listing entities of this level.
    pub fn plural_label(self) -> &'static str {
        match self {
            Self::State => "States/UTs",
            Self::District => "Districts",
            Self::Block => "Blocks",
            Self::GramPanchayat => "Gram Panchayats",
            Self::Village => "Villages",
        }
    }
}

impl HierarchyLevel for GeoLevel {
    const ALL: &'static [Self] = &[
        Self::State,
        Self::District,
        Self::Block,
        Self::GramPanchayat,
        Self::Village,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn key(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::District => "district",
            Self::Block => "block",
            Self::GramPanchayat => "gramPanchayat",
            Self::Village => "village",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::State => "State/UT",
            Self::District => "District",
            Self::Block => "Block",
            Self::GramPanchayat => "Gram Panchayat",
            Self::Village => "Village",
        }
    }
}

// =============================================================================
// Department hierarchy
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DepartmentLevel {
    State,
    Zone,
    Circle,
    Division,
    Subdivision,
    Village,
}

impl HierarchyLevel for DepartmentLevel {
    const ALL: &'static [Self] = &[
        Self::State,
        Self::Zone,
        Self::Circle,
        Self::Division,
        Self::Subdivision,
        Self::Village,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn key(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Zone => "zone",
            Self::Circle => "circle",
            Self::Division => "division",
            Self::Subdivision => "subdivision",
            Self::Village => "village",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::State => "State/UT",
            Self::Zone => "Zone",
            Self::Circle => "Circle",
            Self::Division => "Division",
            Self::Subdivision => "Subdivision",
            Self::Village => "Village",
        }
    }
}

// =============================================================================
// Cascade helper
// =============================================================================

/// Sets `values[index] = value` and clears every later index.
///
/// Out-of-range indices are ignored. A write under an unselected ancestor
/// only clears `index` and deeper.
pub fn set_level(values: &mut [String], index: usize, value: impl Into<String>) {
    if index >= values.len() {
        return;
    }
    values[index] = if values[..index].iter().any(String::is_empty) {
        String::new()
    } else {
        value.into()
    };
    for deeper in values.iter_mut().skip(index + 1) {
        deeper.clear();
    }
}

// =============================================================================
// OrderedHierarchy
// =============================================================================

/// Selected ids for every level of hierarchy `L`, ancestor-first.
///
/// Invariant: once a level is empty, every deeper level is empty too.
pub struct OrderedHierarchy<L: HierarchyLevel> {
    values: Vec<String>,
    _levels: PhantomData<L>,
}

impl<L: HierarchyLevel> OrderedHierarchy<L> {
    pub fn new() -> Self {
        Self {
            values: vec![String::new(); L::ALL.len()],
            _levels: PhantomData,
        }
    }

    /// Builds a hierarchy from ancestor-first values.
    ///
    /// Missing trailing values are treated as empty and extra values are
    /// dropped. Everything after the first empty level is cleared so stale
    /// or hand-edited input cannot break the cascade invariant.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut hierarchy = Self::new();
        for (slot, value) in hierarchy.values.iter_mut().zip(values) {
            *slot = value.into();
        }
        if let Some(first_empty) = hierarchy.values.iter().position(String::is_empty) {
            for deeper in hierarchy.values.iter_mut().skip(first_empty) {
                deeper.clear();
            }
        }
        hierarchy
    }

    pub fn get(&self, level: L) -> &str {
        &self.values[level.index()]
    }

    pub fn is_selected(&self, level: L) -> bool {
        !self.values[level.index()].is_empty()
    }

    /// Cascade-aware setter: deeper levels are always cleared.
    pub fn set(&mut self, level: L, value: impl Into<String>) {
        set_level(&mut self.values, level.index(), value);
    }

    /// Returns a copy with `level` set and every deeper level cleared.
    pub fn with(mut self, level: L, value: impl Into<String>) -> Self {
        self.set(level, value);
        self
    }

    /// Deepest level with a non-empty value.
    pub fn deepest_selected(&self) -> Option<L> {
        L::ALL
            .iter()
            .rev()
            .copied()
            .find(|level| self.is_selected(*level))
    }

    /// Level whose entities are listed over a base list at `base`: the
    /// deepest selected level, or `base` when nothing below it is selected.
    pub fn listed_level(&self, base: L) -> L {
        self.deepest_selected()
            .filter(|level| level.index() > base.index())
            .unwrap_or(base)
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    /// `(level, value)` pairs ancestor-first, including empty levels.
    pub fn iter(&self) -> impl Iterator<Item = (L, &str)> + '_ {
        L::ALL
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl<L: HierarchyLevel> Default for OrderedHierarchy<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: HierarchyLevel> Clone for OrderedHierarchy<L> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            _levels: PhantomData,
        }
    }
}

impl<L: HierarchyLevel> PartialEq for OrderedHierarchy<L> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<L: HierarchyLevel> Eq for OrderedHierarchy<L> {}

impl<L: HierarchyLevel> fmt::Debug for OrderedHierarchy<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (level, value) in self.iter() {
            map.entry(&level.key(), &value);
        }
        map.finish()
    }
}

pub type GeoSelection = OrderedHierarchy<GeoLevel>;
pub type DepartmentSelection = OrderedHierarchy<DepartmentLevel>;

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(values: &[&str]) -> GeoSelection {
        GeoSelection::from_values(values.iter().copied())
    }

    #[test]
    fn test_set_level_clears_deeper_indices() {
        let mut values = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        set_level(&mut values, 1, "X");
        assert_eq!(values, vec!["A", "X", ""]);
    }

    #[test]
    fn test_set_level_out_of_range_is_ignored() {
        let mut values = vec!["A".to_string()];
        set_level(&mut values, 3, "X");
        assert_eq!(values, vec!["A"]);
    }

    #[test]
    fn test_set_level_under_empty_ancestor_is_dropped() {
        let mut values = vec!["A".to_string(), String::new(), String::new()];
        set_level(&mut values, 2, "X");
        assert_eq!(values, vec!["A", "", ""]);
    }

    #[test]
    fn test_block_without_state_and_district_stays_central() {
        let selection = GeoSelection::new().with(GeoLevel::Block, "S01-D01-B01");
        assert!(selection.is_empty());
        assert_eq!(selection.deepest_selected(), None);

        let selection = geo(&["S01"]).with(GeoLevel::Block, "S01-D01-B01");
        assert_eq!(selection.values(), &["S01", "", "", "", ""]);
    }

    #[test]
    fn test_cascade_from_district() {
        let selection = geo(&["A", "B", "C"]).with(GeoLevel::District, "X");
        assert_eq!(selection.get(GeoLevel::State), "A");
        assert_eq!(selection.get(GeoLevel::District), "X");
        assert_eq!(selection.get(GeoLevel::Block), "");
        assert_eq!(selection.get(GeoLevel::GramPanchayat), "");
        assert_eq!(selection.get(GeoLevel::Village), "");
    }

    #[test]
    fn test_cascade_invariant_holds_for_every_level() {
        let full = geo(&["s", "d", "b", "g", "v"]);
        for &level in GeoLevel::ALL {
            for value in ["", "new"] {
                let next = full.clone().with(level, value);
                for &deeper in &GeoLevel::ALL[level.index() + 1..] {
                    assert!(
                        !next.is_selected(deeper),
                        "setting {:?} to {:?} left {:?} selected",
                        level,
                        value,
                        deeper
                    );
                }
                assert_eq!(next.get(level), value);
            }
        }
    }

    #[test]
    fn test_clearing_a_level_clears_descendants() {
        let selection = geo(&["s", "d", "b"]).with(GeoLevel::State, "");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_from_values_normalises_gaps() {
        let selection = geo(&["", "orphan-district", "orphan-block"]);
        assert!(selection.is_empty());

        let selection = geo(&["s", "", "b"]);
        assert_eq!(selection.get(GeoLevel::State), "s");
        assert!(!selection.is_selected(GeoLevel::Block));
    }

    #[test]
    fn test_deepest_selected() {
        assert_eq!(GeoSelection::new().deepest_selected(), None);
        assert_eq!(geo(&["s"]).deepest_selected(), Some(GeoLevel::State));
        assert_eq!(
            geo(&["s", "d", "b", "g"]).deepest_selected(),
            Some(GeoLevel::GramPanchayat)
        );
    }

    #[test]
    fn test_listed_level_never_above_base() {
        assert_eq!(GeoSelection::new().listed_level(GeoLevel::State), GeoLevel::State);
        assert_eq!(geo(&["s"]).listed_level(GeoLevel::District), GeoLevel::District);
        assert_eq!(geo(&["s", "d"]).listed_level(GeoLevel::District), GeoLevel::District);
        assert_eq!(geo(&["s", "d", "b"]).listed_level(GeoLevel::District), GeoLevel::Block);
    }

    #[test]
    fn test_department_hierarchy_cascades_independently() {
        let dept = DepartmentSelection::from_values(["s", "z", "c", "d"])
            .with(DepartmentLevel::Zone, "z2");
        assert_eq!(dept.get(DepartmentLevel::Zone), "z2");
        assert!(!dept.is_selected(DepartmentLevel::Circle));
        assert!(!dept.is_selected(DepartmentLevel::Division));
    }

    #[test]
    fn test_level_navigation() {
        assert_eq!(GeoLevel::State.parent(), None);
        assert_eq!(GeoLevel::Block.parent(), Some(GeoLevel::District));
        assert_eq!(GeoLevel::Village.child(), None);
        assert_eq!(
            DepartmentLevel::Circle.child(),
            Some(DepartmentLevel::Division)
        );
        assert_eq!(GeoLevel::from_key("gramPanchayat"), Some(GeoLevel::GramPanchayat));
        assert_eq!(GeoLevel::from_key("nope"), None);
    }
}
