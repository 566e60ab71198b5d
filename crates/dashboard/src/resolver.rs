//! Hierarchy resolver.
//!
//! Translates a [`SelectionState`] into:
//! - which single [`DashboardScreen`] is active (deepest selected level wins),
//! - each selector's option list (children of its immediate parent),
//! - each selector's enablement (per-selector cascade plus the two-level
//!   "advanced filters" gate on state + district).

use bevy::prelude::*;

use crate::entity::{HierarchyOptions, OptionItem};
use crate::hierarchy::{DepartmentLevel, GeoLevel, GeoSelection, HierarchyLevel};
use crate::selection::{DateRange, FilterTab, SelectionState};

/// The screen rendered in the dashboard body. Exactly one is active.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DashboardScreen {
    /// All states/UTs.
    #[default]
    Central,
    State,
    District,
    Block,
    GramPanchayat,
    Village,
}

impl DashboardScreen {
    pub const ALL: [Self; 6] = [
        Self::Central,
        Self::State,
        Self::District,
        Self::Block,
        Self::GramPanchayat,
        Self::Village,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Central => "All States/UTs",
            Self::State => "State/UT",
            Self::District => "District",
            Self::Block => "Block",
            Self::GramPanchayat => "Gram Panchayat",
            Self::Village => "Village",
        }
    }
}

impl From<Option<GeoLevel>> for DashboardScreen {
    fn from(level: Option<GeoLevel>) -> Self {
        match level {
            None => Self::Central,
            Some(GeoLevel::State) => Self::State,
            Some(GeoLevel::District) => Self::District,
            Some(GeoLevel::Block) => Self::Block,
            Some(GeoLevel::GramPanchayat) => Self::GramPanchayat,
            Some(GeoLevel::Village) => Self::Village,
        }
    }
}

/// Strict precedence: village, gram panchayat, block, district, state, then
/// the central view.
pub fn resolve_screen(geo: &GeoSelection) -> DashboardScreen {
    DashboardScreen::from(geo.deepest_selected())
}

/// Per-level "is selected" flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelFlags {
    pub state: bool,
    pub district: bool,
    pub block: bool,
    pub gram_panchayat: bool,
    pub village: bool,
}

impl LevelFlags {
    pub fn from_geo(geo: &GeoSelection) -> Self {
        Self {
            state: geo.is_selected(GeoLevel::State),
            district: geo.is_selected(GeoLevel::District),
            block: geo.is_selected(GeoLevel::Block),
            gram_panchayat: geo.is_selected(GeoLevel::GramPanchayat),
            village: geo.is_selected(GeoLevel::Village),
        }
    }

    /// Scheme, advanced duration and the block/GP/village selectors unlock
    /// only once both state and district are chosen.
    pub fn advanced_filters_enabled(self) -> bool {
        self.state && self.district
    }
}

// =============================================================================
// Selector resolution
// =============================================================================

/// One drop-down: its level, current value, options and enablement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorView<L> {
    pub level: L,
    pub value: String,
    pub options: Vec<OptionItem>,
    pub enabled: bool,
}

/// Option catalogues the resolver reads from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorCatalog {
    pub geo: HierarchyOptions,
    /// Leading geographic levels fixed by the data scope; never editable.
    pub pinned_geo: usize,
    pub department: HierarchyOptions,
    pub schemes: Vec<OptionItem>,
    pub duration_presets: Vec<DateRange>,
}

/// Resolved state of every filter control.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSelectors {
    pub tab: FilterTab,
    pub geo: Vec<SelectorView<GeoLevel>>,
    pub department: Vec<SelectorView<DepartmentLevel>>,
    pub scheme_enabled: bool,
    pub scheme_options: Vec<OptionItem>,
    /// The advanced-panel date-range selector.
    pub duration_enabled: bool,
    pub duration_presets: Vec<DateRange>,
}

impl ResolvedSelectors {
    pub fn geo_selector(&self, level: GeoLevel) -> &SelectorView<GeoLevel> {
        &self.geo[level.index()]
    }

    pub fn department_selector(&self, level: DepartmentLevel) -> &SelectorView<DepartmentLevel> {
        &self.department[level.index()]
    }
}

pub fn resolve_selectors(selection: &SelectionState, catalog: &SelectorCatalog) -> ResolvedSelectors {
    let geo = selection.geo();
    let flags = LevelFlags::from_geo(geo);
    let advanced = flags.advanced_filters_enabled();

    let geo_selectors = GeoLevel::ALL
        .iter()
        .map(|&level| {
            let parent_value = level.parent().map_or("", |p| geo.get(p));
            let enabled = level.index() >= catalog.pinned_geo
                && match level {
                    GeoLevel::State | GeoLevel::District => true,
                    _ => advanced && level.parent().is_some_and(|p| geo.is_selected(p)),
                };
            SelectorView {
                level,
                value: geo.get(level).to_string(),
                options: catalog.geo.options_for(level, parent_value).to_vec(),
                enabled,
            }
        })
        .collect();

    let department = selection.department();
    let department_selectors = DepartmentLevel::ALL
        .iter()
        .map(|&level| {
            let parent_value = level.parent().map_or("", |p| department.get(p));
            SelectorView {
                level,
                value: department.get(level).to_string(),
                options: catalog.department.options_for(level, parent_value).to_vec(),
                enabled: level.parent().map_or(true, |p| department.is_selected(p)),
            }
        })
        .collect();

    ResolvedSelectors {
        tab: selection.active_tab(),
        geo: geo_selectors,
        department: department_selectors,
        scheme_enabled: advanced,
        scheme_options: catalog.schemes.clone(),
        duration_enabled: advanced,
        duration_presets: catalog.duration_presets.clone(),
    }
}
