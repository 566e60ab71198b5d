//! The dashboard's filter selection and its pure, cascade-aware setters.

use serde::{Deserialize, Serialize};

use crate::hierarchy::{DepartmentLevel, DepartmentSelection, GeoLevel, GeoSelection};

/// Which hierarchy's selectors the filter panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterTab {
    #[default]
    Geographic,
    Department,
}

impl FilterTab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Geographic => "Geographic",
            Self::Department => "Department",
        }
    }
}

/// Reporting window. Dates are ISO-8601 `YYYY-MM-DD` strings as supplied by
/// the data source; they are not parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            preset: None,
        }
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn display(&self) -> String {
        match &self.preset {
            Some(preset) => preset.clone(),
            None => format!("{} to {}", self.start_date, self.end_date),
        }
    }
}

/// Current value of every filter dimension.
///
/// Fields are private: the only way to change a selection is through the
/// `with_*` setters, which keep both hierarchies cascade-consistent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    geo: GeoSelection,
    scheme: String,
    duration: Option<DateRange>,
    department: DepartmentSelection,
    active_tab: FilterTab,
}

impl SelectionState {
    pub fn geo(&self) -> &GeoSelection {
        &self.geo
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn duration(&self) -> Option<&DateRange> {
        self.duration.as_ref()
    }

    pub fn department(&self) -> &DepartmentSelection {
        &self.department
    }

    pub fn active_tab(&self) -> FilterTab {
        self.active_tab
    }

    pub fn with_geo_level(mut self, level: GeoLevel, value: impl Into<String>) -> Self {
        self.geo.set(level, value);
        self
    }

    pub fn with_department_level(
        mut self,
        level: DepartmentLevel,
        value: impl Into<String>,
    ) -> Self {
        self.department.set(level, value);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_duration(mut self, duration: Option<DateRange>) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_active_tab(mut self, tab: FilterTab) -> Self {
        self.active_tab = tab;
        self
    }

    /// Overlays every field present in `partial` onto `self`.
    pub fn merged_with(mut self, partial: PartialSelection) -> Self {
        if let Some(geo) = partial.geo {
            self.geo = geo;
        }
        if let Some(scheme) = partial.scheme {
            self.scheme = scheme;
        }
        if let Some(duration) = partial.duration {
            self.duration = Some(duration);
        }
        if let Some(department) = partial.department {
            self.department = department;
        }
        if let Some(tab) = partial.active_tab {
            self.active_tab = tab;
        }
        self
    }
}

/// A selection with any subset of fields present, as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialSelection {
    pub geo: Option<GeoSelection>,
    pub scheme: Option<String>,
    pub duration: Option<DateRange>,
    pub department: Option<DepartmentSelection>,
    pub active_tab: Option<FilterTab>,
}

impl PartialSelection {
    pub fn is_empty(&self) -> bool {
        self.geo.is_none()
            && self.scheme.is_none()
            && self.duration.is_none()
            && self.department.is_none()
            && self.active_tab.is_none()
    }
}

impl From<&SelectionState> for PartialSelection {
    fn from(state: &SelectionState) -> Self {
        Self {
            geo: Some(state.geo.clone()),
            scheme: Some(state.scheme.clone()),
            duration: state.duration.clone(),
            department: Some(state.department.clone()),
            active_tab: Some(state.active_tab),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_is_empty() {
        let state = SelectionState::default();
        assert!(state.geo().is_empty());
        assert!(state.department().is_empty());
        assert_eq!(state.scheme(), "");
        assert!(state.duration().is_none());
        assert_eq!(state.active_tab(), FilterTab::Geographic);
    }

    #[test]
    fn test_geo_setter_cascades() {
        let state = SelectionState::default()
            .with_geo_level(GeoLevel::State, "A")
            .with_geo_level(GeoLevel::District, "B")
            .with_geo_level(GeoLevel::Block, "C")
            .with_geo_level(GeoLevel::District, "X");
        assert_eq!(state.geo().get(GeoLevel::State), "A");
        assert_eq!(state.geo().get(GeoLevel::District), "X");
        assert_eq!(state.geo().get(GeoLevel::Block), "");
        assert_eq!(state.geo().get(GeoLevel::GramPanchayat), "");
        assert_eq!(state.geo().get(GeoLevel::Village), "");
    }

    #[test]
    fn test_geo_and_department_are_independent() {
        let state = SelectionState::default()
            .with_department_level(DepartmentLevel::State, "S")
            .with_department_level(DepartmentLevel::Zone, "Z")
            .with_geo_level(GeoLevel::State, "");
        assert_eq!(state.department().get(DepartmentLevel::Zone), "Z");
    }

    #[test]
    fn test_unconstrained_setters_leave_geo_alone() {
        let state = SelectionState::default()
            .with_geo_level(GeoLevel::State, "A")
            .with_scheme("scheme-1")
            .with_duration(Some(DateRange::new("2024-04-01", "2025-03-31")))
            .with_active_tab(FilterTab::Department);
        assert_eq!(state.geo().get(GeoLevel::State), "A");
        assert_eq!(state.scheme(), "scheme-1");
        assert_eq!(state.active_tab(), FilterTab::Department);
        assert_eq!(state.duration().map(|d| d.start_date.as_str()), Some("2024-04-01"));
    }

    #[test]
    fn test_merge_partial_keeps_absent_fields() {
        let base = SelectionState::default().with_scheme("keep-me");
        let partial = PartialSelection {
            geo: Some(GeoSelection::from_values(["A", "B"])),
            ..Default::default()
        };
        let merged = base.merged_with(partial);
        assert_eq!(merged.scheme(), "keep-me");
        assert_eq!(merged.geo().get(GeoLevel::District), "B");
    }

    #[test]
    fn test_partial_from_state_round_trips_through_merge() {
        let state = SelectionState::default()
            .with_geo_level(GeoLevel::State, "A")
            .with_duration(Some(DateRange::new("a", "b").with_preset("FY")))
            .with_active_tab(FilterTab::Department);
        let partial = PartialSelection::from(&state);
        assert!(!partial.is_empty());
        assert_eq!(SelectionState::default().merged_with(partial), state);
    }

    #[test]
    fn test_date_range_display() {
        assert_eq!(DateRange::new("a", "b").display(), "a to b");
        assert_eq!(DateRange::new("a", "b").with_preset("Q1").display(), "Q1");
    }
}
