use std::sync::atomic::Ordering;

use serde_json::json;

use crate::config::{DashboardConfig, DashboardVariant};
use crate::data_load::FetchStrategy;
use crate::data_source::{DashboardLevel, DataSourceError};
use crate::hierarchy::GeoLevel;
use crate::mock_source::MockDataSource;
use crate::resolver::DashboardScreen;
use crate::selection_store::SelectionAction;
use crate::test_harness::{FlakySource, StaticSource, TestDashboard};

#[test]
fn test_failed_fetch_recovers_on_retry() {
    let (source, calls) = FlakySource::new(1);
    let mut dash = TestDashboard::with_source(source);

    let err = dash.assert_failed();
    assert_eq!(err.user_message(), "connection refused (attempt 1)");
    assert!(dash.derived().view().is_none());

    dash.retry();
    dash.assert_ready();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(dash.derived().view().is_some());
}

#[test]
fn test_retry_is_ignored_once_ready() {
    let (source, calls) = FlakySource::new(0);
    let mut dash = TestDashboard::with_source(source);
    dash.assert_ready();

    dash.retry();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_incomplete_document_is_invalid_data() {
    let mut dash = TestDashboard::with_source(StaticSource(json!({ "mapData": [] })));
    let err = dash.assert_failed();
    assert!(err.is_invalid_data());

    // Selection still works without data; only the view is missing.
    dash.select_geo(GeoLevel::State, "S01");
    dash.assert_screen(DashboardScreen::State);
    assert!(dash.derived().view().is_none());
}

#[test]
fn test_scoped_variant_without_entity_id_fails() {
    let dash = TestDashboard::setup(|app| {
        app.insert_resource(DashboardConfig {
            variant: DashboardVariant::State,
            entity_id: None,
        });
    });
    assert_eq!(
        dash.assert_failed(),
        DataSourceError::MissingEntityId(DashboardLevel::State)
    );
}

#[test]
fn test_scoped_variant_lists_children_of_its_entity() {
    let mut dash = TestDashboard::setup(|app| {
        app.insert_resource(DashboardConfig::scoped(DashboardVariant::State, "S03"));
    });
    dash.update(1);
    dash.assert_ready();
    dash.assert_screen(DashboardScreen::State);
    assert_eq!(dash.selection().geo().get(GeoLevel::State), "S03");

    let view = dash.derived().view().unwrap();
    assert_eq!(view.label, "Districts");
    assert!(!view.entities.is_empty());
    assert!(view.entities.iter().all(|e| e.id.starts_with("S03-D")));
    assert!(!view.can_go_up);

    let selectors = dash.derived().selectors().unwrap();
    let state = selectors.geo_selector(GeoLevel::State);
    let roots: Vec<&str> = state.options.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(roots, vec!["S03"]);
    assert!(!state.enabled);
    let districts = &selectors.geo_selector(GeoLevel::District).options;
    assert_eq!(districts.len(), view.entities.len());
}

#[test]
fn test_scoped_variant_drills_below_its_entity() {
    let mut dash = TestDashboard::setup(|app| {
        app.insert_resource(DashboardConfig::scoped(DashboardVariant::State, "S03"));
    });
    dash.update(1);
    let district = dash.listed_id(0);

    dash.act(SelectionAction::DrillInto(district.clone()));
    dash.assert_screen(DashboardScreen::District);
    assert_eq!(dash.selection().geo().get(GeoLevel::State), "S03");
    assert_eq!(dash.selection().geo().get(GeoLevel::District), district);
    assert_eq!(dash.derived().view().unwrap().label, "Districts");

    dash.select_geo(GeoLevel::State, "S01");
    assert_eq!(dash.selection().geo().values(), &["S03", "", "", "", ""]);
    dash.assert_screen(DashboardScreen::State);

    dash.act(SelectionAction::Up).clear_all();
    dash.assert_screen(DashboardScreen::State);
    assert_eq!(dash.selection().geo().get(GeoLevel::State), "S03");
}

#[test]
fn test_district_variant_lists_blocks() {
    let mut dash = TestDashboard::setup(|app| {
        app.insert_resource(DashboardConfig::scoped(DashboardVariant::District, "S02-D01"));
    });
    dash.update(1);
    dash.assert_screen(DashboardScreen::District);
    assert_eq!(dash.selection().geo().values(), &["S02", "S02-D01", "", "", ""]);

    let view = dash.derived().view().unwrap();
    assert_eq!(view.label, "Blocks");
    assert!(view.entities.iter().all(|e| e.id.starts_with("S02-D01-B")));
    let selectors = dash.derived().selectors().unwrap();
    assert!(selectors.geo_selector(GeoLevel::Block).enabled);
    assert!(!selectors.geo_selector(GeoLevel::District).enabled);
}

#[test]
fn test_background_fetch_completes() {
    let mut dash = TestDashboard::setup(|app| {
        app.insert_resource(FetchStrategy::Background);
    });
    assert!(dash.run_until_loaded(200), "fetch never completed");
    dash.assert_ready();

    let expected = MockDataSource::default().central_data().map_data.len();
    assert_eq!(dash.derived().view().unwrap().entities.len(), expected);
}
