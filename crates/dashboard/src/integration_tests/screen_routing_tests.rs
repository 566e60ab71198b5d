use bevy::prelude::*;

use crate::hierarchy::GeoLevel;
use crate::resolver::DashboardScreen;
use crate::selection_store::SelectionAction;
use crate::test_harness::TestDashboard;

const STATE: &str = "S01";
const DISTRICT: &str = "S01-D01";
const BLOCK: &str = "S01-D01-B01";
const GRAM_PANCHAYAT: &str = "S01-D01-B01-G01";
const VILLAGE: &str = "S01-D01-B01-G01-V01";

fn drilled_to_village() -> TestDashboard {
    let mut dash = TestDashboard::new();
    dash.select_geo(GeoLevel::State, STATE)
        .select_geo(GeoLevel::District, DISTRICT)
        .select_geo(GeoLevel::Block, BLOCK)
        .select_geo(GeoLevel::GramPanchayat, GRAM_PANCHAYAT)
        .select_geo(GeoLevel::Village, VILLAGE);
    dash
}

#[test]
fn test_mount_shows_central_screen_with_states() {
    let dash = TestDashboard::new();
    dash.assert_ready();
    dash.assert_screen(DashboardScreen::Central);

    let view = dash.derived().view().unwrap();
    assert_eq!(view.label, "States/UTs");
    assert_eq!(view.entities.len(), 8);
    assert_eq!(view.outages.len(), view.entities.len());
}

#[test]
fn test_each_level_routes_to_its_screen() {
    let mut dash = TestDashboard::new();
    let steps = [
        (GeoLevel::State, STATE, DashboardScreen::State),
        (GeoLevel::District, DISTRICT, DashboardScreen::District),
        (GeoLevel::Block, BLOCK, DashboardScreen::Block),
        (GeoLevel::GramPanchayat, GRAM_PANCHAYAT, DashboardScreen::GramPanchayat),
        (GeoLevel::Village, VILLAGE, DashboardScreen::Village),
    ];
    for (level, id, screen) in steps {
        dash.select_geo(level, id);
        dash.assert_screen(screen);
    }
}

#[test]
fn test_reselecting_state_clears_deeper_levels() {
    let mut dash = drilled_to_village();
    dash.select_geo(GeoLevel::State, "S02");

    dash.assert_screen(DashboardScreen::State);
    assert_eq!(dash.selection().geo().get(GeoLevel::State), "S02");
    assert!(!dash.selection().geo().is_selected(GeoLevel::District));
    assert!(!dash.selection().geo().is_selected(GeoLevel::Village));
}

#[test]
fn test_clear_all_returns_to_central_in_one_change() {
    let mut dash = drilled_to_village();
    let before = dash.store().revision();

    dash.clear_all();

    dash.assert_screen(DashboardScreen::Central);
    assert_eq!(dash.store().revision(), before + 1);
    assert!(dash.selection().geo().is_empty());
}

#[test]
fn test_drill_into_and_up() {
    let mut dash = TestDashboard::new();
    dash.select_geo(GeoLevel::State, STATE)
        .select_geo(GeoLevel::District, DISTRICT);

    let sibling = dash.listed_id(1);
    dash.act(SelectionAction::DrillInto(sibling.clone()));
    dash.assert_screen(DashboardScreen::District);
    assert_eq!(dash.selection().geo().get(GeoLevel::District), sibling);

    dash.act(SelectionAction::Up);
    dash.assert_screen(DashboardScreen::State);

    dash.act(SelectionAction::Up);
    dash.assert_screen(DashboardScreen::Central);

    // Nothing left to clear.
    let revision = dash.store().revision();
    dash.act(SelectionAction::Up);
    assert_eq!(dash.store().revision(), revision);
}

#[test]
fn test_advanced_selectors_unlock_with_state_and_district() {
    let mut dash = TestDashboard::new();
    let selectors = dash.derived().selectors().unwrap();
    assert!(!selectors.scheme_enabled);
    assert!(!selectors.geo_selector(GeoLevel::Block).enabled);

    dash.select_geo(GeoLevel::State, STATE);
    let selectors = dash.derived().selectors().unwrap();
    assert!(!selectors.scheme_enabled);
    assert!(!selectors.geo_selector(GeoLevel::District).options.is_empty());

    dash.select_geo(GeoLevel::District, DISTRICT);
    let selectors = dash.derived().selectors().unwrap();
    assert!(selectors.scheme_enabled);
    assert!(selectors.duration_enabled);
    assert!(selectors.geo_selector(GeoLevel::Block).enabled);
    assert!(!selectors.geo_selector(GeoLevel::GramPanchayat).enabled);
    assert!(!selectors.geo_selector(GeoLevel::Block).options.is_empty());
}

#[test]
fn test_block_screen_lists_sibling_blocks() {
    let mut dash = TestDashboard::new();
    dash.select_geo(GeoLevel::State, STATE)
        .select_geo(GeoLevel::District, DISTRICT)
        .select_geo(GeoLevel::Block, BLOCK);

    let view = dash.derived().view().unwrap();
    assert_eq!(view.label, "Blocks");
    assert!(view.entities.iter().any(|e| e.id == BLOCK));
    assert!(view.entities.iter().all(|e| e.id.starts_with(DISTRICT)));
}

#[test]
fn test_stale_selection_renders_empty_list() {
    let mut dash = TestDashboard::new();
    dash.select_geo(GeoLevel::State, "no-such-state")
        .select_geo(GeoLevel::District, "no-such-district");

    dash.assert_screen(DashboardScreen::District);
    let view = dash.derived().view().unwrap();
    assert!(view.entities.is_empty());
    assert!(view.table.is_empty());
}

#[test]
fn test_deep_level_without_ancestors_keeps_central_screen() {
    let mut dash = TestDashboard::new();
    dash.select_geo(GeoLevel::Block, BLOCK);

    dash.assert_screen(DashboardScreen::Central);
    assert!(dash.selection().geo().is_empty());
    assert_eq!(dash.derived().view().unwrap().label, "States/UTs");
}

#[derive(Component)]
struct ScreenMarker;

#[test]
fn test_screen_scoped_entities_are_released_on_exit() {
    let mut dash = TestDashboard::new();
    dash.world_mut()
        .spawn((ScreenMarker, StateScoped(DashboardScreen::Central)));

    dash.select_geo(GeoLevel::State, STATE);

    let world = dash.world_mut();
    let remaining = world
        .query_filtered::<Entity, With<ScreenMarker>>()
        .iter(world)
        .count();
    assert_eq!(remaining, 0);
}
