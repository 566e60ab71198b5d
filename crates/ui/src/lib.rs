use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use dashboard::DashboardSet;

pub mod charts;
pub mod filter_panel;
pub mod panels;
pub mod screens;
pub mod theme;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .add_plugins(screens::chart_handle::ScreenLifecyclePlugin)
            .init_resource::<filter_panel::CustomRangeDraft>()
            .add_systems(Startup, theme::apply_dashboard_theme)
            .add_systems(
                Update,
                (filter_panel::filter_panel_ui, screens::dashboard_body_ui)
                    .chain()
                    .after(DashboardSet::Resolve),
            );
    }
}
