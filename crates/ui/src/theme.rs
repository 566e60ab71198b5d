use bevy_egui::{egui, EguiContexts};

use dashboard::entity::PerformanceStatus;

pub const GOOD: egui::Color32 = egui::Color32::from_rgb(76, 175, 112);
pub const NEEDS_ATTENTION: egui::Color32 = egui::Color32::from_rgb(240, 180, 60);
pub const CRITICAL: egui::Color32 = egui::Color32::from_rgb(226, 84, 84);
pub const DEMAND: egui::Color32 = egui::Color32::from_rgb(220, 180, 80);
pub const SUPPLY: egui::Color32 = egui::Color32::from_rgb(80, 170, 230);
pub const MUTED: egui::Color32 = egui::Color32::from_gray(150);

/// One colour per outage cause, in `OutageRow::causes` order.
pub const OUTAGE_CAUSES: [egui::Color32; 5] = [
    egui::Color32::from_rgb(230, 120, 70),
    egui::Color32::from_rgb(90, 160, 220),
    egui::Color32::from_rgb(170, 110, 210),
    egui::Color32::from_rgb(120, 190, 120),
    egui::Color32::from_rgb(200, 170, 90),
];

pub fn status_color(status: PerformanceStatus) -> egui::Color32 {
    match status {
        PerformanceStatus::Good => GOOD,
        PerformanceStatus::NeedsAttention => NEEDS_ATTENTION,
        PerformanceStatus::Critical => CRITICAL,
    }
}

pub fn apply_dashboard_theme(mut contexts: EguiContexts) {
    let ctx = contexts.ctx_mut();
    let mut style = (*ctx.style()).clone();

    // Deep-water panels with a brighter blue accent
    let panel = egui::Color32::from_rgb(24, 36, 48);
    let inactive = egui::Color32::from_rgb(38, 54, 70);
    let hover = egui::Color32::from_rgb(52, 76, 98);
    let active = egui::Color32::from_rgb(64, 150, 210);

    style.visuals.widgets.noninteractive.bg_fill = panel;
    style.visuals.widgets.inactive.bg_fill = inactive;
    style.visuals.widgets.hovered.bg_fill = hover;
    style.visuals.widgets.active.bg_fill = active;
    style.visuals.widgets.inactive.weak_bg_fill = inactive;
    style.visuals.widgets.hovered.weak_bg_fill = hover;
    style.visuals.widgets.active.weak_bg_fill = active;

    style.visuals.window_fill = panel;
    style.visuals.panel_fill = panel;
    style.visuals.extreme_bg_color = egui::Color32::from_rgb(18, 26, 36);
    style.visuals.faint_bg_color = egui::Color32::from_rgb(30, 44, 58);

    style.visuals.selection.bg_fill = active;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, active);

    let widget_rounding = egui::CornerRadius::same(4);
    style.visuals.window_corner_radius = egui::CornerRadius::same(6);
    style.visuals.widgets.noninteractive.corner_radius = widget_rounding;
    style.visuals.widgets.inactive.corner_radius = widget_rounding;
    style.visuals.widgets.hovered.corner_radius = widget_rounding;
    style.visuals.widgets.active.corner_radius = widget_rounding;

    ctx.set_style(style);
}
