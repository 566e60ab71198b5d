//! Full-body loading and error states shown instead of a screen.

use bevy_egui::egui;

use dashboard::data_source::DataSourceError;

use crate::theme;

pub fn loading_overlay(ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.spinner();
            ui.label("Loading dashboard data...");
        });
    });
}

pub fn error_title(err: &DataSourceError) -> &'static str {
    if err.is_invalid_data() {
        "Invalid dashboard data"
    } else {
        "Dashboard unavailable"
    }
}

/// Returns `true` when "Retry" was clicked.
pub fn error_overlay(ctx: &egui::Context, err: &DataSourceError) -> bool {
    let mut retry = false;
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.label(
                egui::RichText::new(error_title(err))
                    .size(20.0)
                    .color(theme::CRITICAL),
            );
            ui.add_space(8.0);
            ui.label(err.user_message());
            ui.add_space(12.0);
            retry = ui.button("Retry").clicked();
        });
    });
    retry
}
