//! Tables and summary widgets shared by the screen renderers.

use bevy_egui::egui;

use dashboard::data_source::{
    DemandSupplyPoint, ImageSubmissionStatus, PhotoEvidenceRow, PumpOperatorPerformance,
    PumpOperatorSummary,
};
use dashboard::projector::{KpiSummary, PerformanceRow};

use crate::charts;
use crate::theme;

pub fn kpi_strip(ui: &mut egui::Ui, summary: &KpiSummary, operators: &PumpOperatorSummary) {
    ui.horizontal_wrapped(|ui| {
        kpi(ui, "Coverage", format!("{:.1}%", summary.avg_coverage));
        kpi(ui, "Regularity", format!("{:.1}%", summary.avg_regularity));
        kpi(ui, "Continuity", format!("{:.1} h/day", summary.avg_continuity));
        kpi(ui, "Quantity", format!("{:.0} LPCD", summary.avg_quantity));
        kpi(
            ui,
            "Pump operators",
            format!("{} ({} active)", operators.total, operators.active),
        );
    });
    ui.horizontal(|ui| {
        ui.colored_label(theme::GOOD, format!("Good: {}", summary.good));
        ui.colored_label(
            theme::NEEDS_ATTENTION,
            format!("Needs attention: {}", summary.needs_attention),
        );
        ui.colored_label(theme::CRITICAL, format!("Critical: {}", summary.critical));
    });
}

fn kpi(ui: &mut egui::Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.vertical(|ui| {
            ui.small(label);
            ui.strong(value);
        });
    });
}

/// Ranked performance table. Returns the id of a clicked row.
pub fn performance_table(
    ui: &mut egui::Ui,
    id_salt: &str,
    label: &str,
    rows: &[PerformanceRow],
) -> Option<String> {
    if rows.is_empty() {
        ui.colored_label(theme::MUTED, format!("No {label} to show"));
        return None;
    }

    let mut clicked = None;
    egui::Grid::new(id_salt)
        .num_columns(7)
        .striped(true)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.strong("#");
            ui.strong(label);
            ui.strong("Coverage");
            ui.strong("Regularity");
            ui.strong("Hours");
            ui.strong("LPCD");
            ui.strong("Score");
            ui.end_row();

            for row in rows {
                let e = &row.entity;
                ui.label(row.rank.to_string());
                if ui.link(&e.name).on_hover_text("Drill into").clicked() {
                    clicked = Some(e.id.clone());
                }
                ui.label(format!("{:.1}%", e.coverage));
                ui.label(format!("{:.1}%", e.regularity));
                ui.label(format!("{:.1}", e.continuity));
                ui.label(format!("{:.0}", e.quantity));
                ui.colored_label(
                    theme::status_color(e.status),
                    format!("{:.1} {}", e.composite_score, e.status.label()),
                );
                ui.end_row();
            }
        });
    clicked
}

pub fn pump_operator_table(
    ui: &mut egui::Ui,
    id_salt: &str,
    title: &str,
    operators: Option<&[PumpOperatorPerformance]>,
) {
    let Some(operators) = operators.filter(|ops| !ops.is_empty()) else {
        return;
    };
    ui.label(egui::RichText::new(title).strong());
    egui::Grid::new(id_salt)
        .num_columns(4)
        .striped(true)
        .show(ui, |ui| {
            ui.strong("Operator");
            ui.strong("Village");
            ui.strong("Reporting");
            ui.strong("Photos");
            ui.end_row();
            for op in operators {
                ui.label(&op.name);
                ui.label(&op.village);
                ui.label(format!("{:.0}%", op.reporting_rate));
                ui.label(format!("{:.0}%", op.photo_compliance));
                ui.end_row();
            }
        });
}

pub fn demand_supply_chart(ui: &mut egui::Ui, points: &[DemandSupplyPoint], width: f32) {
    let demand: Vec<f32> = points.iter().map(|p| p.demand).collect();
    let supply: Vec<f32> = points.iter().map(|p| p.supply).collect();
    charts::draw_multi_line_chart(
        ui,
        &[
            (demand.as_slice(), theme::DEMAND, "Demand"),
            (supply.as_slice(), theme::SUPPLY, "Supply"),
        ],
        width,
        140.0,
    );
    ui.horizontal(|ui| {
        charts::legend_item(ui, theme::DEMAND, "Demand");
        charts::legend_item(ui, theme::SUPPLY, "Supply");
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            ui.colored_label(theme::MUTED, format!("{} to {}", first.period, last.period));
        }
    });
}

pub fn image_submission_chart(ui: &mut egui::Ui, status: &ImageSubmissionStatus, width: f32) {
    let parts = [
        ("Compliant", status.compliant, theme::GOOD),
        ("Anomalous", status.anomalous, theme::CRITICAL),
        ("Pending", status.pending, theme::MUTED),
    ];
    charts::draw_share_bar(ui, &parts, width);
    ui.horizontal(|ui| {
        for (label, n, color) in parts {
            charts::legend_item(ui, color, &format!("{label}: {n}"));
        }
    });
}

pub fn photo_evidence_chart(ui: &mut egui::Ui, rows: &[PhotoEvidenceRow], width: f32) {
    let bars: Vec<(&str, f32, egui::Color32)> = rows
        .iter()
        .map(|r| (r.name.as_str(), compliance_percent(r), theme::GOOD))
        .collect();
    charts::draw_bar_chart(ui, &bars, 100.0, width);
}

/// Share of compliant photos, 0 when nothing was submitted.
pub fn compliance_percent(row: &PhotoEvidenceRow) -> f32 {
    let total = row.compliant + row.non_compliant;
    if total == 0 {
        0.0
    } else {
        row.compliant as f32 / total as f32 * 100.0
    }
}
