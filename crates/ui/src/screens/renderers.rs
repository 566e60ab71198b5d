//! One renderer per dashboard screen.

use bevy_egui::egui;

use dashboard::entity::EntityPerformance;
use dashboard::hierarchy::GeoLevel;
use dashboard::selection_store::SelectionAction;

use super::chart_handle::ChartKind;
use super::{ScreenContext, ScreenOutput};
use crate::{charts, panels, theme};

// =============================================================================
// Shared sections
// =============================================================================

/// Screen title, breadcrumb of the selected path and the "Up" button.
fn header(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    ui.horizontal(|ui| {
        ui.heading(ctx.screen().title());
        if ctx.view.can_go_up && ui.button("Up").clicked() {
            out.actions.push(SelectionAction::Up);
        }
    });
    let crumbs = breadcrumb(ctx);
    if !crumbs.is_empty() {
        ui.colored_label(theme::MUTED, crumbs.join(" / "));
    }
    ui.separator();
}

/// Display names of every selected geographic level, ancestor first. Ids
/// the catalogue does not know are shown as-is.
fn breadcrumb(ctx: &ScreenContext) -> Vec<String> {
    ctx.selection
        .geo()
        .iter()
        .filter(|(_, id)| !id.is_empty())
        .map(|(level, id)| {
            ctx.catalog
                .geo
                .name_of(level, id)
                .unwrap_or(id)
                .to_string()
        })
        .collect()
}

fn chart_section(
    ui: &mut egui::Ui,
    out: &mut ScreenOutput,
    kind: ChartKind,
    draw: impl FnOnce(&mut egui::Ui),
) {
    ui.add_space(6.0);
    ui.label(egui::RichText::new(kind.title()).strong());
    draw(ui);
    out.painted.push(kind);
}

fn entity_chart(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    let rows: Vec<(&str, f32, egui::Color32)> = ctx
        .view
        .entities
        .iter()
        .map(|e| (e.name.as_str(), e.composite_score, theme::status_color(e.status)))
        .collect();
    chart_section(ui, out, ChartKind::EntityPerformance, |ui| {
        ui.colored_label(theme::MUTED, ctx.view.label);
        let width = ui.available_width();
        charts::draw_bar_chart(ui, &rows, 100.0, width);
    });
}

fn outage_chart(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    chart_section(ui, out, ChartKind::OutageCauses, |ui| {
        let width = ui.available_width();
        charts::draw_outage_bars(ui, &ctx.view.outages, width);
        ui.horizontal_wrapped(|ui| {
            let causes = ctx.view.outages.first().map(|row| row.causes());
            for ((name, _), color) in causes.into_iter().flatten().zip(theme::OUTAGE_CAUSES) {
                charts::legend_item(ui, color, name);
            }
        });
    });
}

fn demand_supply(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    chart_section(ui, out, ChartKind::DemandSupply, |ui| {
        let width = ui.available_width();
        panels::demand_supply_chart(ui, &ctx.data.demand_supply, width);
    });
}

fn image_submissions(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    chart_section(ui, out, ChartKind::ImageSubmissions, |ui| {
        let width = ui.available_width();
        panels::image_submission_chart(ui, &ctx.data.image_submission_status, width);
    });
}

fn photo_evidence(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    chart_section(ui, out, ChartKind::PhotoEvidence, |ui| {
        let width = ui.available_width();
        panels::photo_evidence_chart(ui, &ctx.data.photo_evidence_compliance, width);
    });
}

fn performance_table(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    ui.add_space(6.0);
    let salt = format!("performance_{:?}", ctx.screen());
    if let Some(id) = panels::performance_table(ui, &salt, ctx.view.label, &ctx.view.table) {
        out.actions.push(SelectionAction::DrillInto(id));
    }
}

fn pump_operators(ui: &mut egui::Ui, ctx: &ScreenContext) {
    ui.add_space(6.0);
    ui.columns(2, |cols| {
        panels::pump_operator_table(
            &mut cols[0],
            "leading_operators",
            "Leading pump operators",
            ctx.data.leading_pump_operators.as_deref(),
        );
        panels::pump_operator_table(
            &mut cols[1],
            "bottom_operators",
            "Pump operators needing support",
            ctx.data.bottom_pump_operators.as_deref(),
        );
    });
}

// =============================================================================
// Screens
// =============================================================================

pub fn render_central(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    header(ui, ctx, out);
    panels::kpi_strip(ui, &ctx.view.summary, &ctx.data.pump_operators);
    entity_chart(ui, ctx, out);
    outage_chart(ui, ctx, out);
    demand_supply(ui, ctx, out);
    image_submissions(ui, ctx, out);
    photo_evidence(ui, ctx, out);
    performance_table(ui, ctx, out);
    pump_operators(ui, ctx);
}

/// Same sections as the central view, headed by the selected state's card.
pub fn render_state(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    header(ui, ctx, out);
    if let Some(state) = selected_entity(ctx, GeoLevel::State) {
        entity_detail(ui, state);
    }
    panels::kpi_strip(ui, &ctx.view.summary, &ctx.data.pump_operators);
    entity_chart(ui, ctx, out);
    outage_chart(ui, ctx, out);
    demand_supply(ui, ctx, out);
    image_submissions(ui, ctx, out);
    photo_evidence(ui, ctx, out);
    performance_table(ui, ctx, out);
    pump_operators(ui, ctx);
}

pub fn render_district(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    header(ui, ctx, out);
    panels::kpi_strip(ui, &ctx.view.summary, &ctx.data.pump_operators);
    entity_chart(ui, ctx, out);
    outage_chart(ui, ctx, out);
    demand_supply(ui, ctx, out);
    image_submissions(ui, ctx, out);
    performance_table(ui, ctx, out);
    pump_operators(ui, ctx);
}

pub fn render_block(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    header(ui, ctx, out);
    panels::kpi_strip(ui, &ctx.view.summary, &ctx.data.pump_operators);
    entity_chart(ui, ctx, out);
    outage_chart(ui, ctx, out);
    demand_supply(ui, ctx, out);
    image_submissions(ui, ctx, out);
    performance_table(ui, ctx, out);
}

pub fn render_gram_panchayat(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    header(ui, ctx, out);
    panels::kpi_strip(ui, &ctx.view.summary, &ctx.data.pump_operators);
    entity_chart(ui, ctx, out);
    outage_chart(ui, ctx, out);
    demand_supply(ui, ctx, out);
    performance_table(ui, ctx, out);
}

pub fn render_village(ui: &mut egui::Ui, ctx: &ScreenContext, out: &mut ScreenOutput) {
    header(ui, ctx, out);
    match selected_entity(ctx, GeoLevel::Village) {
        Some(village) => entity_detail(ui, village),
        None => {
            ui.colored_label(theme::MUTED, "No data for the selected village");
        }
    }
    entity_chart(ui, ctx, out);
    demand_supply(ui, ctx, out);
    performance_table(ui, ctx, out);
}

// =============================================================================
// Detail card
// =============================================================================

fn selected_entity<'a>(ctx: &ScreenContext<'a>, level: GeoLevel) -> Option<&'a EntityPerformance> {
    let id = ctx.selection.geo().get(level);
    ctx.view.entities.iter().find(|e| e.id == id)
}

fn entity_detail(ui: &mut egui::Ui, entity: &EntityPerformance) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.strong(&entity.name);
            ui.colored_label(theme::status_color(entity.status), entity.status.label());
        });
        egui::Grid::new(("entity_detail", entity.id.as_str()))
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("Coverage");
                ui.label(format!("{:.1}%", entity.coverage));
                ui.end_row();
                ui.label("Regularity");
                ui.label(format!("{:.1}%", entity.regularity));
                ui.end_row();
                ui.label("Continuity");
                ui.label(format!("{:.1} h/day", entity.continuity));
                ui.end_row();
                ui.label("Quantity");
                ui.label(format!("{:.0} LPCD", entity.quantity));
                ui.end_row();
                ui.label("Composite score");
                ui.label(format!("{:.1}", entity.composite_score));
                ui.end_row();
            });
    });
}
