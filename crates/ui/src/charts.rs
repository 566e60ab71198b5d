//! Chart drawing on the egui painter: horizontal bars, stacked bars for
//! outage causes, a multi-line series chart and legend items.

use bevy_egui::egui;

use dashboard::projector::OutageRow;

use crate::theme;

const BACKGROUND: egui::Color32 = egui::Color32::from_gray(30);
const ROW_HEIGHT: f32 = 18.0;
const NAME_WIDTH: f32 = 140.0;

/// Rows never exceed this many; the caller's table shows the rest.
pub const MAX_BAR_ROWS: usize = 20;

fn chart_frame(ui: &mut egui::Ui, width: f32, height: f32) -> (egui::Rect, egui::Painter) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 2.0, BACKGROUND);
    (rect, painter)
}

fn no_data(painter: &egui::Painter, rect: egui::Rect) {
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "No data for this selection",
        egui::FontId::proportional(13.0),
        theme::MUTED,
    );
}

fn row_label(painter: &egui::Painter, rect: egui::Rect, y: f32, name: &str) {
    painter.text(
        egui::pos2(rect.min.x + 4.0, y + ROW_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        name,
        egui::FontId::proportional(11.0),
        egui::Color32::from_gray(210),
    );
}

/// One horizontal bar per `(name, value, colour)`, scaled to `max_value`.
pub fn draw_bar_chart(
    ui: &mut egui::Ui,
    rows: &[(&str, f32, egui::Color32)],
    max_value: f32,
    width: f32,
) {
    let rows = &rows[..rows.len().min(MAX_BAR_ROWS)];
    let height = (rows.len().max(1) as f32) * ROW_HEIGHT + 8.0;
    let (rect, painter) = chart_frame(ui, width, height);
    if rows.is_empty() {
        no_data(&painter, rect);
        return;
    }

    let bar_width = (rect.width() - NAME_WIDTH - 48.0).max(10.0);
    let max_value = max_value.max(f32::EPSILON);
    for (i, (name, value, color)) in rows.iter().enumerate() {
        let y = rect.min.y + 4.0 + i as f32 * ROW_HEIGHT;
        row_label(&painter, rect, y, name);
        let len = (value / max_value).clamp(0.0, 1.0) * bar_width;
        let bar = egui::Rect::from_min_size(
            egui::pos2(rect.min.x + NAME_WIDTH, y + 3.0),
            egui::vec2(len, ROW_HEIGHT - 6.0),
        );
        painter.rect_filled(bar, 1.0, *color);
        painter.text(
            egui::pos2(bar.max.x + 4.0, y + ROW_HEIGHT / 2.0),
            egui::Align2::LEFT_CENTER,
            format!("{value:.0}"),
            egui::FontId::proportional(10.0),
            theme::MUTED,
        );
    }
}

/// One stacked bar per entity, segments in `OutageRow::causes` order.
pub fn draw_outage_bars(ui: &mut egui::Ui, rows: &[OutageRow], width: f32) {
    let rows = &rows[..rows.len().min(MAX_BAR_ROWS)];
    let height = (rows.len().max(1) as f32) * ROW_HEIGHT + 8.0;
    let (rect, painter) = chart_frame(ui, width, height);
    if rows.is_empty() {
        no_data(&painter, rect);
        return;
    }

    let max_total = rows.iter().map(OutageRow::total).max().unwrap_or(0).max(1) as f32;
    let bar_width = (rect.width() - NAME_WIDTH - 12.0).max(10.0);
    for (i, row) in rows.iter().enumerate() {
        let y = rect.min.y + 4.0 + i as f32 * ROW_HEIGHT;
        row_label(&painter, rect, y, &row.name);
        let mut x = rect.min.x + NAME_WIDTH;
        for ((_, count), color) in row.causes().iter().zip(theme::OUTAGE_CAUSES) {
            let len = *count as f32 / max_total * bar_width;
            let segment = egui::Rect::from_min_size(
                egui::pos2(x, y + 3.0),
                egui::vec2(len, ROW_HEIGHT - 6.0),
            );
            painter.rect_filled(segment, 0.0, color);
            x += len;
        }
    }
}

pub fn draw_multi_line_chart(
    ui: &mut egui::Ui,
    series: &[(&[f32], egui::Color32, &str)],
    width: f32,
    height: f32,
) {
    let (rect, painter) = chart_frame(ui, width, height);

    let mut global_min = f32::INFINITY;
    let mut global_max = f32::NEG_INFINITY;
    let mut max_len = 0usize;
    for (data, _, _) in series {
        for &v in *data {
            global_min = global_min.min(v);
            global_max = global_max.max(v);
        }
        max_len = max_len.max(data.len());
    }
    if max_len < 2 {
        no_data(&painter, rect);
        return;
    }
    let range = (global_max - global_min).max(1.0);

    for i in 0..=4 {
        let y = rect.min.y + (i as f32 / 4.0) * rect.height();
        painter.line_segment(
            [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
            egui::Stroke::new(0.3, egui::Color32::from_gray(50)),
        );
    }

    for (data, color, _) in series {
        if data.len() < 2 {
            continue;
        }
        let points: Vec<egui::Pos2> = data
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let x = rect.min.x + (i as f32 / (data.len() - 1) as f32) * rect.width();
                let y = rect.max.y - ((v - global_min) / range) * rect.height();
                egui::pos2(x, y)
            })
            .collect();
        for window in points.windows(2) {
            painter.line_segment([window[0], window[1]], egui::Stroke::new(1.5, *color));
        }
    }
}

/// Share bar split into coloured segments, e.g. compliant / anomalous /
/// pending image submissions.
pub fn draw_share_bar(ui: &mut egui::Ui, parts: &[(&str, u32, egui::Color32)], width: f32) {
    let (rect, painter) = chart_frame(ui, width, 16.0);
    let total: u32 = parts.iter().map(|(_, n, _)| n).sum();
    if total == 0 {
        return;
    }
    let mut x = rect.min.x;
    for (_, n, color) in parts {
        let len = *n as f32 / total as f32 * rect.width();
        painter.rect_filled(
            egui::Rect::from_min_size(egui::pos2(x, rect.min.y), egui::vec2(len, rect.height())),
            0.0,
            *color,
        );
        x += len;
    }
}

pub fn legend_item(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 1.0, color);
    ui.label(text);
}
