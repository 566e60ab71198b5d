//! Filter controls: the top bar (period and "Clear filters") and the side
//! panel with the geographic / department selectors, scheme and custom
//! date range. Every control emits a [`SelectionAction`]; nothing here
//! mutates the selection directly.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use dashboard::config::DashboardConfig;
use dashboard::data_load::DerivedView;
use dashboard::entity::OptionItem;
use dashboard::hierarchy::HierarchyLevel;
use dashboard::resolver::{ResolvedSelectors, SelectorView};
use dashboard::selection::{DateRange, FilterTab};
use dashboard::selection_store::{SelectionAction, SelectionStore};

const COMBO_WIDTH: f32 = 200.0;

/// Text typed into the custom date-range fields, not yet applied.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct CustomRangeDraft {
    pub start: String,
    pub end: String,
}

impl CustomRangeDraft {
    /// `SetDuration` for a well-formed draft: two ISO dates, start not after
    /// end.
    pub fn to_action(&self) -> Option<SelectionAction> {
        let (start, end) = (self.start.trim(), self.end.trim());
        if !is_iso_date(start) || !is_iso_date(end) || start > end {
            return None;
        }
        Some(SelectionAction::SetDuration(Some(DateRange::new(start, end))))
    }

    /// Drops the typed text once `emitted` clears the selection.
    pub fn settle(&mut self, emitted: &[SelectionAction]) {
        if emitted.contains(&SelectionAction::ClearAll) {
            *self = Self::default();
        }
    }
}

/// `YYYY-MM-DD` shape check. Calendar validity is left to the data source.
pub fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Name of the option whose id is `value`, or `placeholder` when nothing is
/// selected. An id missing from `options` is shown as-is.
pub fn selected_text(options: &[OptionItem], value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        return placeholder.to_string();
    }
    options
        .iter()
        .find(|o| o.id == value)
        .map_or_else(|| value.to_string(), |o| o.name.clone())
}

pub fn period_label(duration: Option<&DateRange>) -> String {
    duration.map_or_else(|| "All time".to_string(), DateRange::display)
}

// =============================================================================
// Widgets
// =============================================================================

/// One hierarchy drop-down. Returns the picked id, `""` for "All".
fn selector_combo<L: HierarchyLevel>(
    ui: &mut egui::Ui,
    id_salt: &str,
    view: &SelectorView<L>,
) -> Option<String> {
    let mut picked = None;
    ui.add_enabled_ui(view.enabled, |ui| {
        ui.label(view.level.label());
        egui::ComboBox::from_id_salt((id_salt, view.level.index()))
            .width(COMBO_WIDTH)
            .selected_text(selected_text(&view.options, &view.value, "All"))
            .show_ui(ui, |ui| {
                if ui.selectable_label(view.value.is_empty(), "All").clicked() {
                    picked = Some(String::new());
                }
                for option in &view.options {
                    if ui
                        .selectable_label(view.value == option.id, &option.name)
                        .clicked()
                    {
                        picked = Some(option.id.clone());
                    }
                }
            });
    });
    picked
}

fn period_picker(
    ui: &mut egui::Ui,
    current: Option<&DateRange>,
    presets: &[DateRange],
    emitted: &mut Vec<SelectionAction>,
) {
    ui.label("Period");
    egui::ComboBox::from_id_salt("period_picker")
        .width(COMBO_WIDTH)
        .selected_text(period_label(current))
        .show_ui(ui, |ui| {
            if ui.selectable_label(current.is_none(), "All time").clicked() {
                emitted.push(SelectionAction::SetDuration(None));
            }
            for preset in presets {
                if ui
                    .selectable_label(current == Some(preset), preset.display())
                    .clicked()
                {
                    emitted.push(SelectionAction::SetDuration(Some(preset.clone())));
                }
            }
        });
}

fn geographic_selectors(
    ui: &mut egui::Ui,
    selectors: &ResolvedSelectors,
    emitted: &mut Vec<SelectionAction>,
) {
    for view in &selectors.geo {
        if let Some(id) = selector_combo(ui, "geo", view) {
            emitted.push(SelectionAction::SetGeoLevel(view.level, id));
        }
    }
}

fn department_selectors(
    ui: &mut egui::Ui,
    selectors: &ResolvedSelectors,
    emitted: &mut Vec<SelectionAction>,
) {
    for view in &selectors.department {
        if let Some(id) = selector_combo(ui, "department", view) {
            emitted.push(SelectionAction::SetDepartmentLevel(view.level, id));
        }
    }
}

fn advanced_filters(
    ui: &mut egui::Ui,
    selectors: &ResolvedSelectors,
    scheme: &str,
    draft: &mut CustomRangeDraft,
    emitted: &mut Vec<SelectionAction>,
) {
    ui.add_enabled_ui(selectors.scheme_enabled, |ui| {
        ui.label("Scheme");
        egui::ComboBox::from_id_salt("scheme")
            .width(COMBO_WIDTH)
            .selected_text(selected_text(&selectors.scheme_options, scheme, "All schemes"))
            .show_ui(ui, |ui| {
                if ui.selectable_label(scheme.is_empty(), "All schemes").clicked() {
                    emitted.push(SelectionAction::SetScheme(String::new()));
                }
                for option in &selectors.scheme_options {
                    if ui
                        .selectable_label(scheme == option.id, &option.name)
                        .clicked()
                    {
                        emitted.push(SelectionAction::SetScheme(option.id.clone()));
                    }
                }
            });
    });

    ui.add_space(6.0);
    ui.add_enabled_ui(selectors.duration_enabled, |ui| {
        ui.label("Custom range");
        ui.add(egui::TextEdit::singleline(&mut draft.start).hint_text("Start YYYY-MM-DD"));
        ui.add(egui::TextEdit::singleline(&mut draft.end).hint_text("End YYYY-MM-DD"));
        let action = draft.to_action();
        if ui
            .add_enabled(action.is_some(), egui::Button::new("Apply range"))
            .clicked()
        {
            emitted.extend(action);
        }
    });
}

// =============================================================================
// System
// =============================================================================

pub fn filter_panel_ui(
    mut contexts: EguiContexts,
    config: Res<DashboardConfig>,
    store: Res<SelectionStore>,
    derived: Res<DerivedView>,
    mut draft: ResMut<CustomRangeDraft>,
    mut actions: EventWriter<SelectionAction>,
) {
    let Some(selectors) = derived.selectors() else {
        return;
    };
    let selection = store.state();
    let ctx = contexts.ctx_mut();
    let mut emitted = Vec::new();

    egui::TopBottomPanel::top("dashboard_top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("Rural Water Supply");
            ui.label(format!("({})", config.variant.key()));
            ui.separator();
            period_picker(
                ui,
                selection.duration(),
                &selectors.duration_presets,
                &mut emitted,
            );
            ui.separator();
            if ui.button("Clear filters").clicked() {
                emitted.push(SelectionAction::ClearAll);
            }
        });
    });

    egui::SidePanel::left("filter_panel")
        .default_width(COMBO_WIDTH + 24.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for tab in [FilterTab::Geographic, FilterTab::Department] {
                    if ui.selectable_label(selectors.tab == tab, tab.label()).clicked() {
                        emitted.push(SelectionAction::SetActiveTab(tab));
                    }
                }
            });
            ui.separator();
            match selectors.tab {
                FilterTab::Geographic => geographic_selectors(ui, selectors, &mut emitted),
                FilterTab::Department => department_selectors(ui, selectors, &mut emitted),
            }
            ui.separator();
            advanced_filters(ui, selectors, selection.scheme(), &mut draft, &mut emitted);
        });

    draft.settle(&emitted);
    for action in emitted {
        actions.send(action);
    }
}
