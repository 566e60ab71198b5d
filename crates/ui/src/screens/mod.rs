//! Dashboard body: routes the resolved screen to its renderer, or shows the
//! loading/error overlay while no data is available.

pub mod chart_handle;
mod renderers;
mod status;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use dashboard::data_load::{DashboardDataState, DerivedView, RetryFetch};
use dashboard::data_source::DashboardData;
use dashboard::projector::ResolvedView;
use dashboard::resolver::{DashboardScreen, SelectorCatalog};
use dashboard::selection::SelectionState;
use dashboard::selection_store::{SelectionAction, SelectionStore};

use chart_handle::{ChartKind, ChartLedger, LiveChart};

/// Inputs a screen renderer reads. Borrowed for one frame.
pub struct ScreenContext<'a> {
    pub view: &'a ResolvedView,
    pub data: &'a DashboardData,
    pub selection: &'a SelectionState,
    pub catalog: &'a SelectorCatalog,
}

impl ScreenContext<'_> {
    /// The screen `view` was resolved for. The mounted screen state can
    /// trail it by one frame.
    pub fn screen(&self) -> DashboardScreen {
        self.view.screen
    }
}

/// What a renderer produced this frame.
#[derive(Debug, Default)]
pub struct ScreenOutput {
    pub actions: Vec<SelectionAction>,
    /// Charts painted, in paint order.
    pub painted: Vec<ChartKind>,
}

/// Draws exactly one screen's renderer into `ui`.
pub fn render_screen(ui: &mut egui::Ui, ctx: &ScreenContext) -> ScreenOutput {
    let mut out = ScreenOutput::default();
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match ctx.screen() {
            DashboardScreen::Central => renderers::render_central(ui, ctx, &mut out),
            DashboardScreen::State => renderers::render_state(ui, ctx, &mut out),
            DashboardScreen::District => renderers::render_district(ui, ctx, &mut out),
            DashboardScreen::Block => renderers::render_block(ui, ctx, &mut out),
            DashboardScreen::GramPanchayat => {
                renderers::render_gram_panchayat(ui, ctx, &mut out)
            }
            DashboardScreen::Village => renderers::render_village(ui, ctx, &mut out),
        });
    out
}

/// Acquires every chart of `screen` listed in `painted`. Charts mounted for
/// another screen are left alone.
pub fn acquire_painted<'a>(
    charts: impl IntoIterator<Item = (Entity, Mut<'a, LiveChart>)>,
    screen: DashboardScreen,
    painted: &[ChartKind],
    ledger: &mut ChartLedger,
) {
    for (entity, mut chart) in charts {
        if !chart.is_acquired() && chart.screen == screen && painted.contains(&chart.kind) {
            ledger.acquire(entity, &mut chart);
        }
    }
}

pub fn dashboard_body_ui(
    mut contexts: EguiContexts,
    data_state: Res<DashboardDataState>,
    derived: Res<DerivedView>,
    store: Res<SelectionStore>,
    mut charts: Query<(Entity, &mut LiveChart)>,
    mut ledger: ResMut<ChartLedger>,
    mut actions: EventWriter<SelectionAction>,
    mut retry: EventWriter<RetryFetch>,
) {
    let ctx = contexts.ctx_mut();

    if let Some(err) = data_state.error() {
        if status::error_overlay(ctx, err) {
            retry.send(RetryFetch);
        }
        return;
    }
    let (Some(data), Some(view)) = (data_state.data(), derived.view()) else {
        status::loading_overlay(ctx);
        return;
    };

    let screen_ctx = ScreenContext {
        view,
        data,
        selection: store.state(),
        catalog: derived.catalog(),
    };
    let mut output = ScreenOutput::default();
    egui::CentralPanel::default().show(ctx, |ui| {
        output = render_screen(ui, &screen_ctx);
    });

    acquire_painted(&mut charts, screen_ctx.screen(), &output.painted, &mut ledger);
    for action in output.actions {
        actions.send(action);
    }
}
