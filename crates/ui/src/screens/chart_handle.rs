//! Chart handles scoped to the mounted screen.
//!
//! Entering a screen spawns one `LiveChart` per chart it shows, tagged
//! `StateScoped(screen)`, so leaving the screen despawns them. A handle is
//! acquired the first time its chart paints and released when its entity
//! goes away; `ChartLedger` keeps the books.

use std::collections::HashSet;

use bevy::prelude::*;

use dashboard::resolver::DashboardScreen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    EntityPerformance,
    OutageCauses,
    DemandSupply,
    ImageSubmissions,
    PhotoEvidence,
}

impl ChartKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::EntityPerformance => "Composite score",
            Self::OutageCauses => "Water supply outages by cause",
            Self::DemandSupply => "Demand vs supply (MLD)",
            Self::ImageSubmissions => "Image submission status",
            Self::PhotoEvidence => "Photo evidence compliance",
        }
    }
}

/// Charts each screen shows, in paint order.
pub fn charts_for(screen: DashboardScreen) -> &'static [ChartKind] {
    use ChartKind::*;
    match screen {
        DashboardScreen::Central | DashboardScreen::State => &[
            EntityPerformance,
            OutageCauses,
            DemandSupply,
            ImageSubmissions,
            PhotoEvidence,
        ],
        DashboardScreen::District | DashboardScreen::Block => &[
            EntityPerformance,
            OutageCauses,
            DemandSupply,
            ImageSubmissions,
        ],
        DashboardScreen::GramPanchayat => &[EntityPerformance, OutageCauses, DemandSupply],
        DashboardScreen::Village => &[EntityPerformance, DemandSupply],
    }
}

#[derive(Component, Debug)]
pub struct LiveChart {
    pub kind: ChartKind,
    pub screen: DashboardScreen,
    acquired: bool,
}

impl LiveChart {
    pub fn is_acquired(&self) -> bool {
        self.acquired
    }
}

/// Acquisition bookkeeping for chart handles.
#[derive(Resource, Debug, Default)]
pub struct ChartLedger {
    live: HashSet<Entity>,
    pub acquired_total: u64,
    pub released_total: u64,
}

impl ChartLedger {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Marks `chart` acquired on its first paint. Later paints are no-ops.
    pub fn acquire(&mut self, entity: Entity, chart: &mut LiveChart) {
        if chart.acquired {
            return;
        }
        chart.acquired = true;
        self.live.insert(entity);
        self.acquired_total += 1;
        debug!("Chart {:?} acquired on {:?}", chart.kind, chart.screen);
    }
}

fn spawn_screen_charts(commands: &mut Commands, screen: DashboardScreen) {
    for &kind in charts_for(screen) {
        commands.spawn((
            LiveChart {
                kind,
                screen,
                acquired: false,
            },
            StateScoped(screen),
        ));
    }
}

pub fn release_unmounted_charts(
    mut removed: RemovedComponents<LiveChart>,
    mut ledger: ResMut<ChartLedger>,
) {
    for entity in removed.read() {
        if ledger.live.remove(&entity) {
            ledger.released_total += 1;
        }
    }
}

/// Chart handle lifecycle. Needs `DashboardPlugin` for the screen state;
/// independent of egui so it runs headless.
pub struct ScreenLifecyclePlugin;

impl Plugin for ScreenLifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChartLedger>()
            .add_systems(PreUpdate, release_unmounted_charts);
        for screen in DashboardScreen::ALL {
            app.add_systems(OnEnter(screen), move |mut commands: Commands| {
                info!("Mounting {} screen", screen.title());
                spawn_screen_charts(&mut commands, screen);
            });
        }
    }
}
