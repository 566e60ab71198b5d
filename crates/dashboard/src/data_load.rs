//! Mount-time fetch, its loading/error lifecycle, and the per-frame derived
//! view (resolved selectors, projected entities, active screen).

use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};

use crate::config::{DashboardConfig, PERFORMANCE_TABLE_ROWS};
use crate::data_source::{load_dashboard, DashboardData, DataSource, DataSourceError};
use crate::entity::HierarchyOptions;
use crate::mock_source::MockDataSource;
use crate::projector::ResolvedView;
use crate::resolver::{
    resolve_screen, resolve_selectors, DashboardScreen, ResolvedSelectors, SelectorCatalog,
};
use crate::selection_store::SelectionStore;

/// The provider the dashboard fetches from.
#[derive(Resource, Clone)]
pub struct DataSourceHandle(pub Arc<dyn DataSource>);

impl DataSourceHandle {
    pub fn new(source: impl DataSource) -> Self {
        Self(Arc::new(source))
    }
}

impl Default for DataSourceHandle {
    fn default() -> Self {
        Self::new(MockDataSource::default())
    }
}

/// Where the fetch runs. Wasm always fetches inline.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    #[default]
    Background,
    Inline,
}

/// Lifecycle of the mount-time fetch.
#[derive(Resource, Debug, Clone, Default)]
pub enum DashboardDataState {
    #[default]
    Loading,
    Failed(DataSourceError),
    Ready(Arc<DashboardData>),
}

impl DashboardDataState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&DashboardData> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DataSourceError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Re-issues the mount fetch after a failure.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RetryFetch;

#[derive(Resource)]
pub struct PendingFetch(Task<Result<DashboardData, DataSourceError>>);

fn start_fetch(
    commands: &mut Commands,
    config: &DashboardConfig,
    source: &DataSourceHandle,
    strategy: FetchStrategy,
    data_state: &mut DashboardDataState,
) {
    let level = config.fetch_level();
    let entity_id = config.entity_id.clone();
    info!(
        "Fetching {level} dashboard data{}",
        entity_id
            .as_deref()
            .map(|id| format!(" for '{id}'"))
            .unwrap_or_default()
    );
    *data_state = DashboardDataState::Loading;

    if cfg!(target_arch = "wasm32") || strategy == FetchStrategy::Inline {
        let result = load_dashboard(source.0.as_ref(), level, entity_id.as_deref());
        finish_fetch(data_state, result);
        return;
    }

    let source = Arc::clone(&source.0);
    let task = AsyncComputeTaskPool::get()
        .spawn(async move { load_dashboard(source.as_ref(), level, entity_id.as_deref()) });
    commands.insert_resource(PendingFetch(task));
}

fn finish_fetch(
    data_state: &mut DashboardDataState,
    result: Result<DashboardData, DataSourceError>,
) {
    *data_state = match result {
        Ok(data) => {
            info!(
                "Dashboard data ready: {} base entities, {} districts",
                data.map_data.len(),
                data.hierarchy
                    .districts_by_state
                    .0
                    .values()
                    .map(Vec::len)
                    .sum::<usize>()
            );
            DashboardDataState::Ready(Arc::new(data))
        }
        Err(e) => {
            error!("Dashboard fetch failed: {e}");
            DashboardDataState::Failed(e)
        }
    };
}

pub fn request_initial_fetch(
    mut commands: Commands,
    config: Res<DashboardConfig>,
    source: Res<DataSourceHandle>,
    strategy: Res<FetchStrategy>,
    mut data_state: ResMut<DashboardDataState>,
) {
    start_fetch(&mut commands, &config, &source, *strategy, &mut data_state);
}

/// Retries only from the error state; a retry while loading is ignored.
pub fn retry_failed_fetch(
    mut commands: Commands,
    mut retries: EventReader<RetryFetch>,
    config: Res<DashboardConfig>,
    source: Res<DataSourceHandle>,
    strategy: Res<FetchStrategy>,
    mut data_state: ResMut<DashboardDataState>,
) {
    if retries.read().count() == 0 {
        return;
    }
    if data_state.error().is_none() {
        debug!("Ignoring retry: dashboard data is not in the error state");
        return;
    }
    start_fetch(&mut commands, &config, &source, *strategy, &mut data_state);
}

pub fn poll_pending_fetch(
    mut commands: Commands,
    pending: Option<ResMut<PendingFetch>>,
    mut data_state: ResMut<DashboardDataState>,
) {
    let Some(mut pending) = pending else {
        return;
    };
    if let Some(result) = block_on(futures_lite::future::poll_once(&mut pending.0)) {
        finish_fetch(&mut data_state, result);
        commands.remove_resource::<PendingFetch>();
    }
}

// =============================================================================
// Derived view
// =============================================================================

/// Selector state and projected data for the current selection.
///
/// Recomputed whenever the selection or the loaded data changes; never
/// persisted.
#[derive(Resource, Debug, Default)]
pub struct DerivedView {
    catalog: SelectorCatalog,
    selectors: Option<ResolvedSelectors>,
    view: Option<ResolvedView>,
}

impl DerivedView {
    pub fn catalog(&self) -> &SelectorCatalog {
        &self.catalog
    }

    pub fn selectors(&self) -> Option<&ResolvedSelectors> {
        self.selectors.as_ref()
    }

    /// `None` until data is ready.
    pub fn view(&self) -> Option<&ResolvedView> {
        self.view.as_ref()
    }
}

pub fn catalog_from_data(data: &DashboardData) -> SelectorCatalog {
    SelectorCatalog {
        geo: HierarchyOptions::from_datasets(&data.map_data, &data.scope, &data.hierarchy),
        pinned_geo: data.scope.len(),
        department: data.department_options.clone(),
        schemes: data.schemes.clone(),
        duration_presets: data.duration_presets.clone(),
    }
}

/// Locks the selection to the loaded document's scope.
pub fn pin_selection_to_scope(
    data_state: Res<DashboardDataState>,
    mut store: ResMut<SelectionStore>,
) {
    let Some(data) = data_state.data() else {
        return;
    };
    let path = data.scope_path();
    if store.pinned_geo() != path.as_slice() {
        store.pin_geo(path);
    }
}

pub fn refresh_derived_view(
    store: Res<SelectionStore>,
    data_state: Res<DashboardDataState>,
    mut derived: ResMut<DerivedView>,
) {
    if data_state.is_changed() {
        derived.catalog = data_state
            .data()
            .map(catalog_from_data)
            .unwrap_or_default();
    }
    let selection = store.state();
    derived.selectors = Some(resolve_selectors(selection, &derived.catalog));
    derived.view = data_state
        .data()
        .map(|data| ResolvedView::resolve(selection, data, PERFORMANCE_TABLE_ROWS));
}

/// Moves the app to the screen the selection resolves to.
pub fn sync_dashboard_screen(
    store: Res<SelectionStore>,
    current: Res<State<DashboardScreen>>,
    mut next: ResMut<NextState<DashboardScreen>>,
) {
    let target = resolve_screen(store.state().geo());
    if *current.get() != target {
        debug!("Screen {:?} -> {:?}", current.get(), target);
        next.set(target);
    }
}
