//! # TestDashboard: headless harness for dashboard integration tests
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + `DashboardPlugin` so tests
//! can drive selection actions and fetches without a window or egui.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bevy::app::App;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::config::DashboardConfig;
use crate::data_load::{
    DashboardDataState, DataSourceHandle, DerivedView, FetchStrategy, RetryFetch,
};
use crate::data_source::{DashboardLevel, DataSource, DataSourceError};
use crate::hierarchy::GeoLevel;
use crate::mock_source::MockDataSource;
use crate::resolver::DashboardScreen;
use crate::selection::SelectionState;
use crate::selection_store::{SelectionAction, SelectionPersistence, SelectionStore};
use crate::DashboardPlugin;

pub struct TestDashboard {
    app: App,
}

impl Default for TestDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDashboard {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Central dashboard over the seeded mock source, fetched inline, with no
    /// persistence.
    pub fn new() -> Self {
        Self::setup(|_| {})
    }

    pub fn with_source(source: impl DataSource) -> Self {
        let handle = DataSourceHandle::new(source);
        Self::setup(move |app| {
            app.insert_resource(handle);
        })
    }

    /// Restores the selection from `persistence` before the first frame.
    pub fn with_persistence(persistence: Arc<dyn SelectionPersistence>) -> Self {
        Self::setup(move |app| {
            app.insert_resource(SelectionStore::restore(persistence));
        })
    }

    /// Full control: `configure` runs after `DashboardPlugin` is added and
    /// before the first update, so it can replace any resource.
    pub fn setup(configure: impl FnOnce(&mut App)) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.add_plugins(DashboardPlugin);
        app.insert_resource(FetchStrategy::Inline);
        configure(&mut app);

        // Startup runs the mount fetch.
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    pub fn update(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
            std::thread::yield_now();
        }
    }

    /// Sends an action and runs two frames: one to apply it, one for the
    /// queued screen transition.
    pub fn act(&mut self, action: SelectionAction) -> &mut Self {
        self.app.world_mut().send_event(action);
        self.update(2);
        self
    }

    pub fn select_geo(&mut self, level: GeoLevel, id: &str) -> &mut Self {
        self.act(SelectionAction::SetGeoLevel(level, id.to_string()))
    }

    pub fn clear_all(&mut self) -> &mut Self {
        self.act(SelectionAction::ClearAll)
    }

    pub fn retry(&mut self) -> &mut Self {
        self.app.world_mut().send_event(RetryFetch);
        self.update(1);
        self
    }

    /// Updates until the fetch leaves the loading state, at most `max` frames.
    pub fn run_until_loaded(&mut self, max: u32) -> bool {
        for _ in 0..max {
            if !self.data_state().is_loading() {
                return true;
            }
            self.update(1);
        }
        !self.data_state().is_loading()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn screen(&self) -> DashboardScreen {
        *self.app.world().resource::<State<DashboardScreen>>().get()
    }

    pub fn store(&self) -> &SelectionStore {
        self.app.world().resource::<SelectionStore>()
    }

    pub fn selection(&self) -> &SelectionState {
        self.store().state()
    }

    pub fn data_state(&self) -> &DashboardDataState {
        self.app.world().resource::<DashboardDataState>()
    }

    pub fn derived(&self) -> &DerivedView {
        self.app.world().resource::<DerivedView>()
    }

    pub fn config(&self) -> &DashboardConfig {
        self.app.world().resource::<DashboardConfig>()
    }

    /// Id of the `index`-th entity currently listed.
    pub fn listed_id(&self, index: usize) -> String {
        let view = self.derived().view().expect("dashboard data is not ready");
        view.entities[index].id.clone()
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_screen(&self, expected: DashboardScreen) {
        let actual = self.screen();
        assert_eq!(actual, expected, "Expected screen {expected:?}, got {actual:?}");
    }

    pub fn assert_ready(&self) {
        assert!(
            self.data_state().data().is_some(),
            "Expected dashboard data to be ready, got {:?}",
            self.data_state()
        );
    }

    pub fn assert_failed(&self) -> DataSourceError {
        match self.data_state().error() {
            Some(e) => e.clone(),
            None => panic!("Expected a fetch error, got {:?}", self.data_state()),
        }
    }
}

// ---------------------------------------------------------------------------
// Test data sources
// ---------------------------------------------------------------------------

/// Returns the same raw document for every fetch.
pub struct StaticSource(pub serde_json::Value);

impl DataSource for StaticSource {
    fn fetch(
        &self,
        _level: DashboardLevel,
        _entity_id: Option<&str>,
    ) -> Result<serde_json::Value, DataSourceError> {
        Ok(self.0.clone())
    }
}

/// Fails the first `failures` fetches, then delegates to the mock source.
/// Counts every call.
pub struct FlakySource {
    failures: usize,
    calls: Arc<AtomicUsize>,
    inner: MockDataSource,
}

impl FlakySource {
    pub fn new(failures: usize) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            failures,
            calls: Arc::clone(&calls),
            inner: MockDataSource::default(),
        };
        (source, calls)
    }
}

impl DataSource for FlakySource {
    fn fetch(
        &self,
        level: DashboardLevel,
        entity_id: Option<&str>,
    ) -> Result<serde_json::Value, DataSourceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(DataSourceError::Request(Some(format!(
                "connection refused (attempt {})",
                call + 1
            ))));
        }
        self.inner.fetch(level, entity_id)
    }
}
