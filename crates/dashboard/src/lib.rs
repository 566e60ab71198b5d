use bevy::prelude::*;

pub mod config;
pub mod data_load;
pub mod data_source;
pub mod entity;
pub mod hierarchy;
pub mod mock_source;
pub mod projector;
pub mod resolver;
pub mod selection;
pub mod selection_store;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

use config::DashboardConfig;
use data_load::{
    pin_selection_to_scope, poll_pending_fetch, refresh_derived_view, request_initial_fetch,
    retry_failed_fetch, sync_dashboard_screen, DashboardDataState, DataSourceHandle, DerivedView,
    FetchStrategy, RetryFetch,
};
use resolver::DashboardScreen;
use selection_store::{
    apply_selection_actions, flush_selection_writes, SelectionAction, SelectionStore,
};

/// Ordering of the dashboard's `Update` work: input first, then everything
/// derived from it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardSet {
    /// Selection actions, retries and fetch completion.
    Input,
    /// Selector resolution, projection and screen sync.
    Resolve,
}

/// Selection store, data lifecycle and screen routing. Rendering lives in
/// the `ui` crate; persistence backends in `save`.
pub struct DashboardPlugin;

impl Plugin for DashboardPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<DashboardScreen>()
            .enable_state_scoped_entities::<DashboardScreen>()
            .add_event::<SelectionAction>()
            .add_event::<RetryFetch>()
            .init_resource::<SelectionStore>()
            .init_resource::<DashboardConfig>()
            .init_resource::<DataSourceHandle>()
            .init_resource::<FetchStrategy>()
            .init_resource::<DashboardDataState>()
            .init_resource::<DerivedView>()
            .configure_sets(Update, (DashboardSet::Input, DashboardSet::Resolve).chain())
            .add_systems(Startup, request_initial_fetch)
            .add_systems(
                Update,
                (apply_selection_actions, retry_failed_fetch, poll_pending_fetch)
                    .in_set(DashboardSet::Input),
            )
            .add_systems(
                Update,
                (
                    pin_selection_to_scope.run_if(resource_changed::<DashboardDataState>),
                    refresh_derived_view.run_if(
                        resource_changed::<SelectionStore>
                            .or(resource_changed::<DashboardDataState>),
                    ),
                    sync_dashboard_screen.run_if(resource_changed::<SelectionStore>),
                )
                    .chain()
                    .in_set(DashboardSet::Resolve),
            )
            .add_systems(PostUpdate, flush_selection_writes);
    }
}
