//! Selection store: owns [`SelectionState`] and is the only legal mutation
//! surface for it.
//!
//! The store is constructed with an injected [`SelectionPersistence`] port.
//! Every mutation schedules a write of the full state; the write itself is
//! performed later by [`flush_selection_writes`] in `PostUpdate`, so a slow or
//! failing backend never delays or fails the mutation that triggered it.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use crate::hierarchy::{DepartmentLevel, GeoLevel, HierarchyLevel};
use crate::selection::{DateRange, FilterTab, PartialSelection, SelectionState};

// =============================================================================
// Persistence port
// =============================================================================

/// Durable storage for the selection.
///
/// Implementations must never panic and must swallow their own failures:
/// `load` returns an empty partial for missing or corrupt data, and `save` is
/// best-effort.
pub trait SelectionPersistence: Send + Sync + 'static {
    fn load(&self) -> PartialSelection;
    fn save(&self, state: &SelectionState);
}

/// Persistence that forgets everything. Used until a real backend is wired.
#[derive(Debug, Default)]
pub struct NoPersistence;

impl SelectionPersistence for NoPersistence {
    fn load(&self) -> PartialSelection {
        PartialSelection::default()
    }

    fn save(&self, _state: &SelectionState) {}
}

/// In-memory persistence that records every write. Intended for tests.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    saved: Mutex<Vec<SelectionState>>,
    seed: PartialSelection,
}

impl MemoryPersistence {
    /// A port whose `load()` returns `seed`.
    pub fn seeded(seed: PartialSelection) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            seed,
        }
    }

    pub fn writes(&self) -> Vec<SelectionState> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_default()
    }
}

impl SelectionPersistence for MemoryPersistence {
    fn load(&self) -> PartialSelection {
        self.writes()
            .last()
            .map(PartialSelection::from)
            .unwrap_or_else(|| self.seed.clone())
    }

    fn save(&self, state: &SelectionState) {
        if let Ok(mut saved) = self.saved.lock() {
            saved.push(state.clone());
        }
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Resource)]
pub struct SelectionStore {
    state: SelectionState,
    persistence: Arc<dyn SelectionPersistence>,
    /// Geographic ids locked by the loaded data's scope, ancestor first.
    pinned_geo: Vec<String>,
    /// Bumped once per mutation that changed the state.
    revision: u64,
    pending_write: bool,
}

impl SelectionStore {
    /// Empty selection backed by `persistence`. Nothing is loaded.
    pub fn new(persistence: Arc<dyn SelectionPersistence>) -> Self {
        Self {
            state: SelectionState::default(),
            persistence,
            pinned_geo: Vec::new(),
            revision: 0,
            pending_write: false,
        }
    }

    /// Merges whatever `persistence` can load over the default selection.
    pub fn restore(persistence: Arc<dyn SelectionPersistence>) -> Self {
        let partial = persistence.load();
        if !partial.is_empty() {
            debug!("Selection: restored persisted selection {:?}", partial);
        }
        let state = SelectionState::default().merged_with(partial);
        Self {
            state,
            persistence,
            pinned_geo: Vec::new(),
            revision: 0,
            pending_write: false,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending_write
    }

    pub fn pinned_geo(&self) -> &[String] {
        &self.pinned_geo
    }

    /// Locks the leading geographic levels to `path` (ancestor first). Every
    /// later mutation keeps them, including `clear_all`.
    ///
    /// Commits only if the current selection disagrees with `path`.
    pub fn pin_geo(&mut self, path: Vec<String>) {
        self.pinned_geo = path;
        let pinned = self.with_pins(self.state.clone());
        if pinned != self.state {
            debug!("Selection: pinned geography to {:?}", self.pinned_geo);
            self.commit(pinned);
        }
    }

    /// Level of the entities currently listed, where a `DrillInto` lands.
    pub fn listed_level(&self) -> GeoLevel {
        let base = GeoLevel::from_index(self.pinned_geo.len()).unwrap_or(GeoLevel::Village);
        self.state.geo().listed_level(base)
    }

    pub fn set_geo_level(&mut self, level: GeoLevel, value: impl Into<String>) {
        let next = self.state.clone().with_geo_level(level, value);
        self.commit(next);
    }

    pub fn set_department_level(&mut self, level: DepartmentLevel, value: impl Into<String>) {
        let next = self.state.clone().with_department_level(level, value);
        self.commit(next);
    }

    pub fn set_scheme(&mut self, scheme: impl Into<String>) {
        let next = self.state.clone().with_scheme(scheme);
        self.commit(next);
    }

    pub fn set_duration(&mut self, duration: Option<DateRange>) {
        let next = self.state.clone().with_duration(duration);
        self.commit(next);
    }

    pub fn set_active_tab(&mut self, tab: FilterTab) {
        let next = self.state.clone().with_active_tab(tab);
        self.commit(next);
    }

    /// Resets every field in a single commit.
    pub fn clear_all(&mut self) {
        self.commit(SelectionState::default());
    }

    /// Writes the full state through the persistence port if a write is due.
    pub fn flush(&mut self) {
        if !self.pending_write {
            return;
        }
        self.pending_write = false;
        self.persistence.save(&self.state);
    }

    fn with_pins(&self, mut state: SelectionState) -> SelectionState {
        for (&level, id) in GeoLevel::ALL.iter().zip(&self.pinned_geo) {
            if state.geo().get(level) != id {
                state = state.with_geo_level(level, id.clone());
            }
        }
        state
    }

    fn commit(&mut self, next: SelectionState) {
        let next = self.with_pins(next);
        if next != self.state {
            self.state = next;
            self.revision += 1;
        }
        self.pending_write = true;
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(Arc::new(NoPersistence))
    }
}

// =============================================================================
// Actions
// =============================================================================

/// A user intent against the selection, emitted by the UI.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SelectionAction {
    SetGeoLevel(GeoLevel, String),
    SetDepartmentLevel(DepartmentLevel, String),
    SetScheme(String),
    SetDuration(Option<DateRange>),
    SetActiveTab(FilterTab),
    ClearAll,
    /// Select `id` at the level whose entities are currently listed
    /// (a table-row or map-region click).
    DrillInto(String),
    /// Clear the deepest selected geographic level.
    Up,
}

/// Applies one action to the store.
pub fn apply_action(store: &mut SelectionStore, action: SelectionAction) {
    match action {
        SelectionAction::SetGeoLevel(level, value) => store.set_geo_level(level, value),
        SelectionAction::SetDepartmentLevel(level, value) => {
            store.set_department_level(level, value)
        }
        SelectionAction::SetScheme(scheme) => store.set_scheme(scheme),
        SelectionAction::SetDuration(duration) => store.set_duration(duration),
        SelectionAction::SetActiveTab(tab) => store.set_active_tab(tab),
        SelectionAction::ClearAll => store.clear_all(),
        SelectionAction::DrillInto(id) => {
            let level = store.listed_level();
            store.set_geo_level(level, id);
        }
        SelectionAction::Up => {
            let pinned = store.pinned_geo().len();
            if let Some(level) = store
                .state()
                .geo()
                .deepest_selected()
                .filter(|level| level.index() >= pinned)
            {
                store.set_geo_level(level, "");
            }
        }
    }
}

/// Drains [`SelectionAction`] events into the store.
pub fn apply_selection_actions(
    mut actions: EventReader<SelectionAction>,
    mut store: ResMut<SelectionStore>,
) {
    for action in actions.read() {
        apply_action(&mut store, action.clone());
    }
}

/// Persists the selection after this frame's mutations.
///
/// Uses `bypass_change_detection` so the flush itself does not look like a
/// selection change to downstream systems.
pub fn flush_selection_writes(mut store: ResMut<SelectionStore>) {
    if store.has_pending_write() {
        store.bypass_change_detection().flush();
    }
}

/// Level one step below the current deepest geographic selection, if any.
pub fn next_drill_level(state: &SelectionState) -> Option<GeoLevel> {
    match state.geo().deepest_selected() {
        Some(level) => level.child(),
        None => Some(GeoLevel::State),
    }
}
