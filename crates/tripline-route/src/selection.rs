//! Two-slot click selection: each map click fills start or end, then
//! flips to the other slot.
//!
//! Steps are never assigned by clicking. They come from location search.

use serde::{Deserialize, Serialize};

use crate::store::WaypointStore;
use crate::types::{LonLat, PlannerError, WaypointRole, WaypointSlot};

/// Which slot the next map click will fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SelectionState {
    /// The next click sets the start.
    #[default]
    AwaitingStart,
    /// The next click sets the end.
    AwaitingEnd,
}

impl SelectionState {
    /// The slot a click fills in this state.
    #[must_use]
    pub const fn target(self) -> WaypointSlot {
        match self {
            Self::AwaitingStart => WaypointSlot::Start,
            Self::AwaitingEnd => WaypointSlot::End,
        }
    }

    /// The role a click assigns in this state.
    #[must_use]
    pub const fn role(self) -> WaypointRole {
        match self {
            Self::AwaitingStart => WaypointRole::Start,
            Self::AwaitingEnd => WaypointRole::End,
        }
    }

    /// The state after a successful assignment.
    #[must_use]
    pub const fn on_click(self) -> Self {
        match self {
            Self::AwaitingStart => Self::AwaitingEnd,
            Self::AwaitingEnd => Self::AwaitingStart,
        }
    }

    /// Short prompt for the UI.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::AwaitingStart => "Click the map to set the start",
            Self::AwaitingEnd => "Click the map to set the end",
        }
    }
}

/// Outcome of a click that changed the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    /// Slot that was filled.
    pub slot: WaypointSlot,
    /// Coordinate written into it.
    pub coords: LonLat,
    /// State after the transition.
    pub next: SelectionState,
}

/// Selection machine bound to a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionMachine {
    state: SelectionState,
}

impl SelectionMachine {
    /// Start in [`SelectionState::AwaitingStart`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SelectionState {
        self.state
    }

    /// Force the slot the next click targets.
    pub const fn set_state(&mut self, state: SelectionState) {
        self.state = state;
    }

    /// Assign `coords` to the current target slot and advance.
    ///
    /// The waypoint is named with the raw coordinate label; the caller
    /// replaces it once reverse geocoding answers.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidCoordinate`] for out-of-range input,
    /// in which case neither the store nor the state changes.
    pub fn click(
        &mut self,
        store: &mut WaypointStore,
        coords: LonLat,
    ) -> Result<Assignment, PlannerError> {
        let slot = self.state.target();
        match self.state {
            SelectionState::AwaitingStart => store.set_start(coords, coords.label())?,
            SelectionState::AwaitingEnd => store.set_end(coords, coords.label())?,
        }
        self.state = self.state.on_click();
        Ok(Assignment {
            slot,
            coords,
            next: self.state,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn two_clicks_fill_start_then_end() {
        let mut store = WaypointStore::new();
        let mut machine = SelectionMachine::new();

        let first = machine.click(&mut store, LonLat::new(10.0, 10.0)).unwrap();
        assert_eq!(first.slot, WaypointSlot::Start);
        assert_eq!(first.next, SelectionState::AwaitingEnd);

        let second = machine.click(&mut store, LonLat::new(20.0, 20.0)).unwrap();
        assert_eq!(second.slot, WaypointSlot::End);

        let snap = store.snapshot();
        assert_eq!(snap.start_coords(), Some(LonLat::new(10.0, 10.0)));
        assert_eq!(snap.end_coords(), Some(LonLat::new(20.0, 20.0)));
        assert_eq!(machine.state(), SelectionState::AwaitingStart);
    }

    #[test]
    fn invalid_click_does_not_transition() {
        let mut store = WaypointStore::new();
        let mut machine = SelectionMachine::new();
        assert!(machine.click(&mut store, LonLat::new(500.0, 0.0)).is_err());
        assert_eq!(machine.state(), SelectionState::AwaitingStart);
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn forced_state_targets_end() {
        let mut store = WaypointStore::new();
        let mut machine = SelectionMachine::new();
        machine.set_state(SelectionState::AwaitingEnd);
        let assignment = machine.click(&mut store, LonLat::new(1.0, 2.0)).unwrap();
        assert_eq!(assignment.slot, WaypointSlot::End);
        assert_eq!(store.snapshot().end.unwrap().name, "2.00000, 1.00000");
    }

    #[test]
    fn transition_function_is_a_toggle() {
        let s = SelectionState::default();
        assert_eq!(s, SelectionState::AwaitingStart);
        assert_eq!(s.on_click().on_click(), s);
        assert_eq!(s.role(), WaypointRole::Start);
        assert_eq!(s.on_click().role(), WaypointRole::End);
    }
}
