//! Waypoint store: the single owner of start, steps and end.
//!
//! Every successful mutation bumps a monotonic version counter. Failed
//! mutations leave both the waypoints and the version untouched, so a
//! snapshot's `version` identifies its contents exactly.

use crate::types::{LonLat, PlannerError, Waypoint, WaypointRole, WaypointSet, WaypointSlot};

/// A partial update for a step.
///
/// `coords` is doubly optional: `None` leaves the coordinate alone,
/// `Some(None)` clears it, `Some(Some(c))` replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepPatch {
    /// Replacement coordinate, if any.
    pub coords: Option<Option<LonLat>>,
    /// Replacement name, if any.
    pub name: Option<String>,
}

impl StepPatch {
    /// A patch that moves the step to `coords`.
    #[must_use]
    pub const fn move_to(coords: LonLat) -> Self {
        Self {
            coords: Some(Some(coords)),
            name: None,
        }
    }

    /// A patch that removes the step's coordinate.
    #[must_use]
    pub const fn clear_coords() -> Self {
        Self {
            coords: Some(None),
            name: None,
        }
    }

    /// A patch that renames the step.
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            coords: None,
            name: Some(name.into()),
        }
    }

    /// Add a rename to this patch.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Ordered, typed waypoint storage with a version counter.
#[derive(Debug, Clone, Default)]
pub struct WaypointStore {
    start: Option<Waypoint>,
    steps: Vec<Waypoint>,
    end: Option<Waypoint>,
    version: u64,
}

impl WaypointStore {
    /// Create an empty store at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Number of steps, including ones without coordinates.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Coordinate currently held by `slot`, if any.
    #[must_use]
    pub fn coords_at(&self, slot: WaypointSlot) -> Option<LonLat> {
        match slot {
            WaypointSlot::Start => self.start.as_ref().and_then(|w| w.coords),
            WaypointSlot::End => self.end.as_ref().and_then(|w| w.coords),
            WaypointSlot::Step(index) => self.steps.get(index).and_then(|w| w.coords),
        }
    }

    /// Assign the start waypoint.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn set_start(
        &mut self,
        coords: LonLat,
        name: impl Into<String>,
    ) -> Result<(), PlannerError> {
        coords.validate()?;
        self.start = Some(Waypoint::new(WaypointRole::Start, Some(coords), name));
        self.bump();
        Ok(())
    }

    /// Assign the end waypoint.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn set_end(&mut self, coords: LonLat, name: impl Into<String>) -> Result<(), PlannerError> {
        coords.validate()?;
        self.end = Some(Waypoint::new(WaypointRole::End, Some(coords), name));
        self.bump();
        Ok(())
    }

    /// Remove the start waypoint.
    pub fn clear_start(&mut self) {
        self.start = None;
        self.bump();
    }

    /// Remove the end waypoint.
    pub fn clear_end(&mut self) {
        self.end = None;
        self.bump();
    }

    /// Append a step and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn add_step(
        &mut self,
        coords: Option<LonLat>,
        name: impl Into<String>,
    ) -> Result<usize, PlannerError> {
        if let Some(c) = coords {
            c.validate()?;
        }
        self.steps
            .push(Waypoint::new(WaypointRole::Step, coords, name));
        self.bump();
        Ok(self.steps.len() - 1)
    }

    /// Apply a partial update to the step at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::StepOutOfRange`] if no such step exists and
    /// [`PlannerError::InvalidCoordinate`] for out-of-range coordinates.
    pub fn update_step(&mut self, index: usize, patch: StepPatch) -> Result<(), PlannerError> {
        let len = self.steps.len();
        if let Some(Some(c)) = patch.coords {
            c.validate()?;
        }
        let step = self
            .steps
            .get_mut(index)
            .ok_or(PlannerError::StepOutOfRange { index, len })?;
        if let Some(coords) = patch.coords {
            step.coords = coords;
        }
        if let Some(name) = patch.name {
            step.name = name;
        }
        self.bump();
        Ok(())
    }

    /// Remove the step at `index`, shifting later steps down.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::StepOutOfRange`] if no such step exists.
    pub fn remove_step(&mut self, index: usize) -> Result<Waypoint, PlannerError> {
        if index >= self.steps.len() {
            return Err(PlannerError::StepOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        let removed = self.steps.remove(index);
        self.bump();
        Ok(removed)
    }

    /// Change the display name held by `slot` without touching its
    /// coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::StepOutOfRange`] if `slot` addresses a
    /// missing step. Renaming an unset start or end is a no-op.
    pub fn rename(
        &mut self,
        slot: WaypointSlot,
        name: impl Into<String>,
    ) -> Result<(), PlannerError> {
        let target = match slot {
            WaypointSlot::Start => self.start.as_mut(),
            WaypointSlot::End => self.end.as_mut(),
            WaypointSlot::Step(index) => {
                let len = self.steps.len();
                Some(
                    self.steps
                        .get_mut(index)
                        .ok_or(PlannerError::StepOutOfRange { index, len })?,
                )
            }
        };
        if let Some(waypoint) = target {
            waypoint.name = name.into();
            self.bump();
        }
        Ok(())
    }

    /// Remove every waypoint.
    pub fn reset(&mut self) {
        self.start = None;
        self.steps.clear();
        self.end = None;
        self.bump();
    }

    /// Take an immutable snapshot tagged with the current version.
    #[must_use]
    pub fn snapshot(&self) -> WaypointSet {
        WaypointSet {
            start: self.start.clone(),
            steps: self.steps.clone(),
            end: self.end.clone(),
            version: self.version,
        }
    }

    const fn bump(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mutators_bump_version() {
        let mut store = WaypointStore::new();
        assert_eq!(store.version(), 0);
        store.set_start(LonLat::new(1.0, 1.0), "a").unwrap();
        store.set_end(LonLat::new(2.0, 2.0), "b").unwrap();
        let idx = store.add_step(None, "stop").unwrap();
        store.update_step(idx, StepPatch::move_to(LonLat::new(3.0, 3.0))).unwrap();
        store.rename(WaypointSlot::Start, "home").unwrap();
        store.remove_step(idx).unwrap();
        store.clear_end();
        assert_eq!(store.version(), 7);
        assert_eq!(store.snapshot().version, 7);
    }

    #[test]
    fn invalid_coordinate_leaves_state_unchanged() {
        let mut store = WaypointStore::new();
        store.set_start(LonLat::new(10.0, 10.0), "a").unwrap();
        let before = store.snapshot();

        let err = store.set_start(LonLat::new(200.0, 10.0), "bad").unwrap_err();
        assert!(matches!(err, PlannerError::InvalidCoordinate { .. }));
        assert!(store.set_end(LonLat::new(0.0, 95.0), "bad").is_err());
        assert!(store.add_step(Some(LonLat::new(0.0, -91.0)), "bad").is_err());

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn steps_keep_insertion_order() {
        let mut store = WaypointStore::new();
        assert_eq!(store.add_step(Some(LonLat::new(1.0, 0.0)), "one").unwrap(), 0);
        assert_eq!(store.add_step(Some(LonLat::new(2.0, 0.0)), "two").unwrap(), 1);
        assert_eq!(store.add_step(Some(LonLat::new(3.0, 0.0)), "three").unwrap(), 2);
        store.remove_step(1).unwrap();

        let names: Vec<_> = store.snapshot().steps.into_iter().map(|w| w.name).collect();
        assert_eq!(names, ["one", "three"]);
    }

    #[test]
    fn update_step_out_of_range() {
        let mut store = WaypointStore::new();
        store.add_step(None, "only").unwrap();
        let version = store.version();
        assert_eq!(
            store.update_step(4, StepPatch::rename("x")),
            Err(PlannerError::StepOutOfRange { index: 4, len: 1 })
        );
        assert_eq!(
            store.remove_step(1).unwrap_err(),
            PlannerError::StepOutOfRange { index: 1, len: 1 }
        );
        assert_eq!(store.version(), version);
    }

    #[test]
    fn update_step_applies_patch_fields() {
        let mut store = WaypointStore::new();
        let idx = store.add_step(Some(LonLat::new(5.0, 5.0)), "old").unwrap();

        store
            .update_step(idx, StepPatch::move_to(LonLat::new(6.0, 6.0)).with_name("new"))
            .unwrap();
        let step = &store.snapshot().steps[0];
        assert_eq!(step.coords, Some(LonLat::new(6.0, 6.0)));
        assert_eq!(step.name, "new");
        assert_eq!(step.role, WaypointRole::Step);

        store.update_step(idx, StepPatch::clear_coords()).unwrap();
        let step = &store.snapshot().steps[0];
        assert_eq!(step.coords, None);
        assert_eq!(step.name, "new");
    }

    #[test]
    fn rename_unset_slot_is_noop() {
        let mut store = WaypointStore::new();
        store.rename(WaypointSlot::End, "nowhere").unwrap();
        assert_eq!(store.version(), 0);
        assert!(store.rename(WaypointSlot::Step(0), "x").is_err());
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = WaypointStore::new();
        store.set_start(LonLat::new(1.0, 1.0), "a").unwrap();
        store.add_step(None, "s").unwrap();
        store.reset();
        let snap = store.snapshot();
        assert!(snap.start.is_none());
        assert!(snap.steps.is_empty());
        assert_eq!(snap.version, 3);
    }
}
