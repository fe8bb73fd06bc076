//! Route planner session (sans-IO).
//!
//! [`RoutePlanner`] owns the waypoint store, the selection machine, the
//! resolver, the bounds fitter, the current route and the renderer. The
//! I/O layer feeds it events (clicks, service answers, timer wake-ups)
//! and executes the [`Effect`]s it returns:
//!
//! ```text
//! click ──► store ──► resolver.schedule ──► ScheduleWake(deadline)
//!                                               │
//! tick(now) ◄───────────────────────────────────┘
//!    └──► FetchRoute(request) ──► route_resolved(request, outcome)
//!                                      └──► redraw + camera fit
//! ```
//!
//! The planner never reads a clock or touches the network. Every method
//! that can schedule work takes `now`.

use tracing::{debug, info, warn};
use web_time::Instant;

use crate::bounds::BoundsFitter;
use crate::renderer::{Frame, MapRenderer, MapSurface};
use crate::resolver::{Resolution, RouteRequest, RouteResolver, Trigger};
use crate::selection::{SelectionMachine, SelectionState};
use crate::store::{StepPatch, WaypointStore};
use crate::types::{LonLat, Place, PlannerConfig, PlannerError, Route, WaypointSet, WaypointSlot};

/// A reverse-geocoding job for a freshly clicked waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeRequest {
    /// Slot that was assigned.
    pub slot: WaypointSlot,
    /// Coordinate that was assigned.
    pub coords: LonLat,
}

/// Work the I/O layer must carry out on the planner's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call [`RoutePlanner::tick`] at or after this instant.
    ScheduleWake(Instant),
    /// Send this request to the routing service and report back through
    /// [`RoutePlanner::route_resolved`].
    FetchRoute(RouteRequest),
    /// Reverse-geocode and report back through
    /// [`RoutePlanner::geocoded`].
    ReverseGeocode(GeocodeRequest),
    /// The start coordinate changed.
    StartChanged(Option<LonLat>),
    /// The end coordinate changed.
    EndChanged(Option<LonLat>),
    /// The ordered coordinates of the steps changed.
    StepsChanged(Vec<LonLat>),
    /// Anything about the waypoints changed, names included.
    WaypointsChanged(WaypointSet),
    /// The slot targeted by the next click changed.
    SelectionChanged(SelectionState),
    /// A new route replaced the previous one.
    RouteChanged(Route),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Projection {
    start: Option<LonLat>,
    end: Option<LonLat>,
    steps: Vec<LonLat>,
}

impl Projection {
    fn of(set: &WaypointSet) -> Self {
        Self {
            start: set.start_coords(),
            end: set.end_coords(),
            steps: set.step_coords(),
        }
    }
}

/// One interactive route-mapping session bound to a map surface.
pub struct RoutePlanner<S: MapSurface> {
    config: PlannerConfig,
    store: WaypointStore,
    selection: SelectionMachine,
    resolver: RouteResolver,
    fitter: BoundsFitter,
    route: Option<Route>,
    renderer: MapRenderer<S>,
    published: Projection,
    scheduled: Vec<LonLat>,
}

impl<S: MapSurface> RoutePlanner<S> {
    /// Start a session on `surface`.
    pub fn new(surface: S, config: PlannerConfig) -> Self {
        Self {
            resolver: RouteResolver::new(config.debounce_window()),
            fitter: BoundsFitter::from_config(&config),
            config,
            store: WaypointStore::new(),
            selection: SelectionMachine::new(),
            route: None,
            renderer: MapRenderer::new(surface),
            published: Projection::default(),
            scheduled: Vec::new(),
        }
    }

    /// Session settings.
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Snapshot of the current waypoints.
    #[must_use]
    pub fn snapshot(&self) -> WaypointSet {
        self.store.snapshot()
    }

    /// The route currently drawn, if any.
    pub const fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// The slot the next click fills.
    pub const fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    /// The renderer, for inspection.
    pub const fn renderer(&self) -> &MapRenderer<S> {
        &self.renderer
    }

    /// The renderer, for surface access by the I/O layer.
    pub const fn renderer_mut(&mut self) -> &mut MapRenderer<S> {
        &mut self.renderer
    }

    /// When the pending route resolution becomes due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.resolver.deadline()
    }

    /// The map style finished loading.
    pub fn style_loaded(&mut self) {
        self.renderer.style_loaded();
    }

    /// A click on the map at `coords`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] if `coords` is out of range;
    /// the session is left unchanged.
    pub fn click(&mut self, coords: LonLat, now: Instant) -> Result<Vec<Effect>, PlannerError> {
        let assignment = self.selection.click(&mut self.store, coords)?;
        debug!(slot = ?assignment.slot, lon = coords.lon, lat = coords.lat, "click assigned");
        let mut effects = self.after_mutation(now);
        effects.push(Effect::SelectionChanged(assignment.next));
        effects.push(Effect::ReverseGeocode(GeocodeRequest {
            slot: assignment.slot,
            coords,
        }));
        self.renderer.fly_to(coords, self.config.fly_to_zoom);
        Ok(effects)
    }

    /// A forward-geocoding pick: assign `place` to the slot the next
    /// click would fill, keeping its name.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] if the place is out of range;
    /// the session is left unchanged.
    pub fn choose_place(
        &mut self,
        place: &Place,
        now: Instant,
    ) -> Result<Vec<Effect>, PlannerError> {
        let assignment = self.selection.click(&mut self.store, place.coords)?;
        self.store.rename(assignment.slot, place.name.clone())?;
        debug!(slot = ?assignment.slot, name = %place.name, "place chosen");
        let mut effects = self.after_mutation(now);
        effects.push(Effect::SelectionChanged(assignment.next));
        self.renderer.fly_to(place.coords, self.config.fly_to_zoom);
        Ok(effects)
    }

    /// A reverse-geocoding answer for `request`.
    ///
    /// The name is applied only if the slot still holds the coordinate
    /// it was requested for. Failures keep the coordinate label.
    pub fn geocoded(
        &mut self,
        request: &GeocodeRequest,
        outcome: Result<String, PlannerError>,
    ) -> Vec<Effect> {
        let name = match outcome {
            Ok(name) if !name.trim().is_empty() => name,
            Ok(_) => {
                debug!(slot = ?request.slot, "geocoder returned an empty name, keeping label");
                return Vec::new();
            }
            Err(e) => {
                warn!(slot = ?request.slot, error = %e, "reverse geocoding failed, keeping label");
                return Vec::new();
            }
        };
        if self.store.coords_at(request.slot) != Some(request.coords) {
            debug!(slot = ?request.slot, "slot moved on before geocoding finished");
            return Vec::new();
        }
        if let Err(e) = self.store.rename(request.slot, name) {
            warn!(error = %e, "failed to apply geocoded name");
            return Vec::new();
        }
        let snapshot = self.store.snapshot();
        self.renderer.redraw(Frame {
            waypoints: snapshot.clone(),
            route: self.route.clone(),
        });
        vec![Effect::WaypointsChanged(snapshot)]
    }

    /// Set the start waypoint directly.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn set_start(
        &mut self,
        coords: LonLat,
        name: impl Into<String>,
        now: Instant,
    ) -> Result<Vec<Effect>, PlannerError> {
        self.store.set_start(coords, name)?;
        Ok(self.after_mutation(now))
    }

    /// Set the end waypoint directly.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn set_end(
        &mut self,
        coords: LonLat,
        name: impl Into<String>,
        now: Instant,
    ) -> Result<Vec<Effect>, PlannerError> {
        self.store.set_end(coords, name)?;
        Ok(self.after_mutation(now))
    }

    /// Remove the start waypoint.
    pub fn clear_start(&mut self, now: Instant) -> Vec<Effect> {
        self.store.clear_start();
        self.after_mutation(now)
    }

    /// Remove the end waypoint.
    pub fn clear_end(&mut self, now: Instant) -> Vec<Effect> {
        self.store.clear_end();
        self.after_mutation(now)
    }

    /// Append a step and return its index.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn add_step(
        &mut self,
        coords: Option<LonLat>,
        name: impl Into<String>,
        now: Instant,
    ) -> Result<(usize, Vec<Effect>), PlannerError> {
        let index = self.store.add_step(coords, name)?;
        Ok((index, self.after_mutation(now)))
    }

    /// Update the step at `index`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::StepOutOfRange`] or
    /// [`PlannerError::InvalidCoordinate`]; the session is unchanged.
    pub fn update_step(
        &mut self,
        index: usize,
        patch: StepPatch,
        now: Instant,
    ) -> Result<Vec<Effect>, PlannerError> {
        self.store.update_step(index, patch)?;
        Ok(self.after_mutation(now))
    }

    /// Remove the step at `index`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::StepOutOfRange`]; the session is unchanged.
    pub fn remove_step(&mut self, index: usize, now: Instant) -> Result<Vec<Effect>, PlannerError> {
        self.store.remove_step(index)?;
        Ok(self.after_mutation(now))
    }

    /// Remove every waypoint and the route.
    pub fn reset(&mut self, now: Instant) -> Vec<Effect> {
        self.store.reset();
        self.selection.set_state(SelectionState::AwaitingStart);
        let mut effects = self.after_mutation(now);
        effects.push(Effect::SelectionChanged(SelectionState::AwaitingStart));
        effects
    }

    /// Force the slot the next click fills.
    pub fn set_selection(&mut self, state: SelectionState) -> Vec<Effect> {
        if self.selection.state() == state {
            return Vec::new();
        }
        self.selection.set_state(state);
        vec![Effect::SelectionChanged(state)]
    }

    /// Timer wake-up: issue the pending route request if it is due.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        if let Some(request) = self.resolver.poll(now) {
            return vec![Effect::FetchRoute(request)];
        }
        self.resolver
            .deadline()
            .map(Effect::ScheduleWake)
            .into_iter()
            .collect()
    }

    /// The routing service answered `request`.
    pub fn route_resolved(
        &mut self,
        request: &RouteRequest,
        outcome: Result<Vec<LonLat>, PlannerError>,
    ) -> Vec<Effect> {
        let Resolution::Ready(route) = self.resolver.complete(request, outcome) else {
            return Vec::new();
        };
        info!(
            version = route.source_version(),
            points = route.len(),
            fallback = route.is_fallback(),
            "route resolved"
        );
        self.route = Some(route.clone());
        let snapshot = self.store.snapshot();
        if self.config.fit_on_resolve
            && let Some(fit) = self.fitter.fit(Some(&route), &snapshot)
        {
            self.renderer.fit(fit);
        }
        self.renderer.redraw(Frame {
            waypoints: snapshot,
            route: Some(route.clone()),
        });
        vec![Effect::RouteChanged(route)]
    }

    /// Fly the camera to `coords`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn fly_to(&mut self, coords: LonLat, zoom: f64) -> Result<(), PlannerError> {
        coords.validate()?;
        self.renderer.fly_to(coords, zoom);
        Ok(())
    }

    /// Frame the camera on the route, or on the waypoints when there is
    /// no route. Does nothing without coordinates.
    pub fn fit_view(&mut self) {
        if let Some(fit) = self.fitter.fit(self.route.as_ref(), &self.store.snapshot()) {
            self.renderer.fit(fit);
        }
    }

    /// End the session and hand back the surface with every marker and
    /// the path layer removed.
    pub fn teardown(self) -> S {
        self.renderer.teardown()
    }

    fn after_mutation(&mut self, now: Instant) -> Vec<Effect> {
        let snapshot = self.store.snapshot();
        let mut effects = self.publish(&snapshot);

        let coords = snapshot.routable_coords();
        if coords != self.scheduled {
            self.scheduled = coords;
            match self.resolver.schedule(snapshot.clone(), now) {
                Trigger::Scheduled(deadline) => effects.push(Effect::ScheduleWake(deadline)),
                Trigger::Cleared(empty) => {
                    if self.route.as_ref().is_some_and(|r| !r.is_empty()) {
                        effects.push(Effect::RouteChanged(empty.clone()));
                    }
                    self.route = Some(empty);
                }
            }
        }

        self.renderer.redraw(Frame {
            waypoints: snapshot.clone(),
            route: self.route.clone(),
        });
        effects.push(Effect::WaypointsChanged(snapshot));
        effects
    }

    fn publish(&mut self, snapshot: &WaypointSet) -> Vec<Effect> {
        let next = Projection::of(snapshot);
        let mut effects = Vec::new();
        if next.start != self.published.start {
            effects.push(Effect::StartChanged(next.start));
        }
        if next.end != self.published.end {
            effects.push(Effect::EndChanged(next.end));
        }
        if next.steps != self.published.steps {
            effects.push(Effect::StepsChanged(next.steps.clone()));
        }
        self.published = next;
        effects
    }
}
