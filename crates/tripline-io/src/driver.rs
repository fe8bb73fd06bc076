//! Browser driver for the sans-IO route planner.
//!
//! [`PlannerHandle`] owns a [`RoutePlanner`] over a [`MapLibreSurface`],
//! forwards map events into it, and executes the effects it returns:
//! timer wake-ups via `gloo-timers`, routing and geocoding calls via
//! `spawn_local`, and change notifications via the observer callback.
//!
//! The planner lives in a `RefCell` that is only borrowed for the
//! duration of one synchronous planner call. Spawned tasks hold a
//! `Weak` reference and do their awaiting with no borrow outstanding,
//! so a late answer after teardown is simply dropped.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use tracing::{debug, info, warn};
use tripline_route::{
    Effect, Geocoder, Instant, LonLat, Place, PlannerError, Route, RoutePlanner, RoutingService,
    SelectionState, StepPatch, WaypointSet,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::config::AppConfig;
use crate::http::{NominatimClient, OsrmClient};
use crate::maplibre::{MapLibreMap, MapLibreSurface, event_lng_lat};

/// A change the surrounding UI may want to reflect.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerEvent {
    /// The start coordinate changed.
    StartChanged(Option<LonLat>),
    /// The end coordinate changed.
    EndChanged(Option<LonLat>),
    /// The ordered step coordinates changed.
    StepsChanged(Vec<LonLat>),
    /// Anything about the waypoints changed, names included.
    Waypoints(WaypointSet),
    /// The slot the next click fills changed.
    Selection(SelectionState),
    /// A new route was drawn or the route was cleared.
    Route(Route),
}

impl PlannerEvent {
    /// The notification carried by `effect`, if it is one.
    #[must_use]
    pub fn from_effect(effect: Effect) -> Option<Self> {
        match effect {
            Effect::StartChanged(c) => Some(Self::StartChanged(c)),
            Effect::EndChanged(c) => Some(Self::EndChanged(c)),
            Effect::StepsChanged(c) => Some(Self::StepsChanged(c)),
            Effect::WaypointsChanged(set) => Some(Self::Waypoints(set)),
            Effect::SelectionChanged(state) => Some(Self::Selection(state)),
            Effect::RouteChanged(route) => Some(Self::Route(route)),
            Effect::ScheduleWake(_) | Effect::FetchRoute(_) | Effect::ReverseGeocode(_) => None,
        }
    }
}

/// Milliseconds to sleep so that a timer fires at or after `at`.
#[must_use]
pub fn wake_delay_ms(at: Instant, now: Instant) -> u32 {
    let delay = at.saturating_duration_since(now) + Duration::from_millis(1);
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

type Listener = Closure<dyn FnMut(JsValue)>;

struct Driver {
    planner: RefCell<Option<RoutePlanner<MapLibreSurface>>>,
    router: OsrmClient,
    geocoder: NominatimClient,
    observer: Box<dyn Fn(PlannerEvent)>,
    wake_pending: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl Drop for Driver {
    fn drop(&mut self) {
        if let Some(planner) = self.planner.get_mut().take() {
            planner.teardown().into_map().destroy();
        }
    }
}

/// Shared handle to a live planner session.
///
/// Cloning is cheap; all clones drive the same session.
#[derive(Clone)]
pub struct PlannerHandle(Rc<Driver>);

impl PartialEq for PlannerHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PlannerHandle {
    /// Create a map inside `container` and start a session on it.
    ///
    /// `observer` receives every [`PlannerEvent`], outside of any planner
    /// borrow, so it may call back into the handle.
    ///
    /// # Errors
    ///
    /// [`PlannerError::SurfaceMutationFailed`] if the map cannot be
    /// created or rejects the event listeners.
    pub fn mount(
        container: &web_sys::HtmlElement,
        config: &AppConfig,
        observer: impl Fn(PlannerEvent) + 'static,
    ) -> Result<Self, PlannerError> {
        let map = MapLibreMap::create(container, &config.map)?;
        let mut listening = Ok(());
        let driver = Rc::new_cyclic(|weak: &Weak<Driver>| {
            let on_load = listener(weak, |handle, _| handle.style_loaded());
            let on_click = listener(weak, |handle, event| {
                let Some(coords) = event_lng_lat(&event) else {
                    warn!("map click without a position");
                    return;
                };
                if let Err(e) = handle.click(coords) {
                    warn!(error = %e, "ignoring map click");
                }
            });
            listening = map
                .listen("load", on_load.as_ref().unchecked_ref())
                .and_then(|()| map.listen("click", on_click.as_ref().unchecked_ref()));

            Driver {
                planner: RefCell::new(Some(RoutePlanner::new(
                    MapLibreSurface::new(map),
                    config.planner.clone(),
                ))),
                router: OsrmClient::new(config.services.clone()),
                geocoder: NominatimClient::new(config.services.clone()),
                observer: Box::new(observer),
                wake_pending: Cell::new(false),
                listeners: RefCell::new(vec![on_load, on_click]),
            }
        });
        // Dropping `driver` on failure destroys the map again.
        listening?;
        info!("route planner mounted");
        Ok(Self(driver))
    }

    /// Assign a clicked position through the selection machine.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn click(&self, coords: LonLat) -> Result<(), PlannerError> {
        self.try_update(|planner, now| planner.click(coords, now))
    }

    /// Assign a search result through the selection machine.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn choose_place(&self, place: &Place) -> Result<(), PlannerError> {
        self.try_update(|planner, now| planner.choose_place(place, now))
    }

    /// Set the start waypoint.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn set_start(&self, coords: LonLat, name: &str) -> Result<(), PlannerError> {
        self.try_update(|planner, now| planner.set_start(coords, name, now))
    }

    /// Set the end waypoint.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn set_end(&self, coords: LonLat, name: &str) -> Result<(), PlannerError> {
        self.try_update(|planner, now| planner.set_end(coords, name, now))
    }

    /// Remove the start waypoint.
    pub fn clear_start(&self) {
        self.update(RoutePlanner::clear_start);
    }

    /// Remove the end waypoint.
    pub fn clear_end(&self) {
        self.update(RoutePlanner::clear_end);
    }

    /// Append a step.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn add_step(&self, coords: Option<LonLat>, name: &str) -> Result<(), PlannerError> {
        self.try_update(|planner, now| planner.add_step(coords, name, now).map(|(_, e)| e))
    }

    /// Update the step at `index`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::StepOutOfRange`] or
    /// [`PlannerError::InvalidCoordinate`].
    pub fn update_step(&self, index: usize, patch: StepPatch) -> Result<(), PlannerError> {
        self.try_update(|planner, now| planner.update_step(index, patch, now))
    }

    /// Remove the step at `index`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::StepOutOfRange`].
    pub fn remove_step(&self, index: usize) -> Result<(), PlannerError> {
        self.try_update(|planner, now| planner.remove_step(index, now))
    }

    /// Remove every waypoint.
    pub fn reset(&self) {
        self.update(RoutePlanner::reset);
    }

    /// Force the slot the next click fills.
    pub fn set_selection(&self, state: SelectionState) {
        self.update(|planner, _| planner.set_selection(state));
    }

    /// Fly the camera to `coords`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::InvalidCoordinate`] for out-of-range input.
    pub fn fly_to(&self, coords: LonLat, zoom: f64) -> Result<(), PlannerError> {
        self.try_update(|planner, _| planner.fly_to(coords, zoom).map(|()| Vec::new()))
    }

    /// Frame the camera on the route, or the waypoints without one.
    pub fn fit_view(&self) {
        self.update(|planner, _| {
            planner.fit_view();
            Vec::new()
        });
    }

    /// The slot the next click fills.
    #[must_use]
    pub fn selection(&self) -> SelectionState {
        self.read(RoutePlanner::selection).unwrap_or_default()
    }

    /// Snapshot of the current waypoints.
    #[must_use]
    pub fn snapshot(&self) -> WaypointSet {
        self.read(RoutePlanner::snapshot).unwrap_or_default()
    }

    /// Candidate places for a free-text query.
    ///
    /// # Errors
    ///
    /// [`PlannerError::GeocodingFailed`] if the geocoder is unreachable.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    pub async fn search(&self, query: &str) -> Result<Vec<Place>, PlannerError> {
        let geocoder = self.0.geocoder.clone();
        geocoder.search(query).await
    }

    /// Remove markers and path, destroy the map and stop listening.
    /// Later calls on any clone are no-ops.
    pub fn teardown(&self) {
        let planner = self.0.planner.borrow_mut().take();
        if let Some(planner) = planner {
            planner.teardown().into_map().destroy();
            info!("route planner torn down");
        }
        self.0.listeners.borrow_mut().clear();
    }

    fn style_loaded(&self) {
        self.update(|planner, _| {
            planner.style_loaded();
            Vec::new()
        });
    }

    fn read<T>(&self, f: impl FnOnce(&RoutePlanner<MapLibreSurface>) -> T) -> Option<T> {
        let guard = self.0.planner.try_borrow().ok()?;
        guard.as_ref().map(f)
    }

    fn update(&self, f: impl FnOnce(&mut RoutePlanner<MapLibreSurface>, Instant) -> Vec<Effect>) {
        let _ = self.try_update(|planner, now| Ok(f(planner, now)));
    }

    fn try_update(
        &self,
        f: impl FnOnce(
            &mut RoutePlanner<MapLibreSurface>,
            Instant,
        ) -> Result<Vec<Effect>, PlannerError>,
    ) -> Result<(), PlannerError> {
        let effects = {
            let Ok(mut guard) = self.0.planner.try_borrow_mut() else {
                warn!("planner busy, dropping re-entrant call");
                return Ok(());
            };
            let Some(planner) = guard.as_mut() else {
                debug!("planner torn down, ignoring call");
                return Ok(());
            };
            f(planner, Instant::now())?
        };
        self.dispatch(effects);
        Ok(())
    }

    fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleWake(at) => self.schedule_wake(at),
                Effect::FetchRoute(request) => {
                    let router = self.0.router.clone();
                    let weak = Rc::downgrade(&self.0);
                    spawn_local(async move {
                        let outcome = router.route(&request.coords).await;
                        if let Some(driver) = weak.upgrade() {
                            Self(driver)
                                .update(|planner, _| planner.route_resolved(&request, outcome));
                        }
                    });
                }
                Effect::ReverseGeocode(request) => {
                    let geocoder = self.0.geocoder.clone();
                    let weak = Rc::downgrade(&self.0);
                    spawn_local(async move {
                        let outcome = geocoder.reverse(request.coords).await;
                        if let Some(driver) = weak.upgrade() {
                            Self(driver).update(|planner, _| planner.geocoded(&request, outcome));
                        }
                    });
                }
                notification => {
                    if let Some(event) = PlannerEvent::from_effect(notification) {
                        (self.0.observer)(event);
                    }
                }
            }
        }
    }

    fn schedule_wake(&self, at: Instant) {
        // A pending timer re-arms itself through `tick` if the deadline moved.
        if self.0.wake_pending.replace(true) {
            return;
        }
        let delay = wake_delay_ms(at, Instant::now());
        let weak = Rc::downgrade(&self.0);
        spawn_local(async move {
            TimeoutFuture::new(delay).await;
            if let Some(driver) = weak.upgrade() {
                driver.wake_pending.set(false);
                Self(driver).update(RoutePlanner::tick);
            }
        });
    }
}

fn listener(weak: &Weak<Driver>, f: impl Fn(&PlannerHandle, JsValue) + 'static) -> Listener {
    let weak = weak.clone();
    Closure::new(move |event: JsValue| {
        if let Some(driver) = weak.upgrade() {
            f(&PlannerHandle(driver), event);
        }
    })
}

#[cfg(test)]
mod tests {
    use tripline_route::{GeocodeRequest, RouteRequest, WaypointSlot};

    use super::*;

    #[test]
    fn only_notifications_reach_the_observer() {
        let now = Instant::now();
        assert_eq!(PlannerEvent::from_effect(Effect::ScheduleWake(now)), None);
        assert_eq!(
            PlannerEvent::from_effect(Effect::FetchRoute(RouteRequest {
                version: 1,
                coords: Vec::new(),
            })),
            None
        );
        assert_eq!(
            PlannerEvent::from_effect(Effect::ReverseGeocode(GeocodeRequest {
                slot: WaypointSlot::End,
                coords: LonLat::new(0.0, 0.0),
            })),
            None
        );
        assert_eq!(
            PlannerEvent::from_effect(Effect::SelectionChanged(SelectionState::AwaitingEnd)),
            Some(PlannerEvent::Selection(SelectionState::AwaitingEnd))
        );
        assert_eq!(
            PlannerEvent::from_effect(Effect::StartChanged(None)),
            Some(PlannerEvent::StartChanged(None))
        );
    }

    #[test]
    fn wake_delay_never_fires_early() {
        let now = Instant::now();
        assert_eq!(wake_delay_ms(now + Duration::from_millis(400), now), 401);
        assert_eq!(wake_delay_ms(now, now + Duration::from_secs(1)), 1);
    }
}
