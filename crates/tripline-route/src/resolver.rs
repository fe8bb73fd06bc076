//! Route resolution: debounce waypoint changes, tag each routing call
//! with the waypoint version it was issued for, and fall back to
//! straight segments when the service cannot help.
//!
//! The resolver is driven from outside:
//!
//! 1. [`RouteResolver::schedule`] on every waypoint mutation,
//! 2. [`RouteResolver::poll`] once the returned deadline has passed,
//!    which hands out at most one [`RouteRequest`] per quiet window,
//! 3. [`RouteResolver::complete`] with the service outcome.
//!
//! Only the most recently issued request may produce a route. A late
//! answer for an older request is reported as [`Resolution::Stale`] and
//! must not be drawn.

use std::time::Duration;

use tracing::{debug, warn};
use web_time::Instant;

use crate::debounce::Debouncer;
use crate::fallback;
use crate::service::RoutingService;
use crate::types::{LonLat, PlannerError, Route, WaypointSet};

/// A routing call ready to be sent, tagged with its waypoint version.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Waypoint version the coordinates were taken from.
    pub version: u64,
    /// Ordered coordinates to route through.
    pub coords: Vec<LonLat>,
}

/// What a waypoint change did to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// A resolution is pending and becomes due at the given instant.
    Scheduled(Instant),
    /// Fewer than two points carry coordinates. Pending and in-flight
    /// work was invalidated and the route is now empty.
    Cleared(Route),
}

/// Outcome of feeding a service answer back into the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The answer belongs to the latest request.
    Ready(Route),
    /// The answer was superseded and has been dropped.
    Stale {
        /// Version the answer was issued for.
        version: u64,
        /// Version of the latest issued request, if any is live.
        latest: Option<u64>,
    },
}

/// Debounced, version-tagged route resolver.
#[derive(Debug, Clone)]
pub struct RouteResolver {
    debouncer: Debouncer<WaypointSet>,
    latest_issued: Option<u64>,
}

impl RouteResolver {
    /// Create a resolver with the given debounce window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(window),
            latest_issued: None,
        }
    }

    /// React to a waypoint change.
    pub fn schedule(&mut self, set: WaypointSet, now: Instant) -> Trigger {
        if set.is_routable() {
            let deadline = self.debouncer.push(set, now);
            Trigger::Scheduled(deadline)
        } else {
            if self.debouncer.cancel().is_some() || self.latest_issued.is_some() {
                debug!(version = set.version, "route cleared, dropping pending resolution");
            }
            self.latest_issued = None;
            Trigger::Cleared(Route::empty(set.version))
        }
    }

    /// When the pending resolution becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Version of the request whose answer would currently be accepted.
    #[must_use]
    pub const fn latest_issued(&self) -> Option<u64> {
        self.latest_issued
    }

    /// Issue the pending request if its quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<RouteRequest> {
        let set = self.debouncer.poll(now)?;
        let request = RouteRequest {
            version: set.version,
            coords: set.routable_coords(),
        };
        debug!(
            version = request.version,
            points = request.coords.len(),
            "issuing route request"
        );
        self.latest_issued = Some(request.version);
        Some(request)
    }

    /// Accept or drop the answer to `request`.
    pub fn complete(
        &mut self,
        request: &RouteRequest,
        outcome: Result<Vec<LonLat>, PlannerError>,
    ) -> Resolution {
        if self.latest_issued != Some(request.version) {
            debug!(
                version = request.version,
                latest = ?self.latest_issued,
                "dropping stale route"
            );
            return Resolution::Stale {
                version: request.version,
                latest: self.latest_issued,
            };
        }
        Resolution::Ready(build_route(request.version, &request.coords, outcome))
    }
}

/// Turn a waypoint set and a service outcome into a route.
///
/// Sets with fewer than two coordinate-bearing points produce an empty
/// route regardless of `outcome`.
#[must_use]
pub fn resolve_route(set: &WaypointSet, outcome: Result<Vec<LonLat>, PlannerError>) -> Route {
    if !set.is_routable() {
        return Route::empty(set.version);
    }
    build_route(set.version, &set.routable_coords(), outcome)
}

/// Resolve `set` by calling `service` directly, without debouncing.
#[allow(clippy::future_not_send)]
pub async fn resolve_with<S: RoutingService>(service: &S, set: &WaypointSet) -> Route {
    if !set.is_routable() {
        return Route::empty(set.version);
    }
    let coords = set.routable_coords();
    let outcome = service.route(&coords).await;
    build_route(set.version, &coords, outcome)
}

fn build_route(
    version: u64,
    coords: &[LonLat],
    outcome: Result<Vec<LonLat>, PlannerError>,
) -> Route {
    match outcome {
        Ok(points) if points.len() >= 2 => Route::from_service(points, version),
        Ok(points) => {
            warn!(
                version,
                returned = points.len(),
                "routing service returned no path, using straight segments"
            );
            Route::fallback(fallback::straight_path(coords), version)
        }
        Err(e) => {
            warn!(version, error = %e, "routing failed, using straight segments");
            Route::fallback(fallback::straight_path(coords), version)
        }
    }
}
