//! tripline-route: Pure route-mapping engine (sans-IO).
//!
//! Keeps an ordered set of waypoints (start, steps, end), turns map
//! clicks into waypoint assignments, debounces changes into versioned
//! routing requests, falls back to straight segments when the routing
//! service fails, and keeps a map surface in sync:
//!
//! click -> store -> debounce -> route request -> resolution ->
//! redraw + camera fit.
//!
//! This crate has **no I/O dependencies** -- it never reads a clock,
//! touches the network or calls into a map library. Time is passed in,
//! services and the map are traits, and work for the outside world is
//! returned as [`Effect`] values. All browser interaction lives in
//! `tripline-io`.

pub mod bounds;
pub mod debounce;
pub mod fallback;
pub mod planner;
pub mod renderer;
pub mod resolver;
pub mod selection;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use bounds::{BoundsFitter, CameraFit};
pub use planner::{Effect, GeocodeRequest, RoutePlanner};
pub use renderer::{CameraMove, Frame, MapRenderer, MapSurface, MarkerStyle};
pub use resolver::{Resolution, RouteRequest, RouteResolver, Trigger, resolve_route, resolve_with};
pub use selection::{Assignment, SelectionMachine, SelectionState};
pub use service::{Geocoder, RoutingService};
pub use store::{StepPatch, WaypointStore};
pub use types::{
    LonLat, Place, PlannerConfig, PlannerError, Route, Waypoint, WaypointRole, WaypointSet,
    WaypointSlot,
};
pub use web_time::Instant;
