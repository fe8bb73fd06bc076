//! tripline-io: Browser I/O and Dioxus component library.
//!
//! Talks to the routing and geocoding services over `fetch`, binds the
//! MapLibre GL map as the planner's drawing surface, drives the
//! sans-IO [`RoutePlanner`](tripline_route::RoutePlanner) from browser
//! events and timers, and provides the map, waypoint panel and search
//! components for the tripline web application.

pub mod components;
pub mod config;
pub mod driver;
pub mod http;
pub mod maplibre;

pub use components::{LocationSearch, RouteMap, WaypointPanel};
pub use config::AppConfig;
pub use driver::{PlannerEvent, PlannerHandle};
pub use http::{NominatimClient, OsrmClient};
