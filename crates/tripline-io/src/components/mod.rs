//! Dioxus UI components for tripline.
//!
//! Provides the map, the waypoint sidebar and the location search box.

mod map;
mod panel;
mod search;

pub use map::{MAP_CONTAINER_ID, RouteMap};
pub use panel::WaypointPanel;
pub use search::LocationSearch;
