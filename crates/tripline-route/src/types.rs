//! Shared types for the tripline route-mapping engine.

use serde::{Deserialize, Serialize};

/// Valid longitude range in degrees.
pub const LON_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// Valid latitude range in degrees.
pub const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// A geographic position in WGS84 degrees, longitude first.
///
/// Longitude-first matches the order used by GeoJSON, OSRM and
/// MapLibre, so coordinates flow through the wire formats unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    /// Longitude in degrees, east positive.
    pub lon: f64,
    /// Latitude in degrees, north positive.
    pub lat: f64,
}

impl LonLat {
    /// Create a new coordinate without range checking.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Create a coordinate, rejecting values outside the valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidCoordinate`] when either component
    /// is non-finite or out of range.
    pub fn checked(lon: f64, lat: f64) -> Result<Self, PlannerError> {
        let coords = Self::new(lon, lat);
        coords.validate()?;
        Ok(coords)
    }

    /// Whether both components are finite and within range.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && LON_RANGE.contains(&self.lon)
            && LAT_RANGE.contains(&self.lat)
    }

    /// Check the coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidCoordinate`] when the coordinate
    /// is not [valid](Self::is_valid).
    pub fn validate(self) -> Result<(), PlannerError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(PlannerError::InvalidCoordinate {
                lon: self.lon,
                lat: self.lat,
            })
        }
    }

    /// Human-readable label used when no geocoded name is available.
    ///
    /// Latitude first with five decimals, e.g. `"41.30000, 69.20000"`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{:.5}, {:.5}", self.lat, self.lon)
    }
}

impl From<LonLat> for geo::Coord<f64> {
    fn from(value: LonLat) -> Self {
        Self {
            x: value.lon,
            y: value.lat,
        }
    }
}

impl From<geo::Coord<f64>> for LonLat {
    fn from(value: geo::Coord<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

/// The role a waypoint plays in a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointRole {
    /// Where the trip begins.
    Start,
    /// An intermediate stop.
    Step,
    /// Where the trip ends.
    End,
}

impl WaypointRole {
    /// Display label for the role.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Step => "Stop",
            Self::End => "End",
        }
    }
}

impl std::fmt::Display for WaypointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Addresses one slot of a [`WaypointSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaypointSlot {
    /// The start slot.
    Start,
    /// The step at the given index.
    Step(usize),
    /// The end slot.
    End,
}

/// A named point with a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Start, step or end.
    pub role: WaypointRole,
    /// Position, if one has been assigned.
    pub coords: Option<LonLat>,
    /// Name shown in sidebars and marker tooltips.
    pub name: String,
}

impl Waypoint {
    /// Create a waypoint.
    #[must_use]
    pub fn new(role: WaypointRole, coords: Option<LonLat>, name: impl Into<String>) -> Self {
        Self {
            role,
            coords,
            name: name.into(),
        }
    }
}

/// Immutable snapshot of the waypoint store.
///
/// Ordered `[start?, steps*, end?]`. `version` is the store version at
/// the time the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointSet {
    /// The start waypoint, if set.
    pub start: Option<Waypoint>,
    /// Intermediate stops in insertion order.
    pub steps: Vec<Waypoint>,
    /// The end waypoint, if set.
    pub end: Option<Waypoint>,
    /// Store version this snapshot was taken at.
    pub version: u64,
}

impl WaypointSet {
    /// Iterate all waypoints in route order.
    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.start
            .iter()
            .chain(self.steps.iter())
            .chain(self.end.iter())
    }

    /// Ordered coordinates `[start, steps.., end]`, skipping waypoints
    /// without coordinates.
    #[must_use]
    pub fn routable_coords(&self) -> Vec<LonLat> {
        self.iter().filter_map(|w| w.coords).collect()
    }

    /// Number of waypoints that carry coordinates.
    #[must_use]
    pub fn routable_count(&self) -> usize {
        self.iter().filter(|w| w.coords.is_some()).count()
    }

    /// Whether at least two waypoints carry coordinates.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        self.routable_count() >= 2
    }

    /// Start coordinate, if set.
    #[must_use]
    pub fn start_coords(&self) -> Option<LonLat> {
        self.start.as_ref().and_then(|w| w.coords)
    }

    /// End coordinate, if set.
    #[must_use]
    pub fn end_coords(&self) -> Option<LonLat> {
        self.end.as_ref().and_then(|w| w.coords)
    }

    /// Coordinates of the steps that have them, in order.
    #[must_use]
    pub fn step_coords(&self) -> Vec<LonLat> {
        self.steps.iter().filter_map(|w| w.coords).collect()
    }
}

/// A drawable path produced by the route resolver.
///
/// Routes are replaced wholesale by newer resolutions and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<LonLat>,
    is_fallback: bool,
    source_version: u64,
}

impl Route {
    /// A route with no points, meaning "nothing to draw".
    #[must_use]
    pub const fn empty(source_version: u64) -> Self {
        Self {
            points: Vec::new(),
            is_fallback: false,
            source_version,
        }
    }

    /// A route returned by the routing service.
    #[must_use]
    pub const fn from_service(points: Vec<LonLat>, source_version: u64) -> Self {
        Self {
            points,
            is_fallback: false,
            source_version,
        }
    }

    /// A straight-line route built locally.
    #[must_use]
    pub const fn fallback(points: Vec<LonLat>, source_version: u64) -> Self {
        Self {
            points,
            is_fallback: true,
            source_version,
        }
    }

    /// The path points in drawing order.
    #[must_use]
    pub fn points(&self) -> &[LonLat] {
        &self.points
    }

    /// Whether this route is the straight-line fallback.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    /// The waypoint version this route was resolved for.
    #[must_use]
    pub const fn source_version(&self) -> u64 {
        self.source_version
    }

    /// Returns `true` if the route has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the route has enough points to draw a line.
    #[must_use]
    pub const fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }

    /// First point, if any.
    #[must_use]
    pub fn first(&self) -> Option<LonLat> {
        self.points.first().copied()
    }

    /// Last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<LonLat> {
        self.points.last().copied()
    }
}

/// A forward-geocoding candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Display name of the place.
    pub name: String,
    /// Position of the place.
    pub coords: LonLat,
}

/// Tuning parameters for the route planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Quiet window in milliseconds that waypoint edits must settle for
    /// before a routing request is issued.
    pub debounce_ms: u64,

    /// Padding in screen pixels around fitted bounds.
    pub fit_padding: f64,

    /// Maximum zoom level a bounds fit may reach. Keeps a single point
    /// or two nearby points from zooming to street level.
    pub max_fit_zoom: f64,

    /// Zoom used when flying to a freshly clicked waypoint.
    pub fly_to_zoom: f64,

    /// Whether each resolved route reframes the camera.
    pub fit_on_resolve: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 400,
            fit_padding: 60.0,
            max_fit_zoom: 14.0,
            fly_to_zoom: 12.0,
            fit_on_resolve: true,
        }
    }
}

impl PlannerConfig {
    /// The debounce window as a [`Duration`](std::time::Duration).
    #[must_use]
    pub const fn debounce_window(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

/// Errors raised inside the route-mapping engine.
///
/// Only [`InvalidCoordinate`](Self::InvalidCoordinate) and
/// [`StepOutOfRange`](Self::StepOutOfRange) reach callers; the others
/// are absorbed by the planner with a degraded outcome.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    /// A coordinate was outside the WGS84 range.
    #[error("coordinate out of range: lon {lon}, lat {lat}")]
    InvalidCoordinate {
        /// Rejected longitude.
        lon: f64,
        /// Rejected latitude.
        lat: f64,
    },

    /// A step index did not address an existing step.
    #[error("step index {index} out of range ({len} steps)")]
    StepOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of steps at the time of the call.
        len: usize,
    },

    /// The routing service failed or returned no path.
    #[error("routing unavailable: {0}")]
    RoutingUnavailable(String),

    /// Forward or reverse geocoding failed.
    #[error("geocoding failed: {0}")]
    GeocodingFailed(String),

    /// A drawing operation on the map surface failed.
    #[error("map surface mutation failed: {0}")]
    SurfaceMutationFailed(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn set_with(
        start: Option<LonLat>,
        steps: &[Option<LonLat>],
        end: Option<LonLat>,
    ) -> WaypointSet {
        WaypointSet {
            start: start.map(|c| Waypoint::new(WaypointRole::Start, Some(c), "a")),
            steps: steps
                .iter()
                .map(|c| Waypoint::new(WaypointRole::Step, *c, "s"))
                .collect(),
            end: end.map(|c| Waypoint::new(WaypointRole::End, Some(c), "b")),
            version: 1,
        }
    }

    #[test]
    fn checked_rejects_out_of_range() {
        assert!(LonLat::checked(180.0, 90.0).is_ok());
        assert!(LonLat::checked(-180.0, -90.0).is_ok());
        assert_eq!(
            LonLat::checked(180.5, 0.0),
            Err(PlannerError::InvalidCoordinate {
                lon: 180.5,
                lat: 0.0
            })
        );
        assert!(LonLat::checked(0.0, -90.1).is_err());
        assert!(LonLat::checked(f64::NAN, 0.0).is_err());
        assert!(LonLat::checked(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn label_is_lat_first_with_five_decimals() {
        assert_eq!(LonLat::new(69.2, 41.3).label(), "41.30000, 69.20000");
    }

    #[test]
    fn routable_coords_skip_missing_and_keep_order() {
        let a = LonLat::new(1.0, 1.0);
        let s = LonLat::new(2.0, 2.0);
        let b = LonLat::new(3.0, 3.0);
        let set = set_with(Some(a), &[None, Some(s)], Some(b));
        assert_eq!(set.routable_coords(), vec![a, s, b]);
        assert_eq!(set.routable_count(), 3);
        assert!(set.is_routable());
        assert_eq!(set.iter().count(), 4);
    }

    #[test]
    fn single_point_is_not_routable() {
        let set = set_with(Some(LonLat::new(1.0, 1.0)), &[None], None);
        assert!(!set.is_routable());
        assert_eq!(set.step_coords(), Vec::new());
    }

    #[test]
    fn route_endpoints_and_drawability() {
        let route = Route::fallback(vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)], 3);
        assert!(route.is_fallback());
        assert!(route.is_drawable());
        assert_eq!(route.first(), Some(LonLat::new(0.0, 0.0)));
        assert_eq!(route.last(), Some(LonLat::new(1.0, 1.0)));
        assert_eq!(route.source_version(), 3);

        let empty = Route::empty(4);
        assert!(empty.is_empty());
        assert!(!empty.is_drawable());
        assert_eq!(empty.first(), None);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: PlannerConfig = serde_json::from_str(r#"{"debounce_ms": 250}"#).unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert!((config.max_fit_zoom - 14.0).abs() < f64::EPSILON);
        assert!(config.fit_on_resolve);
    }
}
