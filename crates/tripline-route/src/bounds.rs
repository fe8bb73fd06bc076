//! Camera framing: an axis-aligned bounding box over the route, or over
//! the bare waypoints when no route has been drawn yet.

use geo::{BoundingRect, Coord, LineString, Rect};

use crate::types::{LonLat, PlannerConfig, Route, WaypointSet};

/// A request to fit the camera to `bounds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    /// Region that must be visible.
    pub bounds: Rect<f64>,
    /// Padding in screen pixels on every side.
    pub padding: f64,
    /// Zoom ceiling for the fit.
    pub max_zoom: f64,
}

impl CameraFit {
    /// South-west corner (minimum longitude and latitude).
    #[must_use]
    pub fn south_west(&self) -> LonLat {
        LonLat::from(self.bounds.min())
    }

    /// North-east corner (maximum longitude and latitude).
    #[must_use]
    pub fn north_east(&self) -> LonLat {
        LonLat::from(self.bounds.max())
    }

    /// Whether `point` lies inside the bounds, edges included.
    #[must_use]
    pub fn contains(&self, point: LonLat) -> bool {
        let min = self.bounds.min();
        let max = self.bounds.max();
        (min.x..=max.x).contains(&point.lon) && (min.y..=max.y).contains(&point.lat)
    }
}

/// Computes [`CameraFit`] requests with a fixed padding and zoom ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsFitter {
    padding: f64,
    max_zoom: f64,
}

impl BoundsFitter {
    /// Create a fitter.
    #[must_use]
    pub const fn new(padding: f64, max_zoom: f64) -> Self {
        Self { padding, max_zoom }
    }

    /// Create a fitter from planner settings.
    #[must_use]
    pub const fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.fit_padding, config.max_fit_zoom)
    }

    /// Fit an explicit list of points. `None` when the list is empty.
    #[must_use]
    pub fn fit_points(&self, points: &[LonLat]) -> Option<CameraFit> {
        let line: LineString<f64> = points.iter().copied().map(Coord::from).collect();
        let bounds = line.bounding_rect()?;
        Some(CameraFit {
            bounds,
            padding: self.padding,
            max_zoom: self.max_zoom,
        })
    }

    /// Fit the route when it is drawable, otherwise the waypoints that
    /// carry coordinates.
    #[must_use]
    pub fn fit(&self, route: Option<&Route>, waypoints: &WaypointSet) -> Option<CameraFit> {
        match route {
            Some(route) if route.is_drawable() => self.fit_points(route.points()),
            _ => self.fit_points(&waypoints.routable_coords()),
        }
    }
}

impl Default for BoundsFitter {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Waypoint, WaypointRole};

    #[test]
    fn box_contains_every_input() {
        let points = [
            LonLat::new(69.2, 41.3),
            LonLat::new(70.0, 42.0),
            LonLat::new(74.36, 31.52),
            LonLat::new(-10.5, 5.0),
        ];
        let fit = BoundsFitter::default().fit_points(&points).unwrap();
        for p in points {
            assert!(fit.contains(p), "{p:?} outside {fit:?}");
        }
        assert_eq!(fit.south_west(), LonLat::new(-10.5, 5.0));
        assert_eq!(fit.north_east(), LonLat::new(74.36, 42.0));
    }

    #[test]
    fn single_point_is_degenerate_box_with_zoom_ceiling() {
        let fitter = BoundsFitter::new(40.0, 12.0);
        let fit = fitter.fit_points(&[LonLat::new(3.0, 4.0)]).unwrap();
        assert_eq!(fit.south_west(), fit.north_east());
        assert!((fit.max_zoom - 12.0).abs() < f64::EPSILON);
        assert!((fit.padding - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_input_is_noop() {
        assert_eq!(BoundsFitter::default().fit_points(&[]), None);
        assert_eq!(BoundsFitter::default().fit(None, &WaypointSet::default()), None);
    }

    #[test]
    fn falls_back_to_waypoints_without_route() {
        let set = WaypointSet {
            start: Some(Waypoint::new(WaypointRole::Start, Some(LonLat::new(1.0, 1.0)), "a")),
            steps: vec![Waypoint::new(WaypointRole::Step, None, "unplaced")],
            end: None,
            version: 2,
        };
        let fit = BoundsFitter::default().fit(None, &set).unwrap();
        assert_eq!(fit.south_west(), LonLat::new(1.0, 1.0));

        let route = Route::from_service(vec![LonLat::new(0.0, 0.0), LonLat::new(5.0, 5.0)], 2);
        let fit = BoundsFitter::default().fit(Some(&route), &set).unwrap();
        assert_eq!(fit.north_east(), LonLat::new(5.0, 5.0));
    }
}
