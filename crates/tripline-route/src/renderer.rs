//! Map renderer: owns the map surface and keeps its markers and path
//! layer in step with the waypoints and the current route.
//!
//! The surface is unusable until its style has loaded. The renderer
//! models that as an explicit phase:
//!
//! ```text
//! Loading { queued frame, queued camera move } --style_loaded()--> Ready
//! ```
//!
//! While loading, the latest [`Frame`] and the latest camera move are
//! kept; older ones are superseded. Entering `Ready` flushes both, in
//! that order. The transition happens once.
//!
//! Markers are recreated wholesale on every frame. Each handle returned
//! by [`MapSurface::add_marker`] is owned by the renderer and handed
//! back to [`MapSurface::remove_marker`] on the next frame or on
//! [`MapRenderer::teardown`].
//!
//! Surface errors are logged and swallowed. Drawing is best-effort.

use tracing::{debug, warn};

use crate::bounds::CameraFit;
use crate::types::{LonLat, PlannerError, Route, Waypoint, WaypointRole, WaypointSet};

/// Fill color of the start marker.
pub const START_COLOR: &str = "#16a34a";

/// Fill color of the end marker.
pub const END_COLOR: &str = "#dc2626";

/// How a waypoint marker is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerStyle {
    /// A plain colored dot, used for start and end.
    Dot {
        /// CSS color of the dot.
        color: &'static str,
    },
    /// The traveler glyph, used for intermediate stops.
    Traveler,
}

impl MarkerStyle {
    /// The style for a waypoint role.
    #[must_use]
    pub const fn for_role(role: WaypointRole) -> Self {
        match role {
            WaypointRole::Start => Self::Dot { color: START_COLOR },
            WaypointRole::End => Self::Dot { color: END_COLOR },
            WaypointRole::Step => Self::Traveler,
        }
    }
}

/// Drawing operations the renderer needs from a map.
///
/// Implemented over MapLibre GL in the browser and by recording fakes
/// in tests.
pub trait MapSurface {
    /// Handle to a marker placed on the surface.
    type Marker;

    /// Place a marker for `waypoint` at `coords`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::SurfaceMutationFailed`] if the surface rejects it.
    fn add_marker(
        &mut self,
        waypoint: &Waypoint,
        coords: LonLat,
        style: MarkerStyle,
    ) -> Result<Self::Marker, PlannerError>;

    /// Remove a marker previously returned by [`add_marker`](Self::add_marker).
    ///
    /// # Errors
    ///
    /// [`PlannerError::SurfaceMutationFailed`] if the surface rejects it.
    fn remove_marker(&mut self, marker: Self::Marker) -> Result<(), PlannerError>;

    /// Create or replace the single path layer with `route`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::SurfaceMutationFailed`] if the surface rejects it.
    fn set_path(&mut self, route: &Route) -> Result<(), PlannerError>;

    /// Remove the path layer if it exists.
    ///
    /// # Errors
    ///
    /// [`PlannerError::SurfaceMutationFailed`] if the surface rejects it.
    fn remove_path(&mut self) -> Result<(), PlannerError>;

    /// Animate the camera to `center` at `zoom`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::SurfaceMutationFailed`] if the surface rejects it.
    fn fly_to(&mut self, center: LonLat, zoom: f64) -> Result<(), PlannerError>;

    /// Frame the camera on `fit`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::SurfaceMutationFailed`] if the surface rejects it.
    fn fit_bounds(&mut self, fit: &CameraFit) -> Result<(), PlannerError>;
}

/// Everything needed to draw one consistent picture.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Waypoints to mark.
    pub waypoints: WaypointSet,
    /// Route to draw; `None` or an undrawable route removes the path.
    pub route: Option<Route>,
}

/// An imperative camera move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMove {
    /// Fly to a point.
    FlyTo {
        /// Target center.
        center: LonLat,
        /// Target zoom.
        zoom: f64,
    },
    /// Fit a bounding box.
    Fit(CameraFit),
}

#[derive(Debug)]
enum Phase {
    Loading {
        frame: Option<Frame>,
        camera: Option<CameraMove>,
    },
    Ready,
}

/// Keeps a [`MapSurface`] synchronized with waypoints and route.
pub struct MapRenderer<S: MapSurface> {
    surface: S,
    phase: Phase,
    markers: Vec<S::Marker>,
    path_drawn: bool,
}

impl<S: MapSurface> MapRenderer<S> {
    /// Take ownership of a surface whose style has not loaded yet.
    pub const fn new(surface: S) -> Self {
        Self {
            surface,
            phase: Phase::Loading {
                frame: None,
                camera: None,
            },
            markers: Vec::new(),
            path_drawn: false,
        }
    }

    /// Whether the style has loaded.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready)
    }

    /// Number of markers currently on the surface.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Whether a path layer is currently drawn.
    #[must_use]
    pub const fn has_path(&self) -> bool {
        self.path_drawn
    }

    /// Shared access to the surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Exclusive access to the surface.
    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Record that the surface style finished loading and flush the
    /// queued frame and camera move.
    pub fn style_loaded(&mut self) {
        let Phase::Loading { frame, camera } = std::mem::replace(&mut self.phase, Phase::Ready)
        else {
            debug!("style_loaded called twice, ignoring");
            return;
        };
        debug!(queued_frame = frame.is_some(), queued_camera = camera.is_some(), "map style ready");
        if let Some(frame) = frame {
            self.draw(&frame);
        }
        if let Some(camera) = camera {
            self.apply_camera(camera);
        }
    }

    /// Draw `frame` now, or queue it until the style has loaded.
    pub fn redraw(&mut self, frame: Frame) {
        if let Phase::Loading { frame: queued, .. } = &mut self.phase {
            *queued = Some(frame);
            return;
        }
        self.draw(&frame);
    }

    /// Fly the camera to `center`.
    pub fn fly_to(&mut self, center: LonLat, zoom: f64) {
        self.camera(CameraMove::FlyTo { center, zoom });
    }

    /// Fit the camera to `fit`.
    pub fn fit(&mut self, fit: CameraFit) {
        self.camera(CameraMove::Fit(fit));
    }

    /// Remove every marker and the path layer and hand the surface back.
    pub fn teardown(mut self) -> S {
        self.clear_markers();
        if self.path_drawn {
            log_failure("remove path", self.surface.remove_path());
        }
        self.surface
    }

    fn camera(&mut self, camera: CameraMove) {
        if let Phase::Loading { camera: queued, .. } = &mut self.phase {
            *queued = Some(camera);
            return;
        }
        self.apply_camera(camera);
    }

    fn apply_camera(&mut self, camera: CameraMove) {
        let result = match camera {
            CameraMove::FlyTo { center, zoom } => self.surface.fly_to(center, zoom),
            CameraMove::Fit(fit) => self.surface.fit_bounds(&fit),
        };
        log_failure("move camera", result);
    }

    fn draw(&mut self, frame: &Frame) {
        self.clear_markers();
        for waypoint in frame.waypoints.iter() {
            let Some(coords) = waypoint.coords else {
                continue;
            };
            match self
                .surface
                .add_marker(waypoint, coords, MarkerStyle::for_role(waypoint.role))
            {
                Ok(marker) => self.markers.push(marker),
                Err(e) => warn!(role = %waypoint.role, error = %e, "failed to add marker"),
            }
        }

        match frame.route.as_ref().filter(|route| route.is_drawable()) {
            Some(route) => match self.surface.set_path(route) {
                Ok(()) => self.path_drawn = true,
                Err(e) => warn!(error = %e, "failed to draw path"),
            },
            None if self.path_drawn => match self.surface.remove_path() {
                Ok(()) => self.path_drawn = false,
                Err(e) => warn!(error = %e, "failed to remove path"),
            },
            None => {}
        }
    }

    fn clear_markers(&mut self) {
        for marker in self.markers.drain(..) {
            log_failure("remove marker", self.surface.remove_marker(marker));
        }
    }
}

fn log_failure(action: &str, result: Result<(), PlannerError>) {
    if let Err(e) = result {
        warn!(error = %e, "failed to {action}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingSurface, SurfaceCall};

    fn frame(points: &[(WaypointRole, f64, f64)], route: Option<Route>) -> Frame {
        let mut set = WaypointSet::default();
        for &(role, lon, lat) in points {
            let w = Waypoint::new(role, Some(LonLat::new(lon, lat)), role.label());
            match role {
                WaypointRole::Start => set.start = Some(w),
                WaypointRole::Step => set.steps.push(w),
                WaypointRole::End => set.end = Some(w),
            }
        }
        Frame {
            waypoints: set,
            route,
        }
    }

    fn line() -> Route {
        Route::from_service(vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)], 1)
    }

    #[test]
    fn frames_before_ready_are_queued_and_latest_wins() {
        let mut renderer = MapRenderer::new(RecordingSurface::default());
        renderer.redraw(frame(&[(WaypointRole::Start, 1.0, 1.0)], None));
        renderer.redraw(frame(
            &[(WaypointRole::Start, 1.0, 1.0), (WaypointRole::End, 2.0, 2.0)],
            Some(line()),
        ));
        assert!(renderer.surface().calls.is_empty());

        renderer.style_loaded();
        assert!(renderer.is_ready());
        assert_eq!(renderer.surface().live_markers(), 2);
        assert_eq!(renderer.surface().path.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn camera_moves_are_queued_until_ready() {
        let mut renderer = MapRenderer::new(RecordingSurface::default());
        renderer.fly_to(LonLat::new(5.0, 5.0), 10.0);
        renderer.fly_to(LonLat::new(6.0, 6.0), 11.0);
        assert!(renderer.surface().calls.is_empty());

        renderer.style_loaded();
        assert_eq!(
            renderer.surface().calls,
            vec![SurfaceCall::FlyTo(LonLat::new(6.0, 6.0), 11.0)]
        );
    }

    #[test]
    fn redraw_recreates_markers_per_role() {
        let mut renderer = MapRenderer::new(RecordingSurface::default());
        renderer.style_loaded();
        renderer.redraw(frame(
            &[
                (WaypointRole::Start, 69.2, 41.3),
                (WaypointRole::Step, 70.0, 42.0),
                (WaypointRole::End, 74.36, 31.52),
            ],
            Some(line()),
        ));
        renderer.redraw(frame(
            &[
                (WaypointRole::Start, 69.2, 41.3),
                (WaypointRole::Step, 70.0, 42.0),
                (WaypointRole::End, 74.36, 31.52),
            ],
            Some(line()),
        ));

        let surface = renderer.surface();
        assert_eq!(surface.live_markers(), 3);
        assert_eq!(renderer.marker_count(), 3);
        let styles: Vec<_> = surface.markers.values().map(|(_, style)| *style).collect();
        assert!(styles.contains(&MarkerStyle::Traveler));
        assert!(styles.contains(&MarkerStyle::Dot { color: START_COLOR }));
        assert!(styles.contains(&MarkerStyle::Dot { color: END_COLOR }));
    }

    #[test]
    fn undrawable_route_removes_path() {
        let mut renderer = MapRenderer::new(RecordingSurface::default());
        renderer.style_loaded();
        renderer.redraw(frame(
            &[(WaypointRole::Start, 0.0, 0.0), (WaypointRole::End, 1.0, 1.0)],
            Some(line()),
        ));
        assert!(renderer.has_path());

        renderer.redraw(frame(&[(WaypointRole::Start, 0.0, 0.0)], Some(Route::empty(2))));
        assert!(!renderer.has_path());
        assert_eq!(renderer.surface().path, None);
        assert_eq!(renderer.surface().live_markers(), 1);
    }

    #[test]
    fn surface_failures_are_swallowed() {
        let mut renderer = MapRenderer::new(RecordingSurface::failing());
        renderer.style_loaded();
        renderer.redraw(frame(
            &[(WaypointRole::Start, 0.0, 0.0), (WaypointRole::End, 1.0, 1.0)],
            Some(line()),
        ));
        renderer.fly_to(LonLat::new(0.0, 0.0), 3.0);
        assert_eq!(renderer.marker_count(), 0);
        assert!(!renderer.has_path());
    }

    #[test]
    fn failed_frame_does_not_block_the_next() {
        let mut renderer = MapRenderer::new(RecordingSurface::failing());
        renderer.style_loaded();
        let both = || {
            frame(
                &[(WaypointRole::Start, 0.0, 0.0), (WaypointRole::End, 1.0, 1.0)],
                Some(line()),
            )
        };
        renderer.redraw(both());
        assert_eq!(renderer.marker_count(), 0);

        renderer.surface_mut().fail = false;
        renderer.redraw(both());
        assert_eq!(renderer.marker_count(), 2);
        assert!(renderer.has_path());
        assert_eq!(renderer.surface().live_markers(), 2);
    }

    #[test]
    fn teardown_releases_every_handle() {
        let mut renderer = MapRenderer::new(RecordingSurface::default());
        renderer.style_loaded();
        renderer.redraw(frame(
            &[(WaypointRole::Start, 0.0, 0.0), (WaypointRole::End, 1.0, 1.0)],
            Some(line()),
        ));
        let surface = renderer.teardown();
        assert_eq!(surface.live_markers(), 0);
        assert_eq!(surface.path, None);
    }
}
