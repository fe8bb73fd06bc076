//! Straight-line fallback path.
//!
//! When the routing service is unreachable or finds nothing, each
//! consecutive pair of waypoints is connected with a straight segment.
//! The segments are concatenated as-is, so interior waypoints appear
//! twice (once as the end of one segment, once as the start of the
//! next): `[P0, P1, P2]` becomes `[P0, P1, P1, P2]`.

use geo::Line;

use crate::types::LonLat;

/// Build one straight segment per consecutive pair of waypoints.
#[must_use]
pub fn segments(waypoints: &[LonLat]) -> Vec<Line<f64>> {
    waypoints
        .windows(2)
        .filter_map(|pair| match pair {
            [a, b] => Some(Line::new(*a, *b)),
            _ => None,
        })
        .collect()
}

/// Connect consecutive waypoints with straight segments.
///
/// Returns an empty path for fewer than two waypoints.
#[must_use]
pub fn straight_path(waypoints: &[LonLat]) -> Vec<LonLat> {
    let lines = segments(waypoints);
    let mut points = Vec::with_capacity(lines.len() * 2);
    for line in lines {
        points.push(LonLat::from(line.start));
        points.push(LonLat::from(line.end));
    }
    points
}
