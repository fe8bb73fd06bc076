//! Seams to the external routing and geocoding services.
//!
//! The engine only depends on these traits. The browser crate implements
//! them over HTTP; tests implement them with canned answers.

use std::future::Future;

use crate::types::{LonLat, Place, PlannerError};

/// Resolves a path through an ordered list of coordinates.
pub trait RoutingService {
    /// Request a path visiting `coords` in order.
    ///
    /// An `Ok` with no points is treated the same as an error.
    fn route(&self, coords: &[LonLat]) -> impl Future<Output = Result<Vec<LonLat>, PlannerError>>;
}

/// Converts between place names and coordinates.
pub trait Geocoder {
    /// Best-match display name for a coordinate.
    fn reverse(&self, coords: LonLat) -> impl Future<Output = Result<String, PlannerError>>;

    /// Candidate places for a free-text query, best first.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Place>, PlannerError>>;
}
