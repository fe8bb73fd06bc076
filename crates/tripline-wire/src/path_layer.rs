//! GeoJSON encoding of a route for the map's path layer.
//!
//! A drawable route becomes a one-feature `FeatureCollection` whose
//! `LineString` follows the route points. The feature carries
//! `fallback` (straight segments rather than road geometry) and
//! `version` (waypoint version the route was built from) so the layer
//! style can tell them apart. Routes with fewer than two points encode
//! as an empty collection, which clears the layer.

use geo::LineString;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use tripline_route::Route;

use crate::WireError;

/// Encode `route` as a feature collection.
#[must_use]
pub fn route_feature_collection(route: &Route) -> FeatureCollection {
    if !route.is_drawable() {
        return std::iter::empty::<Feature>().collect();
    }
    let line: LineString<f64> = route.points().iter().copied().map(geo::Coord::from).collect();
    let mut feature = Feature::from(Geometry::new(geojson::Value::from(&line)));
    feature.set_property("fallback", route.is_fallback());
    feature.set_property("version", route.source_version());
    std::iter::once(feature).collect()
}

/// Encode `route` as a GeoJSON string.
///
/// # Errors
///
/// [`WireError::Json`] if serialization fails.
pub fn route_geojson(route: &Route) -> Result<String, WireError> {
    Ok(serde_json::to_string(&GeoJson::from(route_feature_collection(route)))?)
}
