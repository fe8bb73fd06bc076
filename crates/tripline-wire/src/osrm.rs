//! OSRM route service codec.
//!
//! Request: `GET {base}/route/v1/{profile}/{lon},{lat};{lon},{lat}...
//! ?overview=full&geometries=geojson`.
//!
//! Response: `{ "code": "Ok", "routes": [{ "geometry": { "coordinates":
//! [[lon, lat], ...] }, "distance": m, "duration": s }] }`. Any code
//! other than `"Ok"`, or an empty route list, is a failure.

use serde::Deserialize;
use tracing::debug;
use tripline_route::LonLat;
use url::Url;

use crate::{ServiceConfig, WireError, endpoint};

/// Build the request URL for a path through `coords`, in order.
///
/// # Errors
///
/// [`WireError::Url`] or [`WireError::NotABase`] if the configured
/// routing URL is unusable.
pub fn route_url(config: &ServiceConfig, coords: &[LonLat]) -> Result<Url, WireError> {
    let waypoints = coords
        .iter()
        .map(|c| format!("{},{}", c.lon, c.lat))
        .collect::<Vec<_>>()
        .join(";");
    let mut url = endpoint(
        &config.routing_url,
        &["route", "v1", &config.routing_profile, &waypoints],
    )?;
    url.query_pairs_mut()
        .append_pair("overview", "full")
        .append_pair("geometries", "geojson");
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    geometry: LineGeometry,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// Parse a route response into the first route's geometry.
///
/// # Errors
///
/// - [`WireError::Json`] for a body that is not a route response.
/// - [`WireError::Service`] when `code` is not `"Ok"`.
/// - [`WireError::NoResult`] when there is no route or it has fewer
///   than two points.
pub fn parse_route(body: &str) -> Result<Vec<LonLat>, WireError> {
    let response: RouteResponse = serde_json::from_str(body)?;
    if response.code != "Ok" {
        return Err(WireError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    let route = response.routes.into_iter().next().ok_or(WireError::NoResult)?;
    debug!(
        points = route.geometry.coordinates.len(),
        distance_m = route.distance,
        duration_s = route.duration,
        "parsed route"
    );
    if route.geometry.coordinates.len() < 2 {
        return Err(WireError::NoResult);
    }
    Ok(route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| LonLat::new(lon, lat))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_lists_coordinates_lon_first() {
        let url = route_url(
            &ServiceConfig::default(),
            &[LonLat::new(69.2, 41.3), LonLat::new(70.0, 42.0), LonLat::new(74.36, 31.52)],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://router.project-osrm.org/route/v1/driving/69.2,41.3;70,42;74.36,31.52?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn url_respects_profile_and_trailing_slash() {
        let config = ServiceConfig {
            routing_url: "http://localhost:5000/osrm/".into(),
            routing_profile: "foot".into(),
            ..ServiceConfig::default()
        };
        let url = route_url(&config, &[LonLat::new(1.0, 2.0), LonLat::new(3.0, 4.0)]).unwrap();
        assert_eq!(url.path(), "/osrm/route/v1/foot/1,2;3,4");
    }

    #[test]
    fn bad_base_is_an_error() {
        let config = ServiceConfig {
            routing_url: "not a url".into(),
            ..ServiceConfig::default()
        };
        assert!(matches!(route_url(&config, &[]), Err(WireError::Url(_))));
    }

    #[test]
    fn parses_first_route_geometry() {
        let body = r#"{
            "code": "Ok",
            "routes": [
                {"geometry": {"type": "LineString", "coordinates": [[69.2, 41.3], [70.1, 40.0], [74.36, 31.52]]},
                 "distance": 1234.5, "duration": 99.0},
                {"geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
            ],
            "waypoints": []
        }"#;
        let points = parse_route(body).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], LonLat::new(69.2, 41.3));
        assert_eq!(points[2], LonLat::new(74.36, 31.52));
    }

    #[test]
    fn non_ok_code_is_service_error() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        match parse_route(body) {
            Err(WireError::Service { code, message }) => {
                assert_eq!(code, "NoRoute");
                assert!(message.contains("Impossible"));
            }
            other => unreachable!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_routes_is_no_result() {
        assert!(matches!(parse_route(r#"{"code": "Ok", "routes": []}"#), Err(WireError::NoResult)));
        assert!(matches!(
            parse_route(r#"{"code": "Ok", "routes": [{"geometry": {"coordinates": [[1, 1]]}}]}"#),
            Err(WireError::NoResult)
        ));
    }

    #[test]
    fn garbage_is_json_error() {
        assert!(matches!(parse_route("<html>502</html>"), Err(WireError::Json(_))));
    }
}
