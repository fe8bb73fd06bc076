//! Integration test: feed recorded service bodies through the codecs and
//! the route engine, then encode the result for the map.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use tripline_route::{LonLat, PlannerError, WaypointStore, resolve_route};
use tripline_wire::{ServiceConfig, WireError, nominatim, osrm, route_geojson};

const OSRM_BODY: &str = r#"{
  "code": "Ok",
  "routes": [{
    "geometry": {"type": "LineString", "coordinates": [
      [69.2, 41.3], [69.8, 40.1], [71.4, 37.0], [73.0, 34.2], [74.36, 31.52]
    ]},
    "legs": [],
    "distance": 1480231.2,
    "duration": 71234.1
  }],
  "waypoints": [
    {"location": [69.2, 41.3], "name": ""},
    {"location": [74.36, 31.52], "name": ""}
  ]
}"#;

fn store() -> WaypointStore {
    let mut store = WaypointStore::new();
    store.set_start(LonLat::new(69.2, 41.3), "Tashkent").unwrap();
    store.set_end(LonLat::new(74.36, 31.52), "Lahore").unwrap();
    store
}

#[test]
fn osrm_answer_becomes_service_route() {
    let store = store();
    let snapshot = store.snapshot();
    let url = osrm::route_url(&ServiceConfig::default(), &snapshot.routable_coords()).unwrap();
    assert!(url.as_str().contains("/route/v1/driving/69.2,41.3;74.36,31.52"));

    let outcome = osrm::parse_route(OSRM_BODY).map_err(WireError::into_routing);
    let route = resolve_route(&snapshot, outcome);
    assert!(!route.is_fallback());
    assert_eq!(route.len(), 5);
    assert_eq!(route.first(), snapshot.start_coords());
    assert_eq!(route.last(), snapshot.end_coords());

    let json = route_geojson(&route).unwrap();
    assert!(json.contains("\"fallback\":false"));
}

#[test]
fn osrm_failure_becomes_fallback_route() {
    let snapshot = store().snapshot();
    let outcome = osrm::parse_route(r#"{"code": "InvalidQuery", "message": "bad"}"#)
        .map_err(WireError::into_routing);
    assert!(matches!(outcome, Err(PlannerError::RoutingUnavailable(_))));

    let route = resolve_route(&snapshot, outcome);
    assert!(route.is_fallback());
    assert_eq!(route.points(), snapshot.routable_coords().as_slice());
    assert!(route_geojson(&route).unwrap().contains("\"fallback\":true"));
}

#[test]
fn geocoder_failures_map_to_geocoding_errors() {
    let err = nominatim::parse_reverse(r#"{"error": "Unable to geocode"}"#)
        .map_err(WireError::into_geocoding)
        .unwrap_err();
    assert!(matches!(err, PlannerError::GeocodingFailed(ref m) if m.contains("Unable to geocode")));
}
