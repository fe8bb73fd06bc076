//! Nominatim geocoding codec.
//!
//! Reverse: `GET {base}/reverse?format=jsonv2&lat=..&lon=..` answers
//! `{ "display_name": .. }`, or `{ "error": .. }` when nothing is near.
//!
//! Search: `GET {base}/search?format=jsonv2&q=..&limit=..` answers an
//! array of `{ "display_name", "lat", "lon" }` with the numbers encoded
//! as strings.

use serde::Deserialize;
use tracing::warn;
use tripline_route::{LonLat, Place};
use url::Url;

use crate::{ServiceConfig, WireError, endpoint};

/// Build the reverse-geocoding URL for `coords`.
///
/// # Errors
///
/// [`WireError::Url`] or [`WireError::NotABase`] if the configured
/// geocoding URL is unusable.
pub fn reverse_url(config: &ServiceConfig, coords: LonLat) -> Result<Url, WireError> {
    let mut url = endpoint(&config.geocoding_url, &["reverse"])?;
    url.query_pairs_mut()
        .append_pair("format", "jsonv2")
        .append_pair("lat", &coords.lat.to_string())
        .append_pair("lon", &coords.lon.to_string());
    Ok(url)
}

/// Build the forward-geocoding URL for a free-text `query`.
///
/// # Errors
///
/// [`WireError::Url`] or [`WireError::NotABase`] if the configured
/// geocoding URL is unusable.
pub fn search_url(config: &ServiceConfig, query: &str) -> Result<Url, WireError> {
    let mut url = endpoint(&config.geocoding_url, &["search"])?;
    url.query_pairs_mut()
        .append_pair("format", "jsonv2")
        .append_pair("q", query.trim())
        .append_pair("limit", &config.search_limit.to_string());
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse a reverse-geocoding response into a display name.
///
/// # Errors
///
/// - [`WireError::Json`] for a body of the wrong shape.
/// - [`WireError::Service`] when the body carries an `error` field.
/// - [`WireError::NoResult`] when the display name is missing or blank.
pub fn parse_reverse(body: &str) -> Result<String, WireError> {
    let response: ReverseResponse = serde_json::from_str(body)?;
    if let Some(message) = response.error {
        return Err(WireError::Service {
            code: "error".to_owned(),
            message,
        });
    }
    response
        .display_name
        .filter(|name| !name.trim().is_empty())
        .ok_or(WireError::NoResult)
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    display_name: String,
    lat: String,
    lon: String,
}

impl SearchHit {
    fn into_place(self) -> Option<Place> {
        let (Ok(lon), Ok(lat)) = (self.lon.parse::<f64>(), self.lat.parse::<f64>()) else {
            warn!(
                lon = %self.lon,
                lat = %self.lat,
                "skipping search hit with unparsable coordinates"
            );
            return None;
        };
        match LonLat::checked(lon, lat) {
            Ok(coords) => Some(Place {
                name: self.display_name,
                coords,
            }),
            Err(e) => {
                warn!(error = %e, "skipping search hit outside WGS84 range");
                None
            }
        }
    }
}

/// Parse a search response into candidate places, best first.
///
/// Hits with unusable coordinates are skipped. An empty array is an
/// empty list, not an error.
///
/// # Errors
///
/// [`WireError::Json`] for a body that is not an array of hits.
pub fn parse_search(body: &str) -> Result<Vec<Place>, WireError> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)?;
    Ok(hits.into_iter().filter_map(SearchHit::into_place).collect())
}
