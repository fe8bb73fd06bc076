//! tripline-wire: Pure wire codecs (sans-IO)
//!
//! Builds request URLs for and parses responses from the services the
//! route planner depends on:
//!
//! - OSRM `/route/v1` for road geometry,
//! - Nominatim `/search` and `/reverse` for geocoding,
//!
//! and encodes routes as GeoJSON for the map's path layer. Nothing here
//! performs a request; `tripline-io` sends the bytes.

pub mod config;
pub mod error;
pub mod nominatim;
pub mod osrm;
pub mod path_layer;

pub use config::ServiceConfig;
pub use error::WireError;
pub use path_layer::{route_feature_collection, route_geojson};

use url::Url;

/// Join `segments` onto `base`, tolerating a trailing slash on `base`.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, WireError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|()| WireError::NotABase(base.to_owned()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
