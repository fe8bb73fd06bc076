//! Service endpoints and limits.

use serde::{Deserialize, Serialize};

/// Where the routing and geocoding services live and how long to wait
/// for them.
///
/// All fields are optional in serialized form; missing ones take their
/// [`Default`] value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of an OSRM-compatible routing server.
    pub routing_url: String,

    /// OSRM profile segment, e.g. `driving`, `cycling`, `foot`.
    pub routing_profile: String,

    /// Base URL of a Nominatim-compatible geocoder.
    pub geocoding_url: String,

    /// Per-request timeout in milliseconds. A timeout counts as a
    /// service failure.
    pub timeout_ms: u32,

    /// Maximum number of forward-geocoding candidates.
    pub search_limit: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            routing_url: "https://router.project-osrm.org".to_owned(),
            routing_profile: "driving".to_owned(),
            geocoding_url: "https://nominatim.openstreetmap.org".to_owned(),
            timeout_ms: 8000,
            search_limit: 5,
        }
    }
}

impl ServiceConfig {
    /// Parse a JSON override. Unknown fields are ignored and missing
    /// ones keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if `json` is not a JSON object
    /// of the expected shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
