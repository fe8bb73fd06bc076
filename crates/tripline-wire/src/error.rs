//! Codec errors.

use tripline_route::PlannerError;

/// Why a request could not be built or a response could not be read.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A configured base URL is not usable.
    #[error("invalid service URL: {0}")]
    Url(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `data:`).
    #[error("service URL cannot be a base: {0}")]
    NotABase(String),

    /// The response body is not the expected JSON.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with an error code.
    #[error("service error {code}: {message}")]
    Service {
        /// Service-specific status code.
        code: String,
        /// Human-readable detail, possibly empty.
        message: String,
    },

    /// The service answered successfully but found nothing.
    #[error("no result")]
    NoResult,
}

impl WireError {
    /// Map to the planner's routing failure.
    #[must_use]
    pub fn into_routing(self) -> PlannerError {
        PlannerError::RoutingUnavailable(self.to_string())
    }

    /// Map to the planner's geocoding failure.
    #[must_use]
    pub fn into_geocoding(self) -> PlannerError {
        PlannerError::GeocodingFailed(self.to_string())
    }
}
