//! HTTP clients for the routing and geocoding services.
//!
//! Both clients are thin: they build a URL with `tripline-wire`, `GET` it
//! with `gloo-net`, and hand the body back to `tripline-wire` to parse.
//! Every request races a `gloo-timers` timeout; losing the race is a
//! failure like any other.

use std::pin::pin;

use futures::future::{Either, select};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use tracing::debug;
use tripline_route::{Geocoder, LonLat, Place, PlannerError, RoutingService};
use tripline_wire::{ServiceConfig, WireError, nominatim, osrm};
use url::Url;

/// Why a `GET` did not produce a body.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("network error: {0}")]
    Network(#[from] gloo_net::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),

    /// No answer within the configured timeout.
    #[error("timed out after {0} ms")]
    Timeout(u32),

    /// The request could not be built or the body could not be parsed.
    #[error(transparent)]
    Wire(#[from] WireError),
}

impl FetchError {
    /// Map to the planner's routing failure.
    #[must_use]
    pub fn into_routing(self) -> PlannerError {
        match self {
            Self::Wire(e) => e.into_routing(),
            other => PlannerError::RoutingUnavailable(other.to_string()),
        }
    }

    /// Map to the planner's geocoding failure.
    #[must_use]
    pub fn into_geocoding(self) -> PlannerError {
        match self {
            Self::Wire(e) => e.into_geocoding(),
            other => PlannerError::GeocodingFailed(other.to_string()),
        }
    }
}

/// `GET` `url` and return the body text, giving up after `timeout_ms`.
///
/// # Errors
///
/// See [`FetchError`].
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn get_text(url: &Url, timeout_ms: u32) -> Result<String, FetchError> {
    debug!(%url, "GET");
    let fetch = pin!(async {
        let response = Request::get(url.as_str()).send().await?;
        if !response.ok() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.text().await?)
    });
    let timeout = pin!(TimeoutFuture::new(timeout_ms));
    match select(fetch, timeout).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right(((), _)) => Err(FetchError::Timeout(timeout_ms)),
    }
}

/// OSRM-backed [`RoutingService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsrmClient {
    config: ServiceConfig,
}

impl OsrmClient {
    /// Create a client for the configured routing server.
    #[must_use]
    pub const fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    #[allow(clippy::future_not_send)]
    async fn fetch(&self, coords: &[LonLat]) -> Result<Vec<LonLat>, FetchError> {
        let url = osrm::route_url(&self.config, coords)?;
        let body = get_text(&url, self.config.timeout_ms).await?;
        Ok(osrm::parse_route(&body)?)
    }
}

impl RoutingService for OsrmClient {
    async fn route(&self, coords: &[LonLat]) -> Result<Vec<LonLat>, PlannerError> {
        self.fetch(coords).await.map_err(FetchError::into_routing)
    }
}

/// Nominatim-backed [`Geocoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominatimClient {
    config: ServiceConfig,
}

impl NominatimClient {
    /// Create a client for the configured geocoder.
    #[must_use]
    pub const fn new(config: ServiceConfig) -> Self {
        Self { config }
    }
}

impl Geocoder for NominatimClient {
    async fn reverse(&self, coords: LonLat) -> Result<String, PlannerError> {
        let fetched = async {
            let url = nominatim::reverse_url(&self.config, coords)?;
            let body = get_text(&url, self.config.timeout_ms).await?;
            Ok::<_, FetchError>(nominatim::parse_reverse(&body)?)
        };
        fetched.await.map_err(FetchError::into_geocoding)
    }

    async fn search(&self, query: &str) -> Result<Vec<Place>, PlannerError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let fetched = async {
            let url = nominatim::search_url(&self.config, query)?;
            let body = get_text(&url, self.config.timeout_ms).await?;
            Ok::<_, FetchError>(nominatim::parse_search(&body)?)
        };
        fetched.await.map_err(FetchError::into_geocoding)
    }
}
