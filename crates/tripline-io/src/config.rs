//! Runtime configuration.
//!
//! The host page may define a global `TRIPLINE_CONFIG` string holding a
//! JSON object with any of the `planner`, `services` and `map` sections.
//! Missing sections and fields keep their defaults; an absent global or
//! unparsable JSON yields [`AppConfig::default`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tripline_route::{LonLat, PlannerConfig};
use tripline_wire::ServiceConfig;
use wasm_bindgen::JsValue;

/// Name of the global the host page sets.
pub const CONFIG_GLOBAL: &str = "TRIPLINE_CONFIG";

/// Initial map view and basemap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// MapLibre style document URL.
    pub style_url: String,
    /// Initial center.
    pub center: LonLat,
    /// Initial zoom.
    pub zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style_url: "https://demotiles.maplibre.org/style.json".to_owned(),
            center: LonLat::new(69.24, 41.31),
            zoom: 4.0,
        }
    }
}

/// Everything the web app can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Debounce, camera and fit tuning.
    pub planner: PlannerConfig,
    /// Service endpoints and limits.
    pub services: ServiceConfig,
    /// Basemap and initial view.
    pub map: MapConfig,
}

impl AppConfig {
    /// Parse a JSON override, falling back to defaults on error.
    #[must_use]
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring malformed {CONFIG_GLOBAL}");
            Self::default()
        })
    }

    /// Read the configuration from the `TRIPLINE_CONFIG` global.
    #[must_use]
    pub fn from_window() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let Ok(value) = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL)) else {
            return Self::default();
        };
        value.as_string().map_or_else(
            || {
                debug!("no {CONFIG_GLOBAL} set, using defaults");
                Self::default()
            },
            |json| Self::from_json(&json),
        )
    }
}
