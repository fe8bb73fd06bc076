//! MapLibre GL bindings and the [`MapSurface`] built on them.
//!
//! The `maplibregl` global is provided by the MapLibre `<script>` tag the
//! app injects. Only the handful of calls the planner needs are bound.

use serde_json::json;
use tracing::{debug, warn};
use tripline_route::{CameraFit, LonLat, MapSurface, MarkerStyle, PlannerError, Route, Waypoint};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::MapConfig;

/// Id of the GeoJSON source holding the route.
pub const ROUTE_SOURCE: &str = "tripline-route";

/// Id of the line layer drawing [`ROUTE_SOURCE`].
pub const ROUTE_LAYER: &str = "tripline-route-line";

#[wasm_bindgen(js_namespace = maplibregl)]
extern "C" {
    /// `maplibregl.Map`.
    #[wasm_bindgen(js_name = Map)]
    pub type MapLibreMap;

    #[wasm_bindgen(catch, constructor, js_class = "Map")]
    fn new(options: &JsValue) -> Result<MapLibreMap, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn on(this: &MapLibreMap, event: &str, listener: &js_sys::Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = addSource)]
    fn add_source(this: &MapLibreMap, id: &str, source: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = getSource)]
    fn get_source(this: &MapLibreMap, id: &str) -> Result<Option<GeoJsonSource>, JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeSource)]
    fn remove_source(this: &MapLibreMap, id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = addLayer)]
    fn add_layer(this: &MapLibreMap, layer: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = getLayer)]
    fn get_layer(this: &MapLibreMap, id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeLayer)]
    fn remove_layer(this: &MapLibreMap, id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setPaintProperty)]
    fn set_paint_property(
        this: &MapLibreMap,
        layer: &str,
        name: &str,
        value: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = flyTo)]
    fn fly_to(this: &MapLibreMap, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = fitBounds)]
    fn fit_bounds(
        this: &MapLibreMap,
        bounds: &JsValue,
        options: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn remove(this: &MapLibreMap) -> Result<(), JsValue>;

    /// `maplibregl.Marker`.
    #[wasm_bindgen(js_name = Marker)]
    pub type MapLibreMarker;

    #[wasm_bindgen(catch, constructor, js_class = "Marker")]
    fn new(options: &JsValue) -> Result<MapLibreMarker, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setLngLat)]
    fn set_lng_lat(this: &MapLibreMarker, lng_lat: &JsValue) -> Result<MapLibreMarker, JsValue>;

    #[wasm_bindgen(method, catch, js_name = addTo)]
    fn add_to(this: &MapLibreMarker, map: &MapLibreMap) -> Result<MapLibreMarker, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn remove(this: &MapLibreMarker) -> Result<(), JsValue>;

    /// `maplibregl.GeoJSONSource`.
    #[wasm_bindgen(js_name = GeoJSONSource)]
    type GeoJsonSource;

    #[wasm_bindgen(method, catch, js_name = setData)]
    fn set_data(this: &GeoJsonSource, data: &JsValue) -> Result<(), JsValue>;
}

/// Whether the MapLibre script has finished loading.
#[must_use]
pub fn is_available() -> bool {
    web_sys::window()
        .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str("maplibregl")).ok())
        .is_some_and(|v| !v.is_undefined())
}

impl MapLibreMap {
    /// Create a map inside `container`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::SurfaceMutationFailed`] if MapLibre rejects the
    /// options (e.g. no WebGL).
    pub fn create(
        container: &web_sys::HtmlElement,
        config: &MapConfig,
    ) -> Result<Self, PlannerError> {
        let options = to_js(&json!({
            "style": config.style_url,
            "center": [config.center.lon, config.center.lat],
            "zoom": config.zoom,
        }))?;
        set(&options, "container", container)?;
        Self::new(&options).map_err(|e| failure("create map", &e))
    }

    /// Register `listener` for a map event such as `load` or `click`.
    ///
    /// # Errors
    ///
    /// [`PlannerError::SurfaceMutationFailed`] if MapLibre rejects the
    /// listener.
    pub fn listen(&self, event: &str, listener: &js_sys::Function) -> Result<(), PlannerError> {
        self.on(event, listener)
            .map_err(|e| failure(&format!("listen for {event}"), &e))
    }

    /// Destroy the map and release its WebGL context.
    pub fn destroy(&self) {
        if let Err(e) = self.remove() {
            warn!(error = %failure("destroy map", &e), "map teardown incomplete");
        }
    }
}

/// The position carried by a MapLibre mouse event.
#[must_use]
pub fn event_lng_lat(event: &JsValue) -> Option<LonLat> {
    let lng_lat = js_sys::Reflect::get(event, &JsValue::from_str("lngLat")).ok()?;
    let lng = js_sys::Reflect::get(&lng_lat, &JsValue::from_str("lng")).ok()?.as_f64()?;
    let lat = js_sys::Reflect::get(&lng_lat, &JsValue::from_str("lat")).ok()?.as_f64()?;
    Some(LonLat::new(lng, lat))
}

/// Which parts of the route layer `set_path` has to create.
///
/// Source and layer are checked separately, so a source left behind by
/// a failed layer creation gets its layer on the next draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathPlan {
    add_source: bool,
    add_layer: bool,
}

impl PathPlan {
    const fn for_map(has_source: bool, has_layer: bool) -> Self {
        Self {
            add_source: !has_source,
            add_layer: !has_layer,
        }
    }
}

/// [`MapSurface`] over a live MapLibre map.
pub struct MapLibreSurface {
    map: MapLibreMap,
}

impl MapLibreSurface {
    /// Wrap a map whose `load` event the caller forwards to the planner.
    #[must_use]
    pub const fn new(map: MapLibreMap) -> Self {
        Self { map }
    }

    /// The underlying map.
    #[must_use]
    pub const fn map(&self) -> &MapLibreMap {
        &self.map
    }

    /// Give the map back, e.g. to destroy it.
    #[must_use]
    pub fn into_map(self) -> MapLibreMap {
        self.map
    }

    fn route_source(&self) -> Result<Option<GeoJsonSource>, PlannerError> {
        self.map
            .get_source(ROUTE_SOURCE)
            .map_err(|e| failure("look up route source", &e))
    }

    fn has_route_layer(&self) -> Result<bool, PlannerError> {
        let layer = self
            .map
            .get_layer(ROUTE_LAYER)
            .map_err(|e| failure("look up route layer", &e))?;
        Ok(!layer.is_undefined() && !layer.is_null())
    }

    fn add_route_source(&self, data: &JsValue) -> Result<(), PlannerError> {
        debug!("creating route source");
        let source = js_sys::Object::new();
        set(&source, "type", &JsValue::from_str("geojson"))?;
        set(&source, "data", data)?;
        self.map
            .add_source(ROUTE_SOURCE, &source)
            .map_err(|e| failure("add route source", &e))
    }

    fn add_route_layer(&self) -> Result<(), PlannerError> {
        debug!("creating route layer");
        let layer = to_js(&json!({
            "id": ROUTE_LAYER,
            "type": "line",
            "source": ROUTE_SOURCE,
            "layout": { "line-join": "round", "line-cap": "round" },
            "paint": {
                "line-color": ["case", ["get", "fallback"], "#6b7280", "#2563eb"],
                "line-width": 4,
                "line-opacity": 0.85,
            },
        }))?;
        self.map
            .add_layer(&layer)
            .map_err(|e| failure("add route layer", &e))
    }

    // `line-dasharray` is not data-driven, so it follows the route kind.
    fn set_dash(&self, dashed: bool) -> Result<(), PlannerError> {
        let pattern = if dashed { json!([2, 2]) } else { json!([1, 0]) };
        self.map
            .set_paint_property(ROUTE_LAYER, "line-dasharray", &to_js(&pattern)?)
            .map_err(|e| failure("style route layer", &e))
    }
}

impl MapSurface for MapLibreSurface {
    type Marker = MapLibreMarker;

    fn add_marker(
        &mut self,
        waypoint: &Waypoint,
        coords: LonLat,
        style: MarkerStyle,
    ) -> Result<MapLibreMarker, PlannerError> {
        let element = marker_element(waypoint, style)?;
        let options = js_sys::Object::new();
        set(&options, "element", &element)?;
        set(&options, "anchor", &JsValue::from_str("center"))?;
        let position = to_js(&json!([coords.lon, coords.lat]))?;
        MapLibreMarker::new(&options)
            .and_then(|marker| marker.set_lng_lat(&position))
            .and_then(|marker| marker.add_to(&self.map))
            .map_err(|e| failure("add marker", &e))
    }

    fn remove_marker(&mut self, marker: MapLibreMarker) -> Result<(), PlannerError> {
        marker.remove().map_err(|e| failure("remove marker", &e))
    }

    fn set_path(&mut self, route: &Route) -> Result<(), PlannerError> {
        let geojson = tripline_wire::route_geojson(route)
            .map_err(|e| PlannerError::SurfaceMutationFailed(e.to_string()))?;
        let data = js_sys::JSON::parse(&geojson).map_err(|e| failure("parse path", &e))?;

        let plan = PathPlan::for_map(self.route_source()?.is_some(), self.has_route_layer()?);
        if plan.add_source {
            self.add_route_source(&data)?;
        } else if let Some(source) = self.route_source()? {
            source
                .set_data(&data)
                .map_err(|e| failure("update route source", &e))?;
        }
        if plan.add_layer {
            self.add_route_layer()?;
        }
        self.set_dash(route.is_fallback())
    }

    fn remove_path(&mut self) -> Result<(), PlannerError> {
        if self.has_route_layer()? {
            self.map
                .remove_layer(ROUTE_LAYER)
                .map_err(|e| failure("remove route layer", &e))?;
        }
        if self.route_source()?.is_some() {
            self.map
                .remove_source(ROUTE_SOURCE)
                .map_err(|e| failure("remove route source", &e))?;
        }
        Ok(())
    }

    fn fly_to(&mut self, center: LonLat, zoom: f64) -> Result<(), PlannerError> {
        let options = to_js(&json!({ "center": [center.lon, center.lat], "zoom": zoom }))?;
        self.map.fly_to(&options).map_err(|e| failure("fly to", &e))
    }

    fn fit_bounds(&mut self, fit: &CameraFit) -> Result<(), PlannerError> {
        let sw = fit.south_west();
        let ne = fit.north_east();
        let bounds = to_js(&json!([[sw.lon, sw.lat], [ne.lon, ne.lat]]))?;
        let options = to_js(&json!({ "padding": fit.padding, "maxZoom": fit.max_zoom }))?;
        self.map
            .fit_bounds(&bounds, &options)
            .map_err(|e| failure("fit bounds", &e))
    }
}

fn marker_element(
    waypoint: &Waypoint,
    style: MarkerStyle,
) -> Result<web_sys::Element, PlannerError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| PlannerError::SurfaceMutationFailed("no document".into()))?;
    let element = document
        .create_element("div")
        .map_err(|e| failure("create marker element", &e))?;
    let css = match style {
        MarkerStyle::Dot { color } => format!(
            "width:16px;height:16px;border-radius:50%;background:{color};\
             border:2px solid #fff;box-shadow:0 0 2px rgba(0,0,0,.5);cursor:pointer"
        ),
        MarkerStyle::Traveler => "font-size:22px;line-height:1;cursor:pointer".to_owned(),
    };
    if matches!(style, MarkerStyle::Traveler) {
        element.set_text_content(Some("\u{1f9f3}"));
    }
    element.set_class_name("tripline-marker");
    for (name, value) in [
        ("style", css.as_str()),
        ("title", waypoint.name.as_str()),
        ("aria-label", waypoint.role.label()),
    ] {
        element
            .set_attribute(name, value)
            .map_err(|e| failure("style marker", &e))?;
    }
    Ok(element)
}

fn to_js(value: &serde_json::Value) -> Result<JsValue, PlannerError> {
    js_sys::JSON::parse(&value.to_string()).map_err(|e| failure("encode options", &e))
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), PlannerError> {
    js_sys::Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| failure(key, &e))
}

fn failure(action: &str, error: &JsValue) -> PlannerError {
    let detail = error
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| error.as_string())
        .unwrap_or_else(|| "unknown error".to_owned());
    PlannerError::SurfaceMutationFailed(format!("{action}: {detail}"))
}
