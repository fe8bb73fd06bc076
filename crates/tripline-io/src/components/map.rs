//! The interactive map.

use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use tracing::warn;
use tripline_route::PlannerError;
use wasm_bindgen::JsCast;

use crate::config::AppConfig;
use crate::driver::{PlannerEvent, PlannerHandle};
use crate::maplibre;

/// DOM id of the element the map renders into.
pub const MAP_CONTAINER_ID: &str = "tripline-map";

/// How often to check whether the MapLibre script has loaded.
const SCRIPT_POLL_MS: u32 = 100;

/// How many checks before trying anyway and reporting the failure.
const SCRIPT_POLL_ATTEMPTS: u32 = 100;

/// Props for the [`RouteMap`] component.
#[derive(Props, Clone, PartialEq)]
pub struct RouteMapProps {
    /// Map, planner and service settings.
    config: AppConfig,
    /// Receives the session handle once the map exists.
    on_ready: EventHandler<PlannerHandle>,
    /// Receives every planner notification.
    on_event: EventHandler<PlannerEvent>,
    /// Receives a message if the map cannot be created.
    on_error: EventHandler<String>,
}

/// Renders the map container and runs a planner session on it.
///
/// The session is created once, after the container is in the DOM and
/// the MapLibre script is available, and torn down when the component
/// unmounts.
#[component]
pub fn RouteMap(props: RouteMapProps) -> Element {
    let session = use_hook(|| Rc::new(RefCell::new(Option::<PlannerHandle>::None)));

    let mount_session = Rc::clone(&session);
    let config = props.config.clone();
    let on_ready = props.on_ready;
    let on_event = props.on_event;
    let on_error = props.on_error;
    use_effect(move || {
        if mount_session.borrow().is_some() {
            return;
        }
        let session = Rc::clone(&mount_session);
        let config = config.clone();
        spawn(async move {
            for _ in 0..SCRIPT_POLL_ATTEMPTS {
                if maplibre::is_available() {
                    break;
                }
                TimeoutFuture::new(SCRIPT_POLL_MS).await;
            }
            match mount(&config, on_event) {
                Ok(handle) => {
                    *session.borrow_mut() = Some(handle.clone());
                    on_ready.call(handle);
                }
                Err(e) => {
                    warn!(error = %e, "failed to create map");
                    on_error.call(e.to_string());
                }
            }
        });
    });

    let drop_session = Rc::clone(&session);
    use_drop(move || {
        if let Some(handle) = drop_session.borrow_mut().take() {
            handle.teardown();
        }
    });

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "w-full h-full min-h-[60vh] rounded overflow-hidden",
        }
    }
}

fn mount(
    config: &AppConfig,
    on_event: EventHandler<PlannerEvent>,
) -> Result<PlannerHandle, PlannerError> {
    let container = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(MAP_CONTAINER_ID))
        .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok())
        .ok_or_else(|| PlannerError::SurfaceMutationFailed("map container missing".into()))?;
    PlannerHandle::mount(&container, config, move |event| on_event.call(event))
}
