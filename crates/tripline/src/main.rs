use dioxus::prelude::*;
use tracing::info;
use tripline_io::{AppConfig, LocationSearch, PlannerEvent, PlannerHandle, RouteMap, WaypointPanel};
use tripline_route::{Route, SelectionState, WaypointSet};

/// MapLibre GL release the map bindings are written against.
const MAPLIBRE_VERSION: &str = "4.7.1";

fn main() {
    console_error_panic_hook::set_once();
    dioxus::launch(app);
}

/// Root application component.
///
/// Reads the runtime configuration, mounts the map, and mirrors the
/// planner's notifications into signals for the sidebar.
fn app() -> Element {
    // --- Application state ---
    let config = use_hook(AppConfig::from_window);
    let mut handle = use_signal(|| Option::<PlannerHandle>::None);
    let mut waypoints = use_signal(WaypointSet::default);
    let mut selection = use_signal(SelectionState::default);
    let mut route = use_signal(|| Option::<Route>::None);
    let mut error = use_signal(|| Option::<String>::None);

    // --- Planner notifications ---
    let on_event = move |event: PlannerEvent| match event {
        PlannerEvent::Waypoints(set) => waypoints.set(set),
        PlannerEvent::Selection(state) => selection.set(state),
        PlannerEvent::Route(new_route) => route.set(Some(new_route)),
        PlannerEvent::StartChanged(coords) => info!(?coords, "start changed"),
        PlannerEvent::EndChanged(coords) => info!(?coords, "end changed"),
        PlannerEvent::StepsChanged(coords) => info!(count = coords.len(), "steps changed"),
    };

    let maplibre_dist = format!("https://unpkg.com/maplibre-gl@{MAPLIBRE_VERSION}/dist");
    let maplibre_css = format!("{maplibre_dist}/maplibre-gl.css");
    let maplibre_js = format!("{maplibre_dist}/maplibre-gl.js");

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/theme.css") }
        link { rel: "stylesheet", href: "{maplibre_css}" }
        script { src: "{maplibre_js}" }
        script { src: "https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" }

        div { class: "min-h-screen bg-(--bg) text-(--text) flex flex-col",
            header { class: "px-6 py-4 border-b border-(--border)",
                h1 { class: "text-2xl", "tripline" }
                p { class: "text-(--muted) text-sm",
                    "Click the map to set a start and an end; add stops from search"
                }
            }

            div { class: "flex-1 flex flex-col lg:flex-row gap-6 p-6",
                // Map
                div { class: "flex-1 flex flex-col gap-4 min-h-[60vh]",
                    RouteMap {
                        config: config.clone(),
                        on_ready: move |h: PlannerHandle| handle.set(Some(h)),
                        on_event: on_event,
                        on_error: move |message: String| error.set(Some(message)),
                    }

                    if let Some(ref err) = error() {
                        div { class: "bg-(--error-bg) border border-(--error-border) rounded p-3",
                            p { class: "text-(--text-error) text-sm", "{err}" }
                        }
                    }
                }

                // Sidebar
                div { class: "lg:w-80 flex-shrink-0 flex flex-col gap-6",
                    LocationSearch { handle: handle() }
                    WaypointPanel {
                        waypoints: waypoints(),
                        selection: selection(),
                        route: route(),
                        handle: handle(),
                    }
                }
            }
        }
    }
}
