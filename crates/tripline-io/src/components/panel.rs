//! Waypoint sidebar: lists start, stops and end, and offers the
//! selection toggle, removal, renaming and camera actions.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdFlag, LdMapPin, LdRotateCcw, LdScan, LdX};
use tracing::warn;
use tripline_route::{
    LonLat, PlannerError, Route, SelectionState, StepPatch, Waypoint, WaypointSet, WaypointSlot,
};

use crate::driver::PlannerHandle;

/// Props for the [`WaypointPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct WaypointPanelProps {
    /// Current waypoints.
    waypoints: WaypointSet,
    /// The slot the next map click fills.
    selection: SelectionState,
    /// The route currently drawn, if any.
    route: Option<Route>,
    /// Session to act on; actions are disabled until the map is ready.
    handle: Option<PlannerHandle>,
}

/// Renders the waypoint list and its actions.
#[component]
#[allow(clippy::too_many_lines)]
pub fn WaypointPanel(props: WaypointPanelProps) -> Element {
    let disabled = props.handle.is_none();
    let handle = props.handle.clone();
    let act = move |f: fn(&PlannerHandle)| {
        let handle = handle.clone();
        move |_: MouseEvent| {
            if let Some(h) = &handle {
                f(h);
            }
        }
    };

    let start_active = props.selection == SelectionState::AwaitingStart;
    let end_active = !start_active;
    let prompt = props.selection.prompt();
    let summary = props.route.as_ref().filter(|r| r.is_drawable()).map(route_summary);
    let entries = rows(&props.waypoints);
    let start_class = toggle_class(start_active, "bg-green-600");
    let end_class = toggle_class(end_active, "bg-red-600");

    rsx! {
        div { class: "flex flex-col gap-3",
            // Selection toggle
            div { class: "flex gap-2",
                button {
                    class: "{start_class}",
                    disabled: disabled,
                    aria_pressed: "{start_active}",
                    onclick: act(|h| h.set_selection(SelectionState::AwaitingStart)),
                    Icon { width: 16, height: 16, icon: LdFlag }
                    " Pick start"
                }
                button {
                    class: "{end_class}",
                    disabled: disabled,
                    aria_pressed: "{end_active}",
                    onclick: act(|h| h.set_selection(SelectionState::AwaitingEnd)),
                    Icon { width: 16, height: 16, icon: LdMapPin }
                    " Pick end"
                }
            }
            p { class: "text-sm text-(--muted)", "{prompt}" }

            // Waypoint list
            if entries.is_empty() {
                p { class: "text-sm text-(--text-placeholder) italic",
                    "Click the map to place a start point."
                }
            }
            ul { class: "flex flex-col gap-1",
                for (slot, waypoint) in entries {
                    WaypointRow {
                        key: "{slot:?}",
                        slot: slot,
                        waypoint: waypoint,
                        handle: props.handle.clone(),
                    }
                }
            }

            // Route summary
            if let Some(summary) = summary {
                p { class: "text-sm text-(--text-secondary)", "{summary}" }
            }

            // Camera and reset
            div { class: "flex gap-2",
                button {
                    class: "flex-1 px-3 py-2 rounded border",
                    disabled: disabled,
                    onclick: act(PlannerHandle::fit_view),
                    Icon { width: 16, height: 16, icon: LdScan }
                    " Fit route"
                }
                button {
                    class: "flex-1 px-3 py-2 rounded border",
                    disabled: disabled,
                    onclick: act(PlannerHandle::reset),
                    Icon { width: 16, height: 16, icon: LdRotateCcw }
                    " Reset"
                }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct WaypointRowProps {
    slot: WaypointSlot,
    waypoint: Waypoint,
    handle: Option<PlannerHandle>,
}

#[component]
fn WaypointRow(props: WaypointRowProps) -> Element {
    let slot = props.slot;
    let remove_handle = props.handle.clone();
    let rename_handle = props.handle.clone();
    let editable = matches!(slot, WaypointSlot::Step(_));
    let role = props.waypoint.role;
    let name = props.waypoint.name.clone();
    let coords = format_coords(props.waypoint.coords);
    let can_remove = props.handle.is_some();

    rsx! {
        li { class: "flex items-center gap-2 bg-(--surface) rounded px-2 py-1",
            span { class: "text-xs font-semibold w-10 shrink-0", "{role}" }
            div { class: "flex-1 min-w-0",
                if editable {
                    input {
                        class: "w-full bg-transparent text-sm",
                        value: "{name}",
                        onchange: move |e: FormEvent| {
                            if let (Some(h), WaypointSlot::Step(index)) = (&rename_handle, slot) {
                                let patch = StepPatch::rename(e.value());
                                report("rename stop", h.update_step(index, patch));
                            }
                        },
                    }
                } else {
                    p { class: "text-sm truncate", title: "{name}", "{name}" }
                }
                p { class: "text-xs text-(--muted)", "{coords}" }
            }
            button {
                class: "p-1 rounded hover:bg-(--border)",
                aria_label: "Remove",
                disabled: !can_remove,
                onclick: move |_| {
                    let Some(h) = &remove_handle else {
                        return;
                    };
                    match slot {
                        WaypointSlot::Start => h.clear_start(),
                        WaypointSlot::End => h.clear_end(),
                        WaypointSlot::Step(index) => {
                            report("remove stop", h.remove_step(index));
                        }
                    }
                },
                Icon { width: 14, height: 14, icon: LdX }
            }
        }
    }
}

/// Waypoints in route order, tagged with their slot.
fn rows(set: &WaypointSet) -> Vec<(WaypointSlot, Waypoint)> {
    let start = set.start.iter().map(|w| (WaypointSlot::Start, w.clone()));
    let steps = set
        .steps
        .iter()
        .enumerate()
        .map(|(i, w)| (WaypointSlot::Step(i), w.clone()));
    let end = set.end.iter().map(|w| (WaypointSlot::End, w.clone()));
    start.chain(steps).chain(end).collect()
}

/// Classes for a selection toggle button, filled with `fill` when active.
fn toggle_class(active: bool, fill: &str) -> String {
    if active {
        format!("flex-1 px-3 py-2 rounded {fill} text-white")
    } else {
        "flex-1 px-3 py-2 rounded border".to_owned()
    }
}

/// Log a failed row action. Returns whether it succeeded.
fn report(action: &str, result: Result<(), PlannerError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "cannot {action}");
            false
        }
    }
}

/// Coordinates as shown under a waypoint name.
fn format_coords(coords: Option<LonLat>) -> String {
    coords.map_or_else(|| "not placed".to_owned(), LonLat::label)
}

/// One-line description of a drawn route.
fn route_summary(route: &Route) -> String {
    if route.is_fallback() {
        format!("Straight-line route ({} points); routing service unavailable", route.len())
    } else {
        format!("Road route with {} points", route.len())
    }
}
