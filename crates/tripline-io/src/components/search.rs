//! Free-text place search.
//!
//! Results can be used for the slot the next click would fill, or added
//! as an intermediate stop. Each search bumps a generation counter so a
//! slow answer to an older query never replaces a newer one.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdPlus, LdSearch};
use tracing::warn;
use tripline_route::Place;

use crate::driver::PlannerHandle;

/// Props for the [`LocationSearch`] component.
#[derive(Props, Clone, PartialEq)]
pub struct LocationSearchProps {
    /// Session to search with; the box is disabled until the map is ready.
    handle: Option<PlannerHandle>,
}

/// Renders a search box and its result list.
#[component]
pub fn LocationSearch(props: LocationSearchProps) -> Element {
    let mut query = use_signal(String::new);
    let mut results = use_signal(Vec::<Place>::new);
    let mut searching = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    let mut generation = use_signal(|| 0u64);

    let search_handle = props.handle.clone();
    let on_submit = move |e: FormEvent| {
        e.prevent_default();
        let Some(handle) = search_handle.clone() else {
            return;
        };
        let (my_generation, text) = next_search(*generation.peek(), &query());
        generation.set(my_generation);
        error.set(None);
        let Some(text) = text else {
            results.set(Vec::new());
            searching.set(false);
            return;
        };
        searching.set(true);

        spawn(async move {
            let outcome = handle.search(&text).await;
            if *generation.peek() != my_generation {
                return;
            }
            match outcome {
                Ok(places) => {
                    if places.is_empty() {
                        error.set(Some(format!("No places found for \u{201c}{text}\u{201d}")));
                    }
                    results.set(places);
                }
                Err(e) => {
                    warn!(error = %e, "place search failed");
                    error.set(Some(e.to_string()));
                }
            }
            searching.set(false);
        });
    };

    let disabled = props.handle.is_none();
    let busy = searching();

    rsx! {
        div { class: "flex flex-col gap-2",
            form { class: "flex gap-2", onsubmit: on_submit,
                input {
                    class: "flex-1 px-2 py-1 rounded border bg-transparent",
                    r#type: "search",
                    placeholder: "Search for a place",
                    disabled: disabled,
                    value: "{query}",
                    oninput: move |e: FormEvent| query.set(e.value()),
                }
                button {
                    class: "px-3 py-1 rounded border",
                    r#type: "submit",
                    aria_label: "Search",
                    disabled: disabled || busy,
                    Icon { width: 16, height: 16, icon: LdSearch }
                }
            }
            if busy {
                p { class: "text-sm text-(--text-secondary) animate-pulse", "Searching..." }
            }
            if let Some(err) = error() {
                p { class: "text-sm text-(--text-error)", "{err}" }
            }
            ul { class: "flex flex-col gap-1",
                for (i, place) in results().into_iter().enumerate() {
                    ResultRow {
                        key: "{i}",
                        place: place,
                        handle: props.handle.clone(),
                        on_done: move |()| results.set(Vec::new()),
                    }
                }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct ResultRowProps {
    place: Place,
    handle: Option<PlannerHandle>,
    on_done: EventHandler<()>,
}

#[component]
fn ResultRow(props: ResultRowProps) -> Element {
    let name = props.place.name.clone();
    let use_place = props.place.clone();
    let use_handle = props.handle.clone();
    let stop_place = props.place.clone();
    let stop_handle = props.handle.clone();
    let on_done = props.on_done;

    rsx! {
        li { class: "flex items-center gap-2",
            button {
                class: "flex-1 text-left text-sm truncate hover:underline",
                title: "{name}",
                onclick: move |_| {
                    if let Some(h) = &use_handle {
                        match h.choose_place(&use_place) {
                            Ok(()) => on_done.call(()),
                            Err(e) => warn!(error = %e, "cannot use search result"),
                        }
                    }
                },
                "{name}"
            }
            button {
                class: "p-1 rounded border",
                aria_label: "Add as stop",
                title: "Add as stop",
                onclick: move |_| {
                    if let Some(h) = &stop_handle {
                        match h.add_step(Some(stop_place.coords), &stop_place.name) {
                            Ok(()) => on_done.call(()),
                            Err(e) => warn!(error = %e, "cannot add search result as stop"),
                        }
                    }
                },
                Icon { width: 14, height: 14, icon: LdPlus }
            }
        }
    }
}

/// Start a new search generation for `query`.
///
/// The generation always advances, so an answer to any earlier query is
/// ignored even when this one is blank and sends nothing.
fn next_search(generation: u64, query: &str) -> (u64, Option<String>) {
    let query = query.trim();
    let text = (!query.is_empty()).then(|| query.to_owned());
    (generation.wrapping_add(1), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_still_supersedes_pending_search() {
        let (pending, text) = next_search(0, "Samarkand");
        assert_eq!(text.as_deref(), Some("Samarkand"));

        let (current, text) = next_search(pending, "   ");
        assert_eq!(text, None);
        assert_ne!(current, pending);
    }

    #[test]
    fn query_is_trimmed() {
        assert_eq!(next_search(4, "  Bukhara ").1.as_deref(), Some("Bukhara"));
    }
}
