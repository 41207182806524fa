//! Sections that are routed and titled but not built out yet.

use dioxus::prelude::*;
use shared_types::AppRoute;

fn placeholder_copy(route: AppRoute) -> (&'static str, &'static str) {
    match route {
        AppRoute::Characters => (
            "Souls of the Realm",
            "Character weaving shall be unveiled soon...",
        ),
        AppRoute::Plot => ("Fate Weaver", "Destiny's threads await thy guidance..."),
        AppRoute::World => (
            "Realm Forge",
            "World crafting tools emerge from the mists...",
        ),
        AppRoute::Oracle => (
            "The Oracle",
            "Seek counsel on characters, plots and worlds. The Oracle awakens soon...",
        ),
        _ => ("Arcane Configurations", "Mystical settings await thy touch..."),
    }
}

#[component]
pub fn Placeholder(route: AppRoute) -> Element {
    let (heading, tagline) = placeholder_copy(route);
    rsx! {
        div { class: "page placeholder",
            h1 { "{heading}" }
            p { class: "page-subtitle", "{tagline}" }
        }
    }
}
