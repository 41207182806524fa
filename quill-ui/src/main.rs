use dioxus::launch;
use dioxus::prelude::*;
use dioxus_logger::tracing::{error, Level};

use quill_ui::api::backend;
use quill_ui::components::styles::QUILL_STYLES;
use quill_ui::QuillShell;

fn main() {
    // Initialize logging for WASM
    wasm_logger::init(wasm_logger::Config::default());
    dioxus_logger::init(Level::INFO).ok();

    launch(App);
}

#[component]
fn App() -> Element {
    if backend().is_none() {
        error!("SUPABASE_URL and SUPABASE_ANON_KEY must be set at build time");
        return rsx! {
            style { {QUILL_STYLES} }
            div { class: "page-loading",
                h1 { "The realm is sealed" }
                p { "No backend is configured for this build." }
            }
        };
    }

    rsx! {
        QuillShell {}
    }
}
