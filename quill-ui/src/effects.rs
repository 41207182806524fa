use dioxus::prelude::*;
use dioxus_logger::tracing::{info, warn};
use futures_util::future::join;
use shared_types::{AppRoute, Story, WritingGoal};
use uuid::Uuid;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::api;
use crate::state::{set_auth, AppState, AuthState};

// ============================================================================
// Routing
// ============================================================================

/// Route encoded in the location hash (`#/stories/<id>`).
pub fn current_route() -> AppRoute {
    let hash = web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default();
    AppRoute::parse(&hash)
}

pub fn navigate(mut route: Signal<AppRoute>, to: AppRoute) {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_hash(&to.path());
    }
    if *route.peek() != to {
        route.set(to);
    }
}

/// Follow back/forward and hand-edited hashes.
pub async fn track_route(mut route: Signal<AppRoute>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let callback = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        let next = current_route();
        if *route.peek() != next {
            route.set(next);
        }
    }) as Box<dyn FnMut(web_sys::Event)>);

    let _ = window.add_event_listener_with_callback("hashchange", callback.as_ref().unchecked_ref());

    // Keep listener alive for app lifetime.
    callback.forget();
}

// ============================================================================
// Rich-text surface
// ============================================================================

/// Markup currently inside an element, e.g. a `contenteditable` surface.
pub fn element_html(id: &str) -> Option<String> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)
        .map(|element| element.inner_html())
}

/// Apply an editing command to the current selection. The editing host
/// reports the change through its own `input` event.
pub fn exec_format(command: &str, value: Option<&str>) {
    let Some(document) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
    else {
        return;
    };
    let applied = match value {
        Some(value) => document.exec_command_with_show_ui_and_value(command, false, value),
        None => document.exec_command(command),
    };
    if let Err(e) = applied {
        warn!("Formatting command {command} failed: {e:?}");
    }
}

pub fn set_document_title(title: &str) {
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        document.set_title(title);
    }
}

// ============================================================================
// Session and data
// ============================================================================

/// Resolve the stored session once at startup.
pub async fn restore_session(auth: Signal<AuthState>) {
    let next = match api::current_session().await {
        Ok(Some(session)) => AuthState::Authenticated(session.user),
        Ok(None) => AuthState::Unauthenticated,
        Err(e) => {
            warn!("Failed to restore session: {e}");
            AuthState::Unauthenticated
        }
    };
    set_auth(auth, next);
}

/// Mirror every later session change into `auth`, for the app's lifetime.
/// A rejected token refresh during a save or a load lands here too, and the
/// session guard then sends the writer back to sign in.
pub fn follow_session(auth: Signal<AuthState>) {
    api::on_session_change(move |change| {
        info!("Session change: {change:?}");
        set_auth(auth, AuthState::from_change(change));
    });
}

/// Load the writer's stories and goals side by side.
pub async fn load_workspace(mut app: AppState, user_id: Uuid) {
    let (stories, goals) = join(
        api::list::<Story>(user_id),
        api::list::<WritingGoal>(user_id),
    )
    .await;

    match stories {
        Ok(rows) => app.stories.set(rows),
        Err(e) => warn!("Failed to load stories: {e}"),
    }
    app.stories_loading.set(false);

    match goals {
        Ok(rows) => app.goals.set(rows),
        Err(e) => warn!("Failed to load goals: {e}"),
    }
    app.goals_loading.set(false);
}

pub async fn sign_out(mut app: AppState) {
    if let Err(e) = api::sign_out().await {
        warn!("Server-side sign-out failed: {e}");
    }
    set_auth(app.auth, AuthState::Unauthenticated);
    app.clear_workspace();
    navigate(app.route, AppRoute::Auth);
}
