use dioxus::prelude::*;
use shared_types::routes::{editor_title, page_title, NAVIGATION};
use shared_types::{AppRoute, APP_NAME};

use crate::auth::AuthPage;
use crate::components::editor::StoryEditor;
use crate::components::goals::GoalsPage;
use crate::components::placeholders::Placeholder;
use crate::components::stories::StoriesPage;
use crate::components::styles::QUILL_STYLES;
use crate::effects::{self, navigate};
use crate::state::{AppState, AuthState};

/// Title for the current route, from whatever state that route depends on.
fn document_title(app: &AppState) -> String {
    match *app.route.read() {
        AppRoute::Auth => page_title(Some(app.auth_mode.read().page_title())),
        AppRoute::StoryEditor { id } => {
            let story = app.story(id);
            page_title(Some(&editor_title(story.as_ref().map(|s| s.title.as_str()))))
        }
        other => page_title(other.title()),
    }
}

#[component]
pub fn QuillShell() -> Element {
    let mut app = use_context_provider(AppState::new);

    use_effect(move || {
        spawn(async move {
            effects::track_route(app.route).await;
        });
    });

    use_hook(move || effects::follow_session(app.auth));

    // Resolve the stored session once on load.
    use_effect(move || {
        spawn(async move {
            effects::restore_session(app.auth).await;
        });
    });

    // (Re)load the workspace whenever the signed-in user changes.
    use_effect(move || {
        let Some(user) = app.auth.read().user().cloned() else {
            app.clear_workspace();
            return;
        };
        spawn(async move {
            effects::load_workspace(app, user.id).await;
        });
    });

    // Session guard.
    use_effect(move || {
        let route = *app.route.read();
        match &*app.auth.read() {
            AuthState::Unauthenticated if route.requires_session() => {
                navigate(app.route, AppRoute::Auth)
            }
            AuthState::Authenticated(_) if route == AppRoute::Auth => {
                navigate(app.route, AppRoute::Stories)
            }
            _ => {}
        }
    });

    use_effect(move || {
        effects::set_document_title(&document_title(&app));
    });

    let route = *app.route.read();
    let auth = app.auth.read().clone();

    rsx! {
        style { {QUILL_STYLES} }

        match auth {
            AuthState::Unknown => rsx! {
                div { class: "page-loading", "Awakening the mystical realm..." }
            },
            AuthState::Unauthenticated => rsx! { AuthPage {} },
            AuthState::Authenticated(_) => rsx! {
                div { class: "app-layout",
                    Sidebar { route }
                    div { class: "app-main",
                        Header {}
                        main { class: "app-content",
                            match route {
                                AppRoute::Stories => rsx! { StoriesPage {} },
                                AppRoute::StoryEditor { id } => rsx! { StoryEditor { key: "{id}", id } },
                                AppRoute::Goals => rsx! { GoalsPage {} },
                                AppRoute::Auth => rsx! {},
                                other => rsx! { Placeholder { route: other } },
                            }
                        }
                    }
                }
            },
        }
    }
}

fn nav_class(active: bool) -> &'static str {
    if active {
        "nav-item active"
    } else {
        "nav-item"
    }
}

fn initial(name: &str) -> &str {
    name.get(..1).unwrap_or(name)
}

#[component]
fn Sidebar(route: AppRoute) -> Element {
    let app = use_context::<AppState>();
    let mut collapsed = use_signal(|| false);
    let active = route.nav_section();
    let width_class = if collapsed() { "sidebar collapsed" } else { "sidebar" };

    rsx! {
        nav { class: width_class,
            div { class: "sidebar-header",
                if !collapsed() {
                    h1 { class: "brand", "{APP_NAME}" }
                }
                button {
                    class: "ghost-button",
                    onclick: move |_| collapsed.toggle(),
                    if collapsed() { ">" } else { "<" }
                }
            }
            for item in NAVIGATION {
                button {
                    key: "{item.name}",
                    class: nav_class(active == Some(item.route)),
                    title: "{item.name}",
                    onclick: move |_| navigate(app.route, item.route),
                    if !collapsed() {
                        span { class: "nav-name", "{item.name}" }
                        span { class: "nav-runic", "{item.runic_name}" }
                    } else {
                        span { class: "nav-initial", {initial(item.name)} }
                    }
                }
            }
        }
    }
}

#[component]
fn Header() -> Element {
    let app = use_context::<AppState>();
    let email = app
        .user()
        .map(|u| u.email)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "Scribe".to_string());

    rsx! {
        header { class: "app-header",
            span { class: "header-user", "{email}" }
            button {
                class: "ghost-button",
                onclick: move |_| {
                    spawn(async move {
                        effects::sign_out(app).await;
                    });
                },
                "Sign out"
            }
        }
    }
}
