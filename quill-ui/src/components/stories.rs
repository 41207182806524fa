use dioxus::prelude::*;
use dioxus_logger::tracing::warn;
use shared_types::goal_progress::format_word_count;
use shared_types::{AppRoute, NewStory, Story, StoryStatus};
use uuid::Uuid;
use validator::Validate;

use crate::api;
use crate::effects::navigate;
use crate::state::{prepend_row, remove_row, AppState};

fn status_class(status: StoryStatus) -> &'static str {
    match status {
        StoryStatus::Draft => "status-pill status-draft",
        StoryStatus::InProgress => "status-pill status-progress",
        StoryStatus::Completed => "status-pill status-completed",
        StoryStatus::Published => "status-pill status-published",
    }
}

#[component]
pub fn StoriesPage() -> Element {
    let app = use_context::<AppState>();
    let mut show_create = use_signal(|| false);
    let mut delete_error = use_signal(|| None::<String>);

    let handle_delete = use_callback(move |id: Uuid| {
        spawn(async move {
            match api::delete::<Story>(id).await {
                Ok(()) => {
                    remove_row(app.stories, id);
                    delete_error.set(None);
                }
                Err(e) => {
                    warn!("Failed to delete story {id}: {e}");
                    delete_error.set(Some(e));
                }
            }
        });
    });

    if (app.stories_loading)() {
        return rsx! {
            div { class: "page",
                div { class: "card-grid",
                    for i in 0..6 {
                        div { key: "{i}", class: "card skeleton" }
                    }
                }
            }
        };
    }

    let stories = app.stories.read().clone();

    rsx! {
        div { class: "page",
            div { class: "page-header",
                div {
                    h1 { "Grimoire of Tales" }
                    p { class: "page-subtitle", "Chronicles of thy mystical creations" }
                }
                button {
                    class: "primary-button",
                    onclick: move |_| show_create.set(true),
                    "New Tale"
                }
            }

            if let Some(message) = delete_error() {
                div { class: "form-error", "{message}" }
            }

            if stories.is_empty() {
                div { class: "empty-state",
                    h3 { "The Grimoire Awaits" }
                    p { "No tales have been inscribed yet. Let thy imagination flow and weave the first thread of destiny." }
                    button {
                        class: "primary-button",
                        onclick: move |_| show_create.set(true),
                        "Begin Your First Tale"
                    }
                }
            } else {
                div { class: "card-grid",
                    for story in stories {
                        StoryCard {
                            key: "{story.id}",
                            story: story.clone(),
                            on_delete: move |id| handle_delete.call(id),
                        }
                    }
                }
            }

            if show_create() {
                CreateStoryModal { on_close: move |_| show_create.set(false) }
            }
        }
    }
}

#[component]
fn StoryCard(story: Story, on_delete: EventHandler<Uuid>) -> Element {
    let app = use_context::<AppState>();
    let id = story.id;
    let updated = story.updated_at.format("%b %-d, %Y").to_string();
    let words = format_word_count(story.word_count);

    rsx! {
        div {
            class: "card story-card",
            onclick: move |_| navigate(app.route, AppRoute::StoryEditor { id }),
            div { class: "card-title-row",
                h3 { "{story.title}" }
                span { class: status_class(story.status), "{story.status.label()}" }
            }
            if !story.description.is_empty() {
                p { class: "card-description", "{story.description}" }
            }
            div { class: "card-meta",
                span { "{words} words" }
                span { "{updated}" }
            }
            div { class: "card-footer",
                if !story.genre.is_empty() {
                    span { class: "genre-tag", "{story.genre}" }
                }
                button {
                    class: "ghost-button danger",
                    onclick: move |e: MouseEvent| {
                        e.stop_propagation();
                        on_delete.call(id);
                    },
                    "Delete"
                }
            }
        }
    }
}

#[component]
fn CreateStoryModal(on_close: EventHandler<()>) -> Element {
    let app = use_context::<AppState>();
    let mut title = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut genre = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let handle_submit = use_callback(move |_| {
        let Some(user) = app.user() else {
            return;
        };
        let new_story = NewStory::draft(user.id, title(), description(), genre());
        if new_story.validate().is_err() {
            error.set(Some("Title is required".to_string()));
            return;
        }
        busy.set(true);
        spawn(async move {
            match api::create::<Story>(&new_story).await {
                Ok(story) => {
                    prepend_row(app.stories, story);
                    on_close.call(());
                }
                Err(e) => {
                    warn!("Failed to create story: {e}");
                    error.set(Some(e));
                }
            }
            busy.set(false);
        });
    });

    rsx! {
        div { class: "modal-scrim",
            form {
                class: "modal",
                onsubmit: move |e: FormEvent| {
                    e.prevent_default();
                    handle_submit.call(());
                },
                h2 { "Weave New Tale" }

                label { "Title of thy Chronicle *" }
                input {
                    r#type: "text",
                    placeholder: "Enter the name of thy tale...",
                    value: "{title}",
                    oninput: move |e: FormEvent| title.set(e.value()),
                }

                label { "Chronicle's Essence" }
                textarea {
                    rows: "3",
                    placeholder: "Describe the essence of thy tale...",
                    value: "{description}",
                    oninput: move |e: FormEvent| description.set(e.value()),
                }

                label { "Realm of Story" }
                input {
                    r#type: "text",
                    placeholder: "e.g., Dark Fantasy, Epic Romance, Mystical Adventure",
                    value: "{genre}",
                    oninput: move |e: FormEvent| genre.set(e.value()),
                }

                if let Some(message) = error() {
                    div { class: "form-error", "{message}" }
                }

                div { class: "modal-actions",
                    button {
                        r#type: "button",
                        class: "ghost-button",
                        onclick: move |_| on_close.call(()),
                        "Dismiss"
                    }
                    button {
                        r#type: "submit",
                        class: "primary-button",
                        disabled: busy(),
                        "Weave Tale"
                    }
                }
            }
        }
    }
}
