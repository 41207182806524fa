use chrono::Utc;
use dioxus::prelude::*;
use dioxus_logger::tracing::warn;
use shared_types::goal_progress::{
    days_remaining, display_words_per_day, format_progress, format_word_count, goal_health,
    progress_percent, set_current_words,
};
use shared_types::{GoalHealth, NewGoal, WritingGoal};
use uuid::Uuid;
use validator::Validate;

use crate::api;
use crate::state::{prepend_row, remove_row, save_goal_progress, AppState};

fn health_class(health: GoalHealth) -> &'static str {
    match health {
        GoalHealth::Completed => "goal-dot goal-completed",
        GoalHealth::Overdue => "goal-dot goal-overdue",
        GoalHealth::OnTrack => "goal-dot goal-on-track",
    }
}

#[component]
pub fn GoalsPage() -> Element {
    let app = use_context::<AppState>();
    let mut show_create = use_signal(|| false);
    let mut editing = use_signal(|| None::<WritingGoal>);
    let mut page_error = use_signal(|| None::<String>);

    let handle_delete = use_callback(move |id: Uuid| {
        spawn(async move {
            match api::delete::<WritingGoal>(id).await {
                Ok(()) => {
                    remove_row(app.goals, id);
                    page_error.set(None);
                }
                Err(e) => {
                    warn!("Failed to delete goal {id}: {e}");
                    page_error.set(Some(e));
                }
            }
        });
    });

    if (app.goals_loading)() {
        return rsx! {
            div { class: "page",
                div { class: "card-grid",
                    for i in 0..3 {
                        div { key: "{i}", class: "card skeleton" }
                    }
                }
            }
        };
    }

    let goals = app.goals.read().clone();

    rsx! {
        div { class: "page",
            div { class: "page-header",
                div {
                    h1 { "Writing Sanctum" }
                    p { class: "page-subtitle", "Sacred goals to guide thy literary journey" }
                }
                button {
                    class: "primary-button",
                    onclick: move |_| show_create.set(true),
                    "New Goal"
                }
            }

            if let Some(message) = page_error() {
                div { class: "form-error", "{message}" }
            }

            if goals.is_empty() {
                div { class: "empty-state",
                    h3 { "No Writing Goals Yet" }
                    p { "Set thy first writing goal to begin thy journey" }
                    button {
                        class: "primary-button",
                        onclick: move |_| show_create.set(true),
                        "Create First Goal"
                    }
                }
            } else {
                div { class: "card-grid",
                    for goal in goals {
                        GoalCard {
                            key: "{goal.id}",
                            goal: goal.clone(),
                            on_edit: move |goal| editing.set(Some(goal)),
                            on_delete: move |id| handle_delete.call(id),
                        }
                    }
                }
            }

            if let Some(goal) = editing() {
                UpdateProgressModal { goal, on_close: move |_| editing.set(None) }
            }
            if show_create() {
                CreateGoalModal { on_close: move |_| show_create.set(false) }
            }
        }
    }
}

#[component]
fn GoalCard(
    goal: WritingGoal,
    on_edit: EventHandler<WritingGoal>,
    on_delete: EventHandler<Uuid>,
) -> Element {
    let now = Utc::now();
    let health = goal_health(&goal, now);
    let percent = progress_percent(&goal);
    let days = days_remaining(&goal, now);
    let per_day = display_words_per_day(&goal, now);
    let progress = format_progress(&goal);
    let current = format_word_count(goal.current_words);
    let target = format_word_count(goal.target_words);
    let bar_class = if health == GoalHealth::Completed {
        "progress-fill complete"
    } else {
        "progress-fill"
    };
    let width = format!("width: {percent:.1}%;");
    let id = goal.id;
    let edit_goal = goal.clone();

    rsx! {
        div { class: "card goal-card",
            div { class: health_class(health) }
            h3 { "{goal.title}" }
            if !goal.description.is_empty() {
                p { class: "card-description", "{goal.description}" }
            }

            div { class: "progress-labels",
                span { "{current} words" }
                span { "{target} words" }
            }
            div { class: "progress-track",
                div { class: bar_class, style: "{width}" }
            }
            div { class: "progress-caption", "{progress}" }

            div { class: "goal-stats",
                div {
                    div { class: "stat-value", "{days}" }
                    div { class: "stat-label", "Days left" }
                }
                div {
                    div { class: "stat-value", "{per_day}" }
                    div { class: "stat-label", "Words / day" }
                }
            }

            div { class: "card-footer",
                button {
                    class: "ghost-button",
                    onclick: move |_| on_edit.call(edit_goal.clone()),
                    "Update Progress"
                }
                button {
                    class: "ghost-button danger",
                    onclick: move |_| on_delete.call(id),
                    "Delete"
                }
            }
        }
    }
}

#[component]
fn UpdateProgressModal(goal: WritingGoal, on_close: EventHandler<()>) -> Element {
    let app = use_context::<AppState>();
    let mut words = use_signal(|| goal.current_words);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);
    let target = format_word_count(goal.target_words);

    let handle_update = {
        let goal = goal.clone();
        use_callback(move |_| {
            let before = goal.clone();
            let after = set_current_words(&before, words(), Utc::now());
            busy.set(true);
            spawn(async move {
                match save_goal_progress(app.goals, &before, &after).await {
                    Ok(_) => on_close.call(()),
                    Err(e) => {
                        warn!("Failed to update goal {}: {e}", before.id);
                        error.set(Some(e));
                    }
                }
                busy.set(false);
            });
        })
    };

    rsx! {
        div { class: "modal-scrim",
            div { class: "modal",
                h2 { "Update Progress: {goal.title}" }
                label { "Current Word Count" }
                input {
                    r#type: "number",
                    min: "0",
                    max: "{goal.target_words}",
                    value: "{words}",
                    oninput: move |e: FormEvent| words.set(e.value().trim().parse().unwrap_or(0)),
                }
                div { class: "field-hint", "Target: {target} words" }

                if let Some(message) = error() {
                    div { class: "form-error", "{message}" }
                }

                div { class: "modal-actions",
                    button {
                        class: "ghost-button",
                        onclick: move |_| on_close.call(()),
                        "Cancel"
                    }
                    button {
                        class: "primary-button",
                        disabled: busy(),
                        onclick: move |_| handle_update.call(()),
                        "Update"
                    }
                }
            }
        }
    }
}

#[component]
fn CreateGoalModal(on_close: EventHandler<()>) -> Element {
    let app = use_context::<AppState>();
    let mut title = use_signal(String::new);
    let mut target_words = use_signal(String::new);
    let mut target_days = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let handle_submit = use_callback(move |_| {
        let Some(user) = app.user() else {
            return;
        };
        let new_goal = NewGoal::from_form(
            user.id,
            &title(),
            &description(),
            &target_words(),
            &target_days(),
            Utc::now(),
        );
        if new_goal.validate().is_err() {
            error.set(Some("A title, a positive word target and at most 36500 days are required".to_string()));
            return;
        }
        busy.set(true);
        spawn(async move {
            match api::create::<WritingGoal>(&new_goal).await {
                Ok(goal) => {
                    prepend_row(app.goals, goal);
                    on_close.call(());
                }
                Err(e) => {
                    warn!("Failed to create goal: {e}");
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
                h2 { "Forge New Writing Goal" }

                label { "Goal Title *" }
                input {
                    r#type: "text",
                    placeholder: "e.g., Complete First Draft",
                    value: "{title}",
                    oninput: move |e: FormEvent| title.set(e.value()),
                }

                div { class: "field-pair",
                    div {
                        label { "Target Words *" }
                        input {
                            r#type: "number",
                            placeholder: "50000",
                            value: "{target_words}",
                            oninput: move |e: FormEvent| target_words.set(e.value()),
                        }
                    }
                    div {
                        label { "Days to Complete" }
                        input {
                            r#type: "number",
                            placeholder: "30",
                            value: "{target_days}",
                            oninput: move |e: FormEvent| target_days.set(e.value()),
                        }
                    }
                }

                label { "Description" }
                textarea {
                    rows: "3",
                    placeholder: "Describe thy writing goal...",
                    value: "{description}",
                    oninput: move |e: FormEvent| description.set(e.value()),
                }

                if let Some(message) = error() {
                    div { class: "form-error", "{message}" }
                }

                div { class: "modal-actions",
                    button {
                        r#type: "button",
                        class: "ghost-button",
                        onclick: move |_| on_close.call(()),
                        "Cancel"
                    }
                    button {
                        r#type: "submit",
                        class: "primary-button",
                        disabled: busy(),
                        "Forge Goal"
                    }
                }
            }
        }
    }
}
