//! Story editor with debounced autosave.
//!
//! The writing surface is a `contenteditable` element seeded with the stored
//! markup once; the browser owns it from then on and every edit reads the
//! markup back, so formatting survives a save unchanged.
//!
//! The [`AutosaveMachine`] decides when to save; this component only runs
//! its commands. Edits arm a timer, Ctrl/Cmd+S saves at once, and leaving
//! the page voids whatever timer is still armed. A save already sent keeps
//! running after unmount so its goal credit is not lost.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use dioxus_logger::tracing::{debug, warn};
use gloo_timers::future::TimeoutFuture;
use shared_types::markup::{format_last_saved, html_to_text, word_count};
use shared_types::{
    AppRoute, AutosaveCommand, AutosaveMachine, EditEvent, SaveRequest, Story, StoryPatch,
};
use uuid::Uuid;

use crate::api;
use crate::effects::{element_html, exec_format, navigate};
use crate::state::{apply_words_added, replace_row, AppState};

const PLACEHOLDER: &str = "Begin your tale... Let the words flow like magic across the page.";
const CLOCK_TICK_MS: u32 = 30_000;
const SURFACE_ID: &str = "story-surface";

/// Toolbar actions, applied to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Bold,
    Italic,
    Strike,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    OrderedList,
    Quote,
}

impl Format {
    const TOOLBAR: [Format; 9] = [
        Format::Bold,
        Format::Italic,
        Format::Strike,
        Format::Heading1,
        Format::Heading2,
        Format::Heading3,
        Format::BulletList,
        Format::OrderedList,
        Format::Quote,
    ];

    fn label(self) -> &'static str {
        match self {
            Format::Bold => "B",
            Format::Italic => "I",
            Format::Strike => "S",
            Format::Heading1 => "H1",
            Format::Heading2 => "H2",
            Format::Heading3 => "H3",
            Format::BulletList => "List",
            Format::OrderedList => "1. List",
            Format::Quote => "Quote",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Format::Bold => "Bold",
            Format::Italic => "Italic",
            Format::Strike => "Strikethrough",
            Format::Heading1 => "Heading 1",
            Format::Heading2 => "Heading 2",
            Format::Heading3 => "Heading 3",
            Format::BulletList => "Bullet list",
            Format::OrderedList => "Numbered list",
            Format::Quote => "Blockquote",
        }
    }

    /// `execCommand` name and argument.
    fn command(self) -> (&'static str, Option<&'static str>) {
        match self {
            Format::Bold => ("bold", None),
            Format::Italic => ("italic", None),
            Format::Strike => ("strikeThrough", None),
            Format::Heading1 => ("formatBlock", Some("<h1>")),
            Format::Heading2 => ("formatBlock", Some("<h2>")),
            Format::Heading3 => ("formatBlock", Some("<h3>")),
            Format::BulletList => ("insertUnorderedList", None),
            Format::OrderedList => ("insertOrderedList", None),
            Format::Quote => ("formatBlock", Some("<blockquote>")),
        }
    }
}

type SharedMachine = Rc<RefCell<Option<AutosaveMachine>>>;

/// What the header shows about persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct SaveIndicator {
    saving: bool,
    unsaved: bool,
    last_saved: Option<DateTime<Utc>>,
}

impl SaveIndicator {
    fn of(machine: &AutosaveMachine) -> Self {
        Self {
            saving: machine.is_saving(),
            unsaved: machine.has_unsaved_changes(),
            last_saved: machine.last_saved(),
        }
    }

    fn label(&self, now: DateTime<Utc>) -> String {
        if self.saving {
            "Saving...".to_string()
        } else if self.unsaved {
            "Unsaved changes".to_string()
        } else {
            format!("Last saved: {}", format_last_saved(self.last_saved, now))
        }
    }
}

/// Mirror the machine into the render signal. The signal is gone once the
/// editor unmounts, so a late save finishing then is not an error.
fn publish(machine: &SharedMachine, mut indicator: Signal<SaveIndicator>) {
    let Some(snapshot) = machine.borrow().as_ref().map(SaveIndicator::of) else {
        return;
    };
    if let Ok(mut current) = indicator.try_write() {
        *current = snapshot;
    }
}

fn is_save_shortcut(key: &Key, modifiers: Modifiers) -> bool {
    matches!(key, Key::Character(c) if c.eq_ignore_ascii_case("s"))
        && (modifiers.ctrl() || modifiers.meta())
}

fn run_save(
    app: AppState,
    machine: SharedMachine,
    indicator: Signal<SaveIndicator>,
    request: SaveRequest,
) {
    publish(&machine, indicator);
    spawn_forever(async move {
        let patch = StoryPatch::content(request.html.clone(), request.word_count, Utc::now());
        match api::update::<Story>(request.story_id, &patch).await {
            Ok(saved) => {
                replace_row(app.stories, saved);
                let outcome = machine
                    .borrow_mut()
                    .as_mut()
                    .map(|m| m.on_save_succeeded(&request, Utc::now()));
                publish(&machine, indicator);
                debug!("Saved story {} ({} words)", request.story_id, request.word_count);

                if let Some(words) = outcome.and_then(|o| o.creditable_words()) {
                    // Errors are logged inside; the story itself is saved.
                    let _ = apply_words_added(app.goals, words).await;
                }
            }
            Err(e) => {
                warn!("Autosave of story {} failed: {e}", request.story_id);
                if let Some(m) = machine.borrow_mut().as_mut() {
                    m.on_save_failed(&request);
                }
                publish(&machine, indicator);
            }
        }
    });
}

#[component]
pub fn StoryEditor(id: Uuid) -> Element {
    let app = use_context::<AppState>();
    let machine: SharedMachine = use_hook(|| Rc::new(RefCell::new(None)));
    let timer = use_hook(|| Rc::new(Cell::new(None::<Task>)));

    let mut html = use_signal(String::new);
    // Markup the surface starts from. Set once; later renders leave the
    // browser-owned DOM alone.
    let mut seed = use_signal(|| None::<String>);
    let indicator = use_signal(SaveIndicator::default);
    let mut now = use_signal(Utc::now);
    let story = use_memo(move || app.story(id));

    // Open the session once the story is in the cache.
    {
        let machine = machine.clone();
        use_effect(move || {
            let Some(story) = story() else {
                return;
            };
            if machine.borrow().is_some() {
                return;
            }
            *machine.borrow_mut() = Some(AutosaveMachine::with_default_delay(
                story.id,
                story.word_count,
            ));
            html.set(story.content.clone());
            seed.set(Some(story.content));
        });
    }

    // Unknown story: back to the list once loading is done.
    use_effect(move || {
        if !(app.stories_loading)() && story().is_none() {
            navigate(app.route, AppRoute::Stories);
        }
    });

    // Keep "N minutes ago" current.
    use_effect(move || {
        spawn(async move {
            loop {
                TimeoutFuture::new(CLOCK_TICK_MS).await;
                now.set(Utc::now());
            }
        });
    });

    {
        let machine = machine.clone();
        let timer = timer.clone();
        use_drop(move || {
            if let Some(task) = timer.take() {
                task.cancel();
            }
            if let Some(m) = machine.borrow_mut().as_mut() {
                m.close();
            }
        });
    }

    let on_edit = {
        let machine = machine.clone();
        let timer = timer.clone();
        use_callback(move |event: EditEvent| {
            let Some(command) = machine.borrow_mut().as_mut().map(|m| m.on_edit(event)) else {
                return;
            };
            match command {
                AutosaveCommand::ArmTimer { generation, delay } => {
                    let machine = machine.clone();
                    let task = spawn(async move {
                        TimeoutFuture::new(delay_ms(delay)).await;
                        let request = machine
                            .borrow_mut()
                            .as_mut()
                            .and_then(|m| m.on_timer_elapsed(generation));
                        if let Some(request) = request {
                            run_save(app, machine, indicator, request);
                        }
                    });
                    if let Some(previous) = timer.replace(Some(task)) {
                        previous.cancel();
                    }
                }
                AutosaveCommand::SaveNow(request) => {
                    if let Some(previous) = timer.take() {
                        previous.cancel();
                    }
                    run_save(app, machine.clone(), indicator, request);
                }
                AutosaveCommand::Ignore => {}
            }
            publish(&machine, indicator);
        })
    };

    let on_keydown = use_callback(move |e: KeyboardEvent| {
        if is_save_shortcut(&e.key(), e.modifiers()) {
            e.prevent_default();
            let markup = element_html(SURFACE_ID).unwrap_or_else(|| html());
            on_edit.call(EditEvent::from_html(markup, true));
        }
    });

    let Some(current) = story() else {
        return rsx! {
            div { class: "page-loading", "Unrolling the scroll..." }
        };
    };

    let words = word_count(&html_to_text(&html.read()));
    let status = indicator.read().label(now());
    let genre = current.genre.clone();

    rsx! {
        div { class: "editor-page",
            div { class: "editor-header",
                button {
                    class: "link-button",
                    onclick: move |_| navigate(app.route, AppRoute::Stories),
                    "Back to Grimoire"
                }
                div { class: "editor-title",
                    h1 { "{current.title}" }
                    if !genre.is_empty() {
                        span { class: "genre-tag", "{genre}" }
                    }
                }
                div { class: "editor-meta",
                    span { "{words} words" }
                    span { class: "save-status", "{status}" }
                    button {
                        class: "primary-button",
                        disabled: indicator.read().saving,
                        onclick: move |_| on_edit.call(EditEvent::from_html(html(), true)),
                        "Save"
                    }
                }
            }
            div { class: "editor-toolbar",
                for format in Format::TOOLBAR {
                    button {
                        key: "{format.label()}",
                        class: "toolbar-button",
                        title: format.title(),
                        // Keep the selection in the surface.
                        onmousedown: move |e: MouseEvent| {
                            e.prevent_default();
                            let (command, value) = format.command();
                            exec_format(command, value);
                        },
                        {format.label()}
                    }
                }
            }
            if let Some(markup) = seed() {
                div {
                    id: SURFACE_ID,
                    class: "editor-surface",
                    contenteditable: "true",
                    "data-placeholder": PLACEHOLDER,
                    dangerous_inner_html: "{markup}",
                    oninput: move |_| {
                        let Some(markup) = element_html(SURFACE_ID) else {
                            return;
                        };
                        html.set(markup.clone());
                        on_edit.call(EditEvent::from_html(markup, false));
                    },
                    onkeydown: move |e: KeyboardEvent| on_keydown.call(e),
                }
            }
        }
    }
}

fn delay_ms(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_shortcut_needs_a_modifier() {
        let s = Key::Character("s".to_string());
        assert!(is_save_shortcut(&s, Modifiers::CONTROL));
        assert!(is_save_shortcut(&s, Modifiers::META));
        assert!(!is_save_shortcut(&s, Modifiers::empty()));
        assert!(!is_save_shortcut(&Key::Enter, Modifiers::CONTROL));
    }

    #[test]
    fn toolbar_covers_the_block_and_inline_formats() {
        let commands: Vec<_> = Format::TOOLBAR.iter().map(|f| f.command()).collect();
        assert!(commands.contains(&("bold", None)));
        assert!(commands.contains(&("strikeThrough", None)));
        assert!(commands.contains(&("formatBlock", Some("<h3>"))));
        assert!(commands.contains(&("formatBlock", Some("<blockquote>"))));
        assert!(commands.contains(&("insertOrderedList", None)));
        let labels: std::collections::HashSet<_> = Format::TOOLBAR.iter().map(|f| f.label()).collect();
        assert_eq!(labels.len(), Format::TOOLBAR.len());
    }

    #[test]
    fn stored_markup_survives_an_edit_event() {
        let stored = "<h2>Chapter One</h2><p>The <strong>crow</strong> <em>spoke</em>.</p>";
        let event = EditEvent::from_html(stored, false);
        assert_eq!(event.html, stored);
        assert_eq!(event.word_count, 5);
    }

    #[test]
    fn indicator_prefers_live_state() {
        let now = Utc::now();
        let idle = SaveIndicator::default();
        assert_eq!(idle.label(now), "Last saved: Never");
        let dirty = SaveIndicator {
            unsaved: true,
            ..idle
        };
        assert_eq!(dirty.label(now), "Unsaved changes");
        let saving = SaveIndicator {
            saving: true,
            ..dirty
        };
        assert_eq!(saving.label(now), "Saving...");
    }
}
