//! Autosave reconciler for one open story.
//!
//! The machine owns no timers and does no IO. Callers feed it edit events,
//! timer expiries and save completions, and execute the commands it returns.
//! The native client drives it with tokio tasks, the web UI with
//! `gloo-timers`; both get the same debounce rules:
//!
//! - ordinary typing re-arms a single deferred save,
//! - an explicit save cancels the timer and saves immediately,
//! - a timer whose generation is no longer armed is ignored,
//! - after `close()` nothing fires.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::markup;

/// Quiet period after the last keystroke before an autosave.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;

/// One change notification from the editor surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditEvent {
    pub html: String,
    pub text: String,
    pub word_count: i64,
    pub character_count: i64,
    /// Set only for an explicit save (Ctrl/Cmd+S).
    pub should_save: bool,
}

impl EditEvent {
    /// Build an event from the plain text in the editor surface.
    pub fn from_text(text: impl Into<String>, should_save: bool) -> Self {
        let text = text.into();
        Self {
            html: markup::text_to_html(&text),
            word_count: markup::word_count(&text),
            character_count: markup::character_count(&text),
            text,
            should_save,
        }
    }

    /// Build an event from the markup of a rich-text surface. The markup is
    /// saved as given; the counts come from its text.
    pub fn from_html(html: impl Into<String>, should_save: bool) -> Self {
        let html = html.into();
        let text = markup::html_to_text(&html);
        Self {
            word_count: markup::word_count(&text),
            character_count: markup::character_count(&text),
            text,
            html,
            should_save,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosavePhase {
    Idle,
    TimerArmed,
    SaveInFlight,
}

/// Content to persist for a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub story_id: Uuid,
    /// Monotonic per machine; lets drivers correlate completions.
    pub seq: u64,
    pub html: String,
    pub word_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveCommand {
    /// Start a one-shot timer and report `generation` back through
    /// [`AutosaveMachine::on_timer_elapsed`] when it fires. Any previously
    /// armed timer is already void.
    ArmTimer { generation: u64, delay: Duration },
    /// Persist right away.
    SaveNow(SaveRequest),
    /// The session is closed; do nothing.
    Ignore,
}

/// Result of a successful save, as seen by goal tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// New word count minus the previous baseline. May be negative.
    pub words_added: i64,
    pub saved_at: DateTime<Utc>,
}

impl SaveOutcome {
    /// Only growth is credited to goals.
    pub fn creditable_words(&self) -> Option<i64> {
        (self.words_added > 0).then_some(self.words_added)
    }
}

#[derive(Debug, Clone)]
pub struct AutosaveMachine {
    story_id: Uuid,
    delay: Duration,
    baseline_word_count: i64,
    pending: Option<EditEvent>,
    armed_generation: Option<u64>,
    next_generation: u64,
    next_seq: u64,
    in_flight: usize,
    last_saved: Option<DateTime<Utc>>,
    closed: bool,
}

impl AutosaveMachine {
    /// `baseline_word_count` is the story's word count when editing began.
    pub fn new(story_id: Uuid, baseline_word_count: i64, delay: Duration) -> Self {
        Self {
            story_id,
            delay,
            baseline_word_count,
            pending: None,
            armed_generation: None,
            next_generation: 0,
            next_seq: 0,
            in_flight: 0,
            last_saved: None,
            closed: false,
        }
    }

    pub fn with_default_delay(story_id: Uuid, baseline_word_count: i64) -> Self {
        Self::new(
            story_id,
            baseline_word_count,
            Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
        )
    }

    pub fn story_id(&self) -> Uuid {
        self.story_id
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn phase(&self) -> AutosavePhase {
        if self.armed_generation.is_some() {
            AutosavePhase::TimerArmed
        } else if self.in_flight > 0 {
            AutosavePhase::SaveInFlight
        } else {
            AutosavePhase::Idle
        }
    }

    pub fn baseline_word_count(&self) -> i64 {
        self.baseline_word_count
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight > 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// True while an edit is waiting on the timer.
    pub fn has_unsaved_changes(&self) -> bool {
        self.pending.is_some()
    }

    pub fn on_edit(&mut self, event: EditEvent) -> AutosaveCommand {
        if self.closed {
            return AutosaveCommand::Ignore;
        }
        self.armed_generation = None;

        if event.should_save {
            self.pending = None;
            return AutosaveCommand::SaveNow(self.begin_save(event));
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        self.armed_generation = Some(generation);
        self.pending = Some(event);
        AutosaveCommand::ArmTimer {
            generation,
            delay: self.delay,
        }
    }

    /// Returns the save to perform, or `None` when the timer was superseded,
    /// cancelled, or the session is closed.
    pub fn on_timer_elapsed(&mut self, generation: u64) -> Option<SaveRequest> {
        if self.closed || self.armed_generation != Some(generation) {
            return None;
        }
        self.armed_generation = None;
        let event = self.pending.take()?;
        Some(self.begin_save(event))
    }

    /// Completions are applied in arrival order: the baseline and the
    /// "last saved" stamp follow whichever save finished last.
    pub fn on_save_succeeded(&mut self, request: &SaveRequest, saved_at: DateTime<Utc>) -> SaveOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let words_added = request.word_count - self.baseline_word_count;
        self.baseline_word_count = request.word_count;
        self.last_saved = Some(saved_at);
        SaveOutcome {
            words_added,
            saved_at,
        }
    }

    /// A failed save leaves the baseline and "last saved" untouched; the next
    /// edit or explicit save retries with whatever is current then.
    pub fn on_save_failed(&mut self, _request: &SaveRequest) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Tear down: void the armed timer and drop pending content. Returns
    /// true if a timer was armed.
    pub fn close(&mut self) -> bool {
        self.closed = true;
        self.pending = None;
        self.armed_generation.take().is_some()
    }

    fn begin_save(&mut self, event: EditEvent) -> SaveRequest {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight += 1;
        SaveRequest {
            story_id: self.story_id,
            seq,
            html: event.html,
            word_count: event.word_count,
        }
    }
}
