//! Tokio driver for [`AutosaveMachine`].
//!
//! One `EditorSession` per open story. Deferred saves run on a single timer
//! task; the task is aborted when superseded and when the session closes,
//! and the generation check in the machine covers the window where an abort
//! arrives too late. Saves themselves are detached from the timer and always
//! run to completion.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use shared_types::{
    AutosaveCommand, AutosaveMachine, AutosavePhase, EditEvent, SaveOutcome, SaveRequest, Story,
    StoryPatch,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{GoalStore, StoryStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// A deferred save is armed.
    Scheduled,
    /// An explicit save went through.
    Saved(SaveOutcome),
    /// An explicit save failed; the edit stays unsaved.
    SaveFailed,
    /// The session is closed.
    Ignored,
}

pub struct EditorSession {
    shared: Arc<EditorShared>,
}

struct EditorShared {
    machine: Mutex<AutosaveMachine>,
    timer: Mutex<Option<JoinHandle<()>>>,
    stories: Arc<StoryStore>,
    goals: Arc<GoalStore>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl EditorSession {
    /// Start editing `story`; its stored word count is the first baseline.
    pub fn open(
        story: &Story,
        stories: Arc<StoryStore>,
        goals: Arc<GoalStore>,
        delay: Duration,
    ) -> Self {
        stories.set_current_story(Some(story.clone()));
        debug!(story_id = %story.id, baseline = story.word_count, "editor opened");
        Self {
            shared: Arc::new(EditorShared {
                machine: Mutex::new(AutosaveMachine::new(story.id, story.word_count, delay)),
                timer: Mutex::new(None),
                stories,
                goals,
            }),
        }
    }

    pub fn story_id(&self) -> Uuid {
        lock(&self.shared.machine).story_id()
    }

    pub fn phase(&self) -> AutosavePhase {
        lock(&self.shared.machine).phase()
    }

    pub fn last_saved(&self) -> Option<chrono::DateTime<Utc>> {
        lock(&self.shared.machine).last_saved()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        lock(&self.shared.machine).has_unsaved_changes()
    }

    /// Feed one change from the editor surface. Returns once an explicit
    /// save has finished; ordinary edits return as soon as the timer is
    /// armed.
    pub async fn handle_edit(&self, event: EditEvent) -> EditOutcome {
        let command = lock(&self.shared.machine).on_edit(event);
        match command {
            AutosaveCommand::ArmTimer { generation, delay } => {
                self.arm_timer(generation, delay);
                EditOutcome::Scheduled
            }
            AutosaveCommand::SaveNow(request) => {
                self.abort_timer();
                match persist(&self.shared, request).await {
                    Ok(outcome) => EditOutcome::Saved(outcome),
                    Err(_) => EditOutcome::SaveFailed,
                }
            }
            AutosaveCommand::Ignore => EditOutcome::Ignored,
        }
    }

    /// Stop autosaving. Pending unsaved edits are dropped; a save already
    /// in flight still completes. Returns true if a timer was cancelled.
    pub fn close(&self) -> bool {
        let had_timer = lock(&self.shared.machine).close();
        self.abort_timer();
        had_timer
    }

    fn arm_timer(&self, generation: u64, delay: Duration) {
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let request = lock(&shared.machine).on_timer_elapsed(generation);
            if let Some(request) = request {
                // Detached: aborting this timer must not cut the save short.
                tokio::spawn(async move {
                    let _ = persist(&shared, request).await;
                });
            }
        });
        if let Some(previous) = lock(&self.shared.timer).replace(handle) {
            previous.abort();
        }
    }

    fn abort_timer(&self) {
        if let Some(handle) = lock(&self.shared.timer).take() {
            handle.abort();
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Write the content, then credit any growth to the active goals. Goal
/// failures are logged and do not fail the save.
async fn persist(shared: &EditorShared, request: SaveRequest) -> Result<SaveOutcome, StoreError> {
    let patch = StoryPatch::content(request.html.clone(), request.word_count, Utc::now());
    match shared.stories.update_story(request.story_id, patch).await {
        Ok(_) => {
            let outcome = lock(&shared.machine).on_save_succeeded(&request, Utc::now());
            debug!(
                story_id = %request.story_id,
                seq = request.seq,
                words = request.word_count,
                words_added = outcome.words_added,
                "story saved"
            );
            if let Some(words) = outcome.creditable_words() {
                match shared.goals.apply_words_added(words).await {
                    Ok(goals) if goals > 0 => info!(words, goals, "credited words to goals"),
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "goal progress not fully applied"),
                }
            }
            Ok(outcome)
        }
        Err(err) => {
            warn!(story_id = %request.story_id, seq = request.seq, error = %err, "autosave failed");
            lock(&shared.machine).on_save_failed(&request);
            Err(err)
        }
    }
}
