//! Debounced autosave against an in-memory backend.
//!
//! Time is paused, so the two-second quiet period elapses instantly and
//! deterministically.
//!
//! Run with: cargo test -p quill-client --test editor_autosave_test

mod support;

use std::sync::Arc;
use std::time::Duration;

use quill_client::{EditOutcome, EditorSession, GoalStore, StoryStore};
use shared_types::{AutosavePhase, EditEvent, Story};
use support::{MemoryGateway, Op};
use uuid::Uuid;

const DELAY: Duration = Duration::from_millis(2000);

struct Harness {
    gateway: Arc<MemoryGateway>,
    stories: Arc<StoryStore>,
    goals: Arc<GoalStore>,
    owner: Uuid,
    story: Story,
}

async fn harness(baseline_words: i64) -> Harness {
    let gateway = MemoryGateway::new();
    let owner = Uuid::new_v4();
    let story = support::story(owner, "The Ashen Crown", baseline_words);
    gateway.seed(&story);

    let stories = Arc::new(StoryStore::new(gateway.clone()));
    let goals = Arc::new(GoalStore::new(gateway.clone()));
    stories.fetch_stories(owner).await.unwrap();

    Harness {
        gateway,
        stories,
        goals,
        owner,
        story,
    }
}

impl Harness {
    fn open(&self) -> EditorSession {
        EditorSession::open(&self.story, self.stories.clone(), self.goals.clone(), DELAY)
    }

    fn story_updates(&self) -> usize {
        self.gateway.count(Op::Update, "stories")
    }
}

fn typed(text: &str) -> EditEvent {
    EditEvent::from_text(text, false)
}

fn saved(text: &str) -> EditEvent {
    EditEvent::from_text(text, true)
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_saves_once() {
    let h = harness(0).await;
    let editor = h.open();

    for text in ["The", "The crow", "The crow circled", "The crow circled twice"] {
        assert_eq!(editor.handle_edit(typed(text)).await, EditOutcome::Scheduled);
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    assert_eq!(h.story_updates(), 0);
    assert_eq!(editor.phase(), AutosavePhase::TimerArmed);

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(h.story_updates(), 1);
    let stored: Story = h.gateway.row(h.story.id).unwrap();
    assert_eq!(stored.content, "<p>The crow circled twice</p>");
    assert_eq!(stored.word_count, 4);
    assert!(editor.last_saved().is_some());
    assert_eq!(editor.phase(), AutosavePhase::Idle);

    // The cached list and the current story follow the save.
    let cached = h.stories.current_story().unwrap();
    assert_eq!(cached.word_count, 4);
    assert_eq!(h.stories.stories()[0].word_count, 4);
}

#[tokio::test(start_paused = true)]
async fn test_quiet_period_restarts_on_each_edit() {
    let h = harness(0).await;
    let editor = h.open();

    editor.handle_edit(typed("one")).await;
    tokio::time::sleep(Duration::from_millis(1900)).await;
    editor.handle_edit(typed("one two")).await;
    tokio::time::sleep(Duration::from_millis(1900)).await;
    assert_eq!(h.story_updates(), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.story_updates(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_save_cancels_pending_timer() {
    let h = harness(10).await;
    let editor = h.open();

    editor.handle_edit(typed("draft words here")).await;
    let outcome = editor.handle_edit(saved("draft words here and more")).await;
    let EditOutcome::Saved(outcome) = outcome else {
        panic!("expected an immediate save, got {outcome:?}");
    };
    assert_eq!(outcome.words_added, 5 - 10);
    assert_eq!(h.story_updates(), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.story_updates(), 1, "the superseded timer must not save");
}

#[tokio::test(start_paused = true)]
async fn test_closing_editor_drops_pending_save() {
    let h = harness(0).await;
    let editor = h.open();

    editor.handle_edit(typed("words that never land")).await;
    assert!(editor.has_unsaved_changes());
    assert!(editor.close());
    assert_eq!(editor.handle_edit(typed("after close")).await, EditOutcome::Ignored);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.story_updates(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_editor_drops_pending_save() {
    let h = harness(0).await;
    {
        let editor = h.open();
        editor.handle_edit(typed("navigated away mid-sentence")).await;
    }
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.story_updates(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_save_keeps_baseline() {
    let h = harness(2).await;
    let editor = h.open();

    h.gateway.fail_table("stories");
    assert_eq!(
        editor.handle_edit(saved("a b c d e")).await,
        EditOutcome::SaveFailed
    );
    assert!(editor.last_saved().is_none());
    let stored: Story = h.gateway.row(h.story.id).unwrap();
    assert_eq!(stored.word_count, 2);

    h.gateway.heal_table("stories");
    let EditOutcome::Saved(outcome) = editor.handle_edit(saved("a b c d e f")).await else {
        panic!("expected the retry to save");
    };
    assert_eq!(outcome.words_added, 4);
    assert!(editor.last_saved().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_save_credits_active_goals() {
    let h = harness(100).await;
    let goal = support::goal(h.owner, "Midwinter draft", 1000, 300, 1);
    h.gateway.seed(&goal);
    h.goals.fetch_goals(h.owner).await.unwrap();

    let editor = h.open();
    let text = vec!["word"; 130].join(" ");
    let EditOutcome::Saved(outcome) = editor.handle_edit(saved(&text)).await else {
        panic!("expected an immediate save");
    };
    assert_eq!(outcome.words_added, 30);
    assert_eq!(h.goals.goals()[0].current_words, 330);

    // Shrinking the story credits nothing.
    let text = vec!["word"; 90].join(" ");
    editor.handle_edit(saved(&text)).await;
    assert_eq!(h.goals.goals()[0].current_words, 330);
    assert_eq!(h.gateway.count(Op::Update, "writing_goals"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deferred_save_credits_goals() {
    let h = harness(0).await;
    let goal = support::goal(h.owner, "Daily pages", 500, 0, 1);
    h.gateway.seed(&goal);
    h.goals.fetch_goals(h.owner).await.unwrap();

    let editor = h.open();
    editor.handle_edit(typed("ink and ash and bone")).await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    let stored: shared_types::WritingGoal = h.gateway.row(goal.id).unwrap();
    assert_eq!(stored.current_words, 5);
}
