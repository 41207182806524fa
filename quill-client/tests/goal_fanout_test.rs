//! Word-delta fan-out to active goals and manual progress edits.
//!
//! Run with: cargo test -p quill-client --test goal_fanout_test

mod support;

use std::sync::Arc;

use chrono::Utc;
use quill_client::{GoalStore, StoreError};
use shared_types::{GoalStatus, NewGoal, WritingGoal};
use support::{MemoryGateway, Op};
use uuid::Uuid;

async fn store_with(goals: &[WritingGoal]) -> (Arc<MemoryGateway>, GoalStore, Uuid) {
    let gateway = MemoryGateway::new();
    let owner = goals.first().map(|g| g.user_id).unwrap_or_else(Uuid::new_v4);
    for goal in goals {
        gateway.seed(goal);
    }
    let store = GoalStore::new(gateway.clone());
    store.fetch_goals(owner).await.unwrap();
    (gateway, store, owner)
}

#[tokio::test]
async fn test_delta_is_credited_to_every_active_goal() {
    let owner = Uuid::new_v4();
    let a = support::goal(owner, "A", 500, 100, 2);
    let b = support::goal(owner, "B", 2000, 1800, 1);
    let mut done = support::goal(owner, "Done", 100, 100, 3);
    done.status = GoalStatus::Completed;
    let (gateway, store, _) = store_with(&[a.clone(), b.clone(), done.clone()]).await;

    assert_eq!(store.apply_words_added(50).await.unwrap(), 2);

    let a_row: WritingGoal = gateway.row(a.id).unwrap();
    let b_row: WritingGoal = gateway.row(b.id).unwrap();
    assert_eq!(a_row.current_words, 150);
    assert_eq!(b_row.current_words, 1850);
    assert_eq!(gateway.row::<WritingGoal>(done.id).unwrap().current_words, 100);
    assert_eq!(gateway.count(Op::Update, "writing_goals"), 2);

    // The cache mirrors what was persisted.
    let cached: Vec<i64> = store.goals().iter().map(|g| g.current_words).collect();
    assert_eq!(cached, vec![1850, 150, 100]);
}

#[tokio::test]
async fn test_reaching_target_completes_goal() {
    let owner = Uuid::new_v4();
    let goal = support::goal(owner, "Novella", 1000, 950, 1);
    let (gateway, store, _) = store_with(&[goal.clone()]).await;

    store.apply_words_added(60).await.unwrap();

    let row: WritingGoal = gateway.row(goal.id).unwrap();
    assert_eq!(row.current_words, 1010);
    assert_eq!(row.status, GoalStatus::Completed);
    assert!(row.completed_at.is_some());

    let patch = &gateway.calls()[1].body.clone().unwrap();
    assert_eq!(patch["status"], "completed");
    assert!(patch.get("completed_at").is_some());

    // Completed goals are no longer credited.
    assert_eq!(store.apply_words_added(10).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failure_stops_the_run_without_rollback() {
    let owner = Uuid::new_v4();
    let newest = support::goal(owner, "Newest", 5000, 0, 1);
    let middle = support::goal(owner, "Middle", 5000, 0, 2);
    let oldest = support::goal(owner, "Oldest", 5000, 0, 3);
    let (gateway, store, _) =
        store_with(&[oldest.clone(), middle.clone(), newest.clone()]).await;

    gateway.fail_row(middle.id);
    let err = store.apply_words_added(25).await.unwrap_err();
    assert!(err.to_string().contains("injected failure"));

    assert_eq!(gateway.row::<WritingGoal>(newest.id).unwrap().current_words, 25);
    assert_eq!(gateway.row::<WritingGoal>(middle.id).unwrap().current_words, 0);
    assert_eq!(gateway.row::<WritingGoal>(oldest.id).unwrap().current_words, 0);
    assert_eq!(gateway.count(Op::Update, "writing_goals"), 2);
}

#[tokio::test]
async fn test_manual_progress_floors_at_zero() {
    let owner = Uuid::new_v4();
    let goal = support::goal(owner, "Sprint", 800, 120, 1);
    let (gateway, store, _) = store_with(&[goal.clone()]).await;

    let updated = store.set_progress(goal.id, -40).await.unwrap();
    assert_eq!(updated.current_words, 0);
    assert_eq!(updated.status, GoalStatus::Active);

    let updated = store.set_progress(goal.id, 800).await.unwrap();
    assert_eq!(updated.status, GoalStatus::Completed);
    assert_eq!(gateway.row::<WritingGoal>(goal.id).unwrap().status, GoalStatus::Completed);

    let missing = store.set_progress(Uuid::new_v4(), 10).await.unwrap_err();
    assert!(matches!(missing, StoreError::Gateway(_)));
}

#[tokio::test]
async fn test_create_validates_before_any_request() {
    let (gateway, store, owner) = store_with(&[]).await;

    let bad = NewGoal::from_form(owner, "  ", "", "1000", "", Utc::now());
    assert!(matches!(
        store.create_goal(bad).await,
        Err(StoreError::Validation(_))
    ));
    assert_eq!(gateway.count(Op::Create, "writing_goals"), 0);

    let good = NewGoal::from_form(owner, "Winter tome", "", "20000", "", Utc::now());
    let created = store.create_goal(good).await.unwrap();
    assert_eq!(created.target_days, 30);
    assert_eq!(store.goals()[0].id, created.id);

    store.delete_goal(created.id).await.unwrap();
    assert!(store.goals().is_empty());
}
