use chrono::Utc;
use dioxus::prelude::*;
use dioxus_logger::tracing::{info, warn};
use shared_types::goal_progress::apply_word_delta;
use shared_types::{
    AppRoute, AuthMode, AuthUser, GoalPatch, Record, SessionChange, Story, WritingGoal,
};

use crate::api;

#[derive(Clone, Debug, PartialEq, Default)]
pub enum AuthState {
    /// The stored session has not been checked yet.
    #[default]
    Unknown,
    Unauthenticated,
    Authenticated(AuthUser),
}

impl AuthState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn from_change(change: &SessionChange) -> Self {
        match change.user() {
            Some(user) => AuthState::Authenticated(user.clone()),
            None => AuthState::Unauthenticated,
        }
    }
}

/// Write only real transitions; a refreshed token for the same user must
/// not reload the workspace.
pub fn set_auth(mut auth: Signal<AuthState>, next: AuthState) {
    if *auth.peek() != next {
        auth.set(next);
    }
}

/// Application state shared through context. Every field is a signal, so the
/// struct is `Copy` and async tasks can hold it.
#[derive(Clone, Copy)]
pub struct AppState {
    pub auth: Signal<AuthState>,
    pub auth_mode: Signal<AuthMode>,
    pub route: Signal<AppRoute>,
    pub stories: Signal<Vec<Story>>,
    pub stories_loading: Signal<bool>,
    pub goals: Signal<Vec<WritingGoal>>,
    pub goals_loading: Signal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            auth: Signal::new(AuthState::default()),
            auth_mode: Signal::new(AuthMode::default()),
            route: Signal::new(crate::effects::current_route()),
            stories: Signal::new(Vec::new()),
            stories_loading: Signal::new(true),
            goals: Signal::new(Vec::new()),
            goals_loading: Signal::new(true),
        }
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.auth.read().user().cloned()
    }

    pub fn story(&self, id: uuid::Uuid) -> Option<Story> {
        self.stories.read().iter().find(|s| s.id == id).cloned()
    }

    pub fn clear_workspace(&mut self) {
        self.stories.set(Vec::new());
        self.goals.set(Vec::new());
        self.stories_loading.set(true);
        self.goals_loading.set(true);
    }
}

// ============================================================================
// Cached rows
// ============================================================================

pub fn prepend_row<R: Record>(mut rows: Signal<Vec<R>>, row: R) {
    rows.write().insert(0, row);
}

pub fn replace_row<R: Record>(mut rows: Signal<Vec<R>>, row: R) {
    let mut rows = rows.write();
    if let Some(slot) = rows.iter_mut().find(|r| r.id() == row.id()) {
        *slot = row;
    }
}

pub fn remove_row<R: Record>(mut rows: Signal<Vec<R>>, id: uuid::Uuid) {
    rows.write().retain(|r| r.id() != id);
}

// ============================================================================
// Goals
// ============================================================================

/// Persist a goal's new progress and mirror it in the cache.
pub async fn save_goal_progress(
    goals: Signal<Vec<WritingGoal>>,
    before: &WritingGoal,
    after: &WritingGoal,
) -> Result<WritingGoal, String> {
    let patch = GoalPatch::from_progress(before, after);
    let saved = api::update::<WritingGoal>(before.id, &patch).await?;
    replace_row(goals, saved.clone());
    Ok(saved)
}

/// Credit `words` to every cached active goal, one request at a time. The
/// first failure stops the run; goals already updated stay updated.
pub async fn apply_words_added(goals: Signal<Vec<WritingGoal>>, words: i64) -> Result<usize, String> {
    let active: Vec<WritingGoal> = goals.read().iter().filter(|g| g.is_active()).cloned().collect();
    let mut credited = 0;
    for goal in active {
        let updated = apply_word_delta(&goal, words, Utc::now());
        if let Err(e) = save_goal_progress(goals, &goal, &updated).await {
            warn!("Failed to credit {words} words to goal {}: {e}", goal.id);
            return Err(e);
        }
        credited += 1;
    }
    info!("Credited {words} words to {credited} goals");
    Ok(credited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn session_changes_map_to_auth_state() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: "scribe@quill.test".to_string(),
        };
        assert_eq!(
            AuthState::from_change(&SessionChange::SignedIn(user.clone())),
            AuthState::Authenticated(user.clone())
        );
        // Same user after a refresh: equal state, so nothing is written.
        assert_eq!(
            AuthState::from_change(&SessionChange::TokenRefreshed(user.clone())),
            AuthState::Authenticated(user)
        );
        assert_eq!(
            AuthState::from_change(&SessionChange::SignedOut),
            AuthState::Unauthenticated
        );
    }
}
