use std::sync::{Arc, RwLock};

use chrono::Utc;
use shared_types::goal_progress::{apply_word_delta, set_current_words};
use shared_types::{GoalPatch, NewGoal, WritingGoal};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{prepend, read, remove, replace, write};
use crate::error::{GatewayError, StoreError};
use crate::gateway::{DataGateway, RecordGateway};

#[derive(Debug, Clone, Default)]
pub struct GoalState {
    pub goals: Vec<WritingGoal>,
    pub loading: bool,
}

pub struct GoalStore {
    data: Arc<dyn DataGateway>,
    state: RwLock<GoalState>,
}

impl GoalStore {
    pub fn new(data: Arc<dyn DataGateway>) -> Self {
        Self {
            data,
            state: RwLock::new(GoalState::default()),
        }
    }

    pub fn snapshot(&self) -> GoalState {
        read(&self.state).clone()
    }

    pub fn goals(&self) -> Vec<WritingGoal> {
        read(&self.state).goals.clone()
    }

    pub fn active_goals(&self) -> Vec<WritingGoal> {
        read(&self.state)
            .goals
            .iter()
            .filter(|goal| goal.is_active())
            .cloned()
            .collect()
    }

    pub async fn fetch_goals(&self, owner: Uuid) -> Result<Vec<WritingGoal>, StoreError> {
        write(&self.state).loading = true;
        let result = RecordGateway::<WritingGoal>::list(self.data.as_ref(), owner).await;
        let mut state = write(&self.state);
        state.loading = false;
        let goals = result.inspect_err(|err| warn!(error = %err, "goal fetch failed"))?;
        state.goals = goals.clone();
        Ok(goals)
    }

    pub async fn create_goal(&self, new: NewGoal) -> Result<WritingGoal, StoreError> {
        new.validate()?;
        let goal = RecordGateway::<WritingGoal>::create(self.data.as_ref(), &new).await?;
        info!(goal_id = %goal.id, target = goal.target_words, "goal created");
        prepend(&mut write(&self.state).goals, goal.clone());
        Ok(goal)
    }

    pub async fn update_goal(&self, id: Uuid, patch: GoalPatch) -> Result<WritingGoal, StoreError> {
        Ok(self.persist(id, &patch).await?)
    }

    pub async fn delete_goal(&self, id: Uuid) -> Result<(), StoreError> {
        RecordGateway::<WritingGoal>::delete(self.data.as_ref(), id).await?;
        remove(&mut write(&self.state).goals, id);
        Ok(())
    }

    /// Manual progress entry. Same floor and completion rules as edits.
    pub async fn set_progress(&self, id: Uuid, words: i64) -> Result<WritingGoal, StoreError> {
        let Some(before) = read(&self.state).goals.iter().find(|g| g.id == id).cloned() else {
            return Err(GatewayError::NotFound {
                table: "writing_goals",
                id,
            }
            .into());
        };
        let after = set_current_words(&before, words, Utc::now());
        Ok(self
            .persist(id, &GoalPatch::from_progress(&before, &after))
            .await?)
    }

    /// Credit `words` to every active goal, one at a time. The first failure
    /// stops the run; goals already updated stay updated. Returns how many
    /// goals were written.
    pub async fn apply_words_added(&self, words: i64) -> Result<usize, GatewayError> {
        let mut updated = 0;
        for before in self.active_goals() {
            let after = apply_word_delta(&before, words, Utc::now());
            let patch = GoalPatch::from_progress(&before, &after);
            if let Err(err) = self.persist(before.id, &patch).await {
                warn!(
                    goal_id = %before.id,
                    updated,
                    error = %err,
                    "goal progress update failed, stopping"
                );
                return Err(err);
            }
            if after.is_active() != before.is_active() {
                info!(goal_id = %before.id, words = after.current_words, "goal completed");
            }
            updated += 1;
        }
        Ok(updated)
    }

    async fn persist(&self, id: Uuid, patch: &GoalPatch) -> Result<WritingGoal, GatewayError> {
        let goal = RecordGateway::<WritingGoal>::update(self.data.as_ref(), id, patch).await?;
        replace(&mut write(&self.state).goals, &goal);
        Ok(goal)
    }
}
