use std::sync::{Arc, RwLock};

use shared_types::{
    Character, CharacterPatch, NewCharacter, NewPlotPoint, NewStory, NewWorldElement, PlotPoint,
    PlotPointPatch, Story, StoryPatch, WorldElement, WorldElementPatch,
};
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use super::{prepend, read, remove, replace, write};
use crate::error::{GatewayError, StoreError};
use crate::gateway::{DataGateway, RecordGateway};

#[derive(Debug, Clone, Default)]
pub struct StoryState {
    pub stories: Vec<Story>,
    pub current_story: Option<Story>,
    pub characters: Vec<Character>,
    /// Always ascending by `order_index`.
    pub plot_points: Vec<PlotPoint>,
    pub world_elements: Vec<WorldElement>,
    pub loading: bool,
}

pub struct StoryStore {
    data: Arc<dyn DataGateway>,
    state: RwLock<StoryState>,
}

fn logged<T>(op: &'static str, result: Result<T, GatewayError>) -> Result<T, GatewayError> {
    if let Err(err) = &result {
        warn!(op, error = %err, "story store request failed");
    }
    result
}

fn sort_plot_points(points: &mut [PlotPoint]) {
    points.sort_by_key(|point| point.order_index);
}

impl StoryStore {
    pub fn new(data: Arc<dyn DataGateway>) -> Self {
        Self {
            data,
            state: RwLock::new(StoryState::default()),
        }
    }

    pub fn snapshot(&self) -> StoryState {
        read(&self.state).clone()
    }

    pub fn stories(&self) -> Vec<Story> {
        read(&self.state).stories.clone()
    }

    pub fn current_story(&self) -> Option<Story> {
        read(&self.state).current_story.clone()
    }

    /// Switching to another story drops the previous story's records.
    pub fn set_current_story(&self, story: Option<Story>) {
        let mut state = write(&self.state);
        let same = state.current_story.as_ref().map(|s| s.id) == story.as_ref().map(|s| s.id);
        if !same {
            state.characters.clear();
            state.plot_points.clear();
            state.world_elements.clear();
        }
        state.current_story = story;
    }

    /// Cached story by id, falling back to a fresh listing for `owner`.
    pub async fn find_story(&self, owner: Uuid, id: Uuid) -> Result<Option<Story>, StoreError> {
        let cached = read(&self.state).stories.iter().find(|s| s.id == id).cloned();
        if cached.is_some() {
            return Ok(cached);
        }
        let stories = self.fetch_stories(owner).await?;
        Ok(stories.into_iter().find(|s| s.id == id))
    }

    // ========================================================================
    // Stories
    // ========================================================================

    pub async fn fetch_stories(&self, owner: Uuid) -> Result<Vec<Story>, StoreError> {
        write(&self.state).loading = true;
        let result = logged(
            "fetch_stories",
            RecordGateway::<Story>::list(self.data.as_ref(), owner).await,
        );
        let mut state = write(&self.state);
        state.loading = false;
        let stories = result?;
        debug!(%owner, count = stories.len(), "stories loaded");
        state.stories = stories.clone();
        Ok(stories)
    }

    pub async fn create_story(&self, new: NewStory) -> Result<Story, StoreError> {
        new.validate()?;
        let story = logged(
            "create_story",
            RecordGateway::<Story>::create(self.data.as_ref(), &new).await,
        )?;
        prepend(&mut write(&self.state).stories, story.clone());
        Ok(story)
    }

    pub async fn update_story(&self, id: Uuid, patch: StoryPatch) -> Result<Story, StoreError> {
        let story = logged(
            "update_story",
            RecordGateway::<Story>::update(self.data.as_ref(), id, &patch).await,
        )?;
        let mut state = write(&self.state);
        replace(&mut state.stories, &story);
        if state.current_story.as_ref().is_some_and(|s| s.id == id) {
            state.current_story = Some(story.clone());
        }
        Ok(story)
    }

    pub async fn delete_story(&self, id: Uuid) -> Result<(), StoreError> {
        logged(
            "delete_story",
            RecordGateway::<Story>::delete(self.data.as_ref(), id).await,
        )?;
        let mut state = write(&self.state);
        remove(&mut state.stories, id);
        if state.current_story.as_ref().is_some_and(|s| s.id == id) {
            state.current_story = None;
        }
        Ok(())
    }

    // ========================================================================
    // Characters
    // ========================================================================

    pub async fn fetch_characters(&self, story_id: Uuid) -> Result<Vec<Character>, StoreError> {
        let characters = logged(
            "fetch_characters",
            RecordGateway::<Character>::list(self.data.as_ref(), story_id).await,
        )?;
        write(&self.state).characters = characters.clone();
        Ok(characters)
    }

    pub async fn create_character(&self, new: NewCharacter) -> Result<Character, StoreError> {
        new.validate()?;
        let character = logged(
            "create_character",
            RecordGateway::<Character>::create(self.data.as_ref(), &new).await,
        )?;
        prepend(&mut write(&self.state).characters, character.clone());
        Ok(character)
    }

    pub async fn update_character(
        &self,
        id: Uuid,
        patch: CharacterPatch,
    ) -> Result<Character, StoreError> {
        let character = logged(
            "update_character",
            RecordGateway::<Character>::update(self.data.as_ref(), id, &patch).await,
        )?;
        replace(&mut write(&self.state).characters, &character);
        Ok(character)
    }

    pub async fn delete_character(&self, id: Uuid) -> Result<(), StoreError> {
        logged(
            "delete_character",
            RecordGateway::<Character>::delete(self.data.as_ref(), id).await,
        )?;
        remove(&mut write(&self.state).characters, id);
        Ok(())
    }

    // ========================================================================
    // Plot points
    // ========================================================================

    pub async fn fetch_plot_points(&self, story_id: Uuid) -> Result<Vec<PlotPoint>, StoreError> {
        let mut points = logged(
            "fetch_plot_points",
            RecordGateway::<PlotPoint>::list(self.data.as_ref(), story_id).await,
        )?;
        sort_plot_points(&mut points);
        write(&self.state).plot_points = points.clone();
        Ok(points)
    }

    pub async fn create_plot_point(&self, new: NewPlotPoint) -> Result<PlotPoint, StoreError> {
        new.validate()?;
        let point = logged(
            "create_plot_point",
            RecordGateway::<PlotPoint>::create(self.data.as_ref(), &new).await,
        )?;
        let mut state = write(&self.state);
        state.plot_points.push(point.clone());
        sort_plot_points(&mut state.plot_points);
        Ok(point)
    }

    pub async fn update_plot_point(
        &self,
        id: Uuid,
        patch: PlotPointPatch,
    ) -> Result<PlotPoint, StoreError> {
        let point = logged(
            "update_plot_point",
            RecordGateway::<PlotPoint>::update(self.data.as_ref(), id, &patch).await,
        )?;
        let mut state = write(&self.state);
        replace(&mut state.plot_points, &point);
        sort_plot_points(&mut state.plot_points);
        Ok(point)
    }

    pub async fn delete_plot_point(&self, id: Uuid) -> Result<(), StoreError> {
        logged(
            "delete_plot_point",
            RecordGateway::<PlotPoint>::delete(self.data.as_ref(), id).await,
        )?;
        remove(&mut write(&self.state).plot_points, id);
        Ok(())
    }

    // ========================================================================
    // World elements
    // ========================================================================

    pub async fn fetch_world_elements(
        &self,
        story_id: Uuid,
    ) -> Result<Vec<WorldElement>, StoreError> {
        let elements = logged(
            "fetch_world_elements",
            RecordGateway::<WorldElement>::list(self.data.as_ref(), story_id).await,
        )?;
        write(&self.state).world_elements = elements.clone();
        Ok(elements)
    }

    pub async fn create_world_element(
        &self,
        new: NewWorldElement,
    ) -> Result<WorldElement, StoreError> {
        new.validate()?;
        let element = logged(
            "create_world_element",
            RecordGateway::<WorldElement>::create(self.data.as_ref(), &new).await,
        )?;
        prepend(&mut write(&self.state).world_elements, element.clone());
        Ok(element)
    }

    pub async fn update_world_element(
        &self,
        id: Uuid,
        patch: WorldElementPatch,
    ) -> Result<WorldElement, StoreError> {
        let element = logged(
            "update_world_element",
            RecordGateway::<WorldElement>::update(self.data.as_ref(), id, &patch).await,
        )?;
        replace(&mut write(&self.state).world_elements, &element);
        Ok(element)
    }

    pub async fn delete_world_element(&self, id: Uuid) -> Result<(), StoreError> {
        logged(
            "delete_world_element",
            RecordGateway::<WorldElement>::delete(self.data.as_ref(), id).await,
        )?;
        remove(&mut write(&self.state).world_elements, id);
        Ok(())
    }
}
