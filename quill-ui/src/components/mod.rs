pub mod editor;
pub mod goals;
pub mod placeholders;
pub mod stories;
pub mod styles;

pub use editor::StoryEditor;
pub use goals::GoalsPage;
pub use placeholders::Placeholder;
pub use stories::StoriesPage;
