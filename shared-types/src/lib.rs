//! Shared types between the native client and the web UI
//!
//! These types are used by both:
//! - `quill-client` (native Rust, tokio + reqwest)
//! - `quill-ui` Dioxus components (WASM)
//!
//! Rows are serialized with serde exactly as the hosted PostgREST tables
//! expose them, so the same structs travel over HTTP on both sides.

pub mod autosave;
pub mod forms;
pub mod goal_progress;
pub mod markup;
pub mod routes;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub use autosave::{
    AutosaveCommand, AutosaveMachine, AutosavePhase, EditEvent, SaveOutcome, SaveRequest,
    DEFAULT_AUTOSAVE_DELAY_MS,
};
pub use forms::{AuthErrorKind, AuthForm, AuthMode, FormErrors};
pub use goal_progress::GoalHealth;
pub use routes::AppRoute;

/// Base product name, used for page titles and the sidebar header.
pub const APP_NAME: &str = "Mystical Quill";

/// Columns the hosted database leaves `NULL` decode to the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ============================================================================
// Auth
// ============================================================================

/// The signed-in account as reported by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
}

/// Token pair issued by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of `access_token`.
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// True once the access token is within `margin_secs` of expiring.
    pub fn is_expired(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        self.expires_at <= now + chrono::Duration::seconds(margin_secs)
    }
}

/// A session transition, as reported to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn(AuthUser),
    SignedOut,
    TokenRefreshed(AuthUser),
}

impl SessionChange {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionChange::SignedIn(user) | SessionChange::TokenRefreshed(user) => Some(user),
            SessionChange::SignedOut => None,
        }
    }

    /// The transition from one stored session to the next, if any.
    pub fn between(previous: Option<&Session>, next: Option<&Session>) -> Option<Self> {
        match (previous, next) {
            (None, None) => None,
            (Some(_), None) => Some(SessionChange::SignedOut),
            (None, Some(next)) => Some(SessionChange::SignedIn(next.user.clone())),
            (Some(prev), Some(next)) if prev.user.id != next.user.id => {
                Some(SessionChange::SignedIn(next.user.clone()))
            }
            (Some(prev), Some(next)) if prev.access_token != next.access_token => {
                Some(SessionChange::TokenRefreshed(next.user.clone()))
            }
            (Some(_), Some(_)) => None,
        }
    }
}

/// Token grant as the auth provider returns it from `/token` and `/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

impl TokenGrant {
    /// Absolute expiry comes from `expires_at` when present, else from
    /// `expires_in` (one hour if neither is sent).
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .unwrap_or_else(|| now + chrono::Duration::seconds(self.expires_in.unwrap_or(3600)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

// ============================================================================
// Stories
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Published,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Draft => "draft",
            StoryStatus::InProgress => "in_progress",
            StoryStatus::Completed => "completed",
            StoryStatus::Published => "published",
        }
    }

    /// Label shown on story cards.
    pub fn label(&self) -> &'static str {
        match self {
            StoryStatus::Draft => "Draft",
            StoryStatus::InProgress => "In Progress",
            StoryStatus::Completed => "Completed",
            StoryStatus::Published => "Published",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Story {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StoryStatus,
    /// Rich-text body as HTML markup.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub word_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of the "Start a New Tale" form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct NewStory {
    pub user_id: Uuid,
    #[validate(custom(function = "non_blank"))]
    pub title: String,
    pub description: String,
    pub genre: String,
    pub status: StoryStatus,
    pub word_count: i64,
}

impl NewStory {
    /// A fresh draft with no words yet.
    pub fn draft(
        user_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            title: title.into().trim().to_string(),
            description: description.into(),
            genre: genre.into(),
            status: StoryStatus::Draft,
            word_count: 0,
        }
    }
}

/// Partial update; `None` fields are left untouched by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StoryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoryPatch {
    /// The body written by an editor save.
    pub fn content(html: impl Into<String>, word_count: i64, at: DateTime<Utc>) -> Self {
        Self {
            content: Some(html.into()),
            word_count: Some(word_count),
            updated_at: Some(at),
            ..Self::default()
        }
    }
}

// ============================================================================
// Story-owned records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Character {
    pub id: Uuid,
    pub story_id: Uuid,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub backstory: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct NewCharacter {
    pub story_id: Uuid,
    #[validate(custom(function = "non_blank"))]
    pub name: String,
    pub role: String,
    pub description: String,
    pub backstory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CharacterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlotPoint {
    pub id: Uuid,
    pub story_id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Position within the story's outline; lists are ascending by this.
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct NewPlotPoint {
    pub story_id: Uuid,
    #[validate(custom(function = "non_blank"))]
    pub title: String,
    pub description: String,
    pub order_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlotPointPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldElement {
    pub id: Uuid,
    pub story_id: Uuid,
    pub name: String,
    /// Free-form category ("location", "faction", "artifact", ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub element_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct NewWorldElement {
    pub story_id: Uuid,
    #[validate(custom(function = "non_blank"))]
    pub name: String,
    pub element_type: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WorldElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// Writing goals
// ============================================================================

/// Days allotted to a goal when the form leaves the field blank.
pub const DEFAULT_TARGET_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WritingGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub target_words: i64,
    #[serde(default = "default_target_days")]
    pub target_days: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_words: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_target_days() -> i64 {
    DEFAULT_TARGET_DAYS
}

impl WritingGoal {
    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }
}

/// Payload of the "Forge New Goal" form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct NewGoal {
    pub user_id: Uuid,
    #[validate(custom(function = "non_blank"))]
    pub title: String,
    pub description: String,
    #[validate(range(min = 1))]
    pub target_words: i64,
    /// At most a century.
    #[validate(range(min = 1, max = 36500))]
    pub target_days: i64,
    pub current_words: i64,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
}

impl NewGoal {
    /// Build a goal from raw form input. A blank or unparsable day count
    /// falls back to [`DEFAULT_TARGET_DAYS`]; an unparsable word target
    /// becomes 0 and is rejected by validation.
    pub fn from_form(
        user_id: Uuid,
        title: &str,
        description: &str,
        target_words: &str,
        target_days: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let target_days = target_days
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_TARGET_DAYS);
        Self {
            user_id,
            title: title.trim().to_string(),
            description: description.to_string(),
            target_words: target_words.trim().parse().unwrap_or(0),
            target_days,
            current_words: 0,
            status: GoalStatus::Active,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GoalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_words: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_words: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl GoalPatch {
    /// Progress fields to persist after `before` became `after`.
    ///
    /// Status and completion stamp are only sent on the transition into
    /// `completed`.
    pub fn from_progress(before: &WritingGoal, after: &WritingGoal) -> Self {
        let completed_now =
            before.status != GoalStatus::Completed && after.status == GoalStatus::Completed;
        Self {
            current_words: Some(after.current_words),
            updated_at: Some(after.updated_at),
            status: completed_now.then_some(GoalStatus::Completed),
            completed_at: if completed_now {
                after.completed_at
            } else {
                None
            },
            ..Self::default()
        }
    }
}

// ============================================================================
// Tables
// ============================================================================

/// A row type stored in one backend table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type New: Serialize + Send + Sync;
    type Patch: Serialize + Send + Sync;

    const TABLE: &'static str;
    /// Column that scopes a listing: the owner for top-level rows, the story
    /// for story-owned rows.
    const SCOPE_COLUMN: &'static str;
    /// Listing order as `(column, ascending)`.
    const ORDER: (&'static str, bool);

    fn id(&self) -> Uuid;

    /// PostgREST `order` parameter, e.g. `updated_at.desc`.
    fn order_param() -> String {
        let (column, ascending) = Self::ORDER;
        format!("{column}.{}", if ascending { "asc" } else { "desc" })
    }
}

macro_rules! record {
    ($row:ty, $new:ty, $patch:ty, $table:literal, $scope:literal, $order:literal, $asc:literal) => {
        impl Record for $row {
            type New = $new;
            type Patch = $patch;
            const TABLE: &'static str = $table;
            const SCOPE_COLUMN: &'static str = $scope;
            const ORDER: (&'static str, bool) = ($order, $asc);

            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

record!(Story, NewStory, StoryPatch, "stories", "user_id", "updated_at", false);
record!(WritingGoal, NewGoal, GoalPatch, "writing_goals", "user_id", "created_at", false);
record!(Character, NewCharacter, CharacterPatch, "characters", "story_id", "created_at", false);
record!(PlotPoint, NewPlotPoint, PlotPointPatch, "plot_points", "story_id", "order_index", true);
record!(WorldElement, NewWorldElement, WorldElementPatch, "world_elements", "story_id", "created_at", false);

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_story_status_serialization() {
        let json = serde_json::to_string(&StoryStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(StoryStatus::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn test_story_null_columns_decode_to_defaults() {
        let json = serde_json::json!({
            "id": "6d3f1a52-7f35-4a6b-9f0e-7a1c2b3d4e5f",
            "user_id": "0b8a9c1d-2e3f-4a5b-8c7d-6e5f4a3b2c1d",
            "title": "The Ashen Crown",
            "description": null,
            "genre": null,
            "status": "draft",
            "content": null,
            "word_count": null,
            "created_at": "2026-01-02T03:04:05Z",
            "updated_at": "2026-01-02T03:04:05Z"
        });
        let story: Story = serde_json::from_value(json).unwrap();
        assert_eq!(story.content, "");
        assert_eq!(story.word_count, 0);
        assert_eq!(story.status, StoryStatus::Draft);
    }

    #[test]
    fn test_patch_omits_unset_fields() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let patch = StoryPatch::content("<p>Once</p>", 1, at);
        let value = serde_json::to_value(&patch).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 3);
        assert!(value.get("title").is_none());
        assert_eq!(value["word_count"], 1);
    }

    #[test]
    fn test_new_goal_from_form_defaults_days() {
        let now = Utc::now();
        let goal = NewGoal::from_form(Uuid::nil(), "  NaNoWriMo ", "", "50000", "", now);
        assert_eq!(goal.title, "NaNoWriMo");
        assert_eq!(goal.target_days, DEFAULT_TARGET_DAYS);
        assert_eq!(goal.current_words, 0);
        assert_eq!(goal.status, GoalStatus::Active);
        assert!(goal.validate().is_ok());

        let goal = NewGoal::from_form(Uuid::nil(), "Sprint", "", "abc", "7", now);
        assert_eq!(goal.target_days, 7);
        assert!(goal.validate().is_err());
    }

    #[test]
    fn test_new_goal_rejects_days_past_a_century() {
        let now = Utc::now();
        let goal = NewGoal::from_form(Uuid::nil(), "Epic", "", "1000", "100000000", now);
        assert!(goal.validate().is_err());
        let goal = NewGoal::from_form(Uuid::nil(), "Epic", "", "1000", "36500", now);
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn test_new_story_rejects_blank_title() {
        let story = NewStory::draft(Uuid::nil(), "   ", "", "");
        assert!(story.validate().is_err());
        let story = NewStory::draft(Uuid::nil(), "Embers", "", "Fantasy");
        assert!(story.validate().is_ok());
        assert_eq!(story.status, StoryStatus::Draft);
    }

    #[test]
    fn test_token_grant_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let grant: TokenGrant = serde_json::from_value(serde_json::json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 600,
            "user": { "id": "0b8a9c1d-2e3f-4a5b-8c7d-6e5f4a3b2c1d", "email": null }
        }))
        .unwrap();
        let session = grant.clone().into_session(now);
        assert_eq!(session.expires_at, now + chrono::Duration::seconds(600));
        assert_eq!(session.user.email, "");

        let grant = TokenGrant {
            expires_at: Some(now.timestamp() + 30),
            ..grant
        };
        assert_eq!(
            grant.into_session(now).expires_at,
            now + chrono::Duration::seconds(30)
        );
    }

    #[test]
    fn test_session_change_between_stored_sessions() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let session = |user: Uuid, token: &str| Session {
            access_token: token.to_string(),
            refresh_token: "r".to_string(),
            expires_at: now,
            user: AuthUser {
                id: user,
                email: "scribe@quill.test".to_string(),
            },
        };
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let first = session(a, "t1");

        assert_eq!(SessionChange::between(None, None), None);
        assert_eq!(
            SessionChange::between(None, Some(&first)),
            Some(SessionChange::SignedIn(first.user.clone()))
        );
        assert_eq!(
            SessionChange::between(Some(&first), None),
            Some(SessionChange::SignedOut)
        );
        let refreshed = session(a, "t2");
        assert_eq!(
            SessionChange::between(Some(&first), Some(&refreshed)),
            Some(SessionChange::TokenRefreshed(refreshed.user.clone()))
        );
        let other = session(b, "t3");
        assert!(matches!(
            SessionChange::between(Some(&first), Some(&other)),
            Some(SessionChange::SignedIn(user)) if user.id == b
        ));
        assert_eq!(SessionChange::between(Some(&first), Some(&first)), None);
    }

    #[test]
    fn test_table_ordering() {
        assert_eq!(PlotPoint::order_param(), "order_index.asc");
        assert_eq!(Story::order_param(), "updated_at.desc");
        assert_eq!(<WritingGoal as Record>::SCOPE_COLUMN, "user_id");
        assert_eq!(<WorldElement as Record>::SCOPE_COLUMN, "story_id");
    }

    #[test]
    fn test_session_expiry_margin() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let session = Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: now + chrono::Duration::seconds(30),
            user: AuthUser {
                id: Uuid::nil(),
                email: "scribe@example.com".into(),
            },
        };
        assert!(!session.is_expired(now, 10));
        assert!(session.is_expired(now, 60));
    }
}
