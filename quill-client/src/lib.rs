//! Native client for Mystical Quill.
//!
//! - [`gateway`]: the session and data seams the stores are written against
//! - [`supabase`]: their implementation over the hosted auth and REST APIs
//! - [`store`]: cached application state and its mutations
//! - [`editor`]: debounced autosave of an open story, with goal crediting

pub mod config;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod store;
pub mod supabase;
pub mod telemetry;

pub use config::Config;
pub use editor::{EditOutcome, EditorSession};
pub use error::{AuthError, ConfigError, GatewayError, StoreError};
pub use gateway::{
    DataGateway, Record, RecordGateway, SessionChange, SessionGateway, SessionHub, Subscription,
};
pub use store::{AppStore, GoalStore, SessionStore, StoryStore};
pub use supabase::SupabaseClient;
