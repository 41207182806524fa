pub mod api;
pub mod auth;
pub mod components;
pub mod effects;
pub mod shell;
pub mod state;

pub use auth::AuthPage;
pub use components::*;
pub use shell::QuillShell;
pub use state::{AppState, AuthState};
