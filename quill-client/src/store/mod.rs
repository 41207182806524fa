//! Application state container.
//!
//! Each store owns one `RwLock`ed state struct. Readers get cloned
//! snapshots; only store methods write, and never while a request is
//! outstanding.

mod goals;
mod session;
mod stories;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use goals::{GoalState, GoalStore};
pub use session::{SessionState, SessionStore};
pub use stories::{StoryState, StoryStore};

use crate::gateway::{DataGateway, Record, SessionGateway};
use crate::supabase::SupabaseClient;

pub struct AppStore {
    pub session: Arc<SessionStore>,
    pub stories: Arc<StoryStore>,
    pub goals: Arc<GoalStore>,
}

impl AppStore {
    pub fn new(auth: Arc<dyn SessionGateway>, data: Arc<dyn DataGateway>) -> Self {
        Self {
            session: Arc::new(SessionStore::new(auth)),
            stories: Arc::new(StoryStore::new(data.clone())),
            goals: Arc::new(GoalStore::new(data)),
        }
    }

    /// Both gateways backed by one hosted project.
    pub fn supabase(client: SupabaseClient) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client)
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn prepend<R: Record>(rows: &mut Vec<R>, row: R) {
    rows.retain(|existing| existing.id() != row.id());
    rows.insert(0, row);
}

fn replace<R: Record>(rows: &mut [R], row: &R) {
    if let Some(slot) = rows.iter_mut().find(|existing| existing.id() == row.id()) {
        *slot = row.clone();
    }
}

fn remove<R: Record>(rows: &mut Vec<R>, id: uuid::Uuid) {
    rows.retain(|existing| existing.id() != id);
}
