//! Backend seams: who the writer is, and where their rows live.
//!
//! Stores only ever talk to these traits. [`crate::supabase::SupabaseClient`]
//! is the production implementation; tests plug in in-memory fakes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use shared_types::{AuthUser, Character, PlotPoint, Story, WorldElement, WritingGoal};
use uuid::Uuid;

use crate::error::{AuthError, GatewayError};

// ============================================================================
// Records
// ============================================================================

pub use shared_types::Record;

/// CRUD over one table, row-level security applies server side.
#[async_trait]
pub trait RecordGateway<R: Record>: Send + Sync {
    /// All rows whose [`Record::SCOPE_COLUMN`] equals `scope_id`, in
    /// [`Record::ORDER`].
    async fn list(&self, scope_id: Uuid) -> Result<Vec<R>, GatewayError>;

    /// Insert and return the stored row with server-assigned fields.
    async fn create(&self, new: &R::New) -> Result<R, GatewayError>;

    /// Apply a partial update; `NotFound` when no row matched.
    async fn update(&self, id: Uuid, patch: &R::Patch) -> Result<R, GatewayError>;

    async fn delete(&self, id: Uuid) -> Result<(), GatewayError>;
}

/// Every table the application uses.
pub trait DataGateway:
    RecordGateway<Story>
    + RecordGateway<WritingGoal>
    + RecordGateway<Character>
    + RecordGateway<PlotPoint>
    + RecordGateway<WorldElement>
{
}

impl<T> DataGateway for T where
    T: RecordGateway<Story>
        + RecordGateway<WritingGoal>
        + RecordGateway<Character>
        + RecordGateway<PlotPoint>
        + RecordGateway<WorldElement>
{
}

// ============================================================================
// Session
// ============================================================================

pub use shared_types::SessionChange;

#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Register a new account. `None` means the provider wants the address
    /// confirmed before a session is issued.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<AuthUser>, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The user of the persisted session, refreshing an expired token first.
    async fn current_session(&self) -> Result<Option<AuthUser>, AuthError>;

    /// Be told about every later session change until the returned handle is
    /// dropped or unsubscribed.
    fn subscribe(&self, listener: SessionListener) -> Subscription;
}

pub type SessionListener = Box<dyn Fn(&SessionChange) + Send + Sync>;

type Listeners = Mutex<BTreeMap<u64, Arc<dyn Fn(&SessionChange) + Send + Sync>>>;

/// Fan-out point for session changes. Gateways own one and call
/// [`SessionHub::notify`] after each transition.
#[derive(Clone, Default)]
pub struct SessionHub {
    inner: Arc<HubInner>,
}

#[derive(Default)]
struct HubInner {
    listeners: Listeners,
    next_id: Mutex<u64>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        let id = {
            let mut next = lock(&self.inner.next_id);
            *next += 1;
            *next
        };
        lock(&self.inner.listeners).insert(id, Arc::from(listener));
        Subscription {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn notify(&self, change: &SessionChange) {
        // Snapshot so a listener may subscribe or unsubscribe re-entrantly.
        let listeners: Vec<_> = lock(&self.inner.listeners).values().cloned().collect();
        for listener in listeners {
            listener(change);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }
}

/// Handle for one session listener. Dropping it detaches the listener.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    hub: Weak<HubInner>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            lock(&hub.listeners).remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
