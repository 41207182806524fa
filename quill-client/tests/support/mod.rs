//! In-memory gateways shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use quill_client::error::{AuthError, GatewayError};
use quill_client::gateway::{
    Record, RecordGateway, SessionChange, SessionGateway, SessionHub, SessionListener,
    Subscription,
};
use serde_json::{json, Value};
use shared_types::{AuthUser, GoalStatus, Story, StoryStatus, WritingGoal};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub op: Op,
    pub table: &'static str,
    pub id: Option<Uuid>,
    pub body: Option<Value>,
}

/// Rows kept as JSON per table, so one gateway serves every record type.
#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<HashMap<&'static str, Vec<Value>>>,
    calls: Mutex<Vec<Call>>,
    failing_tables: Mutex<HashSet<&'static str>>,
    failing_ids: Mutex<HashSet<Uuid>>,
}

impl MemoryGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed<R: Record>(&self, row: &R) {
        let value = serde_json::to_value(row).expect("row serializes");
        self.tables
            .lock()
            .unwrap()
            .entry(R::TABLE)
            .or_default()
            .push(value);
    }

    pub fn row<R: Record>(&self, id: Uuid) -> Option<R> {
        let tables = self.tables.lock().unwrap();
        tables
            .get(R::TABLE)?
            .iter()
            .find(|row| row["id"] == json!(id))
            .map(|row| serde_json::from_value(row.clone()).expect("row decodes"))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op, table: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.op == op && call.table == table)
            .count()
    }

    /// Every later call against `table` fails with a 500.
    pub fn fail_table(&self, table: &'static str) {
        self.failing_tables.lock().unwrap().insert(table);
    }

    pub fn heal_table(&self, table: &'static str) {
        self.failing_tables.lock().unwrap().remove(table);
    }

    /// Updates of this row fail with a 500.
    pub fn fail_row(&self, id: Uuid) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    fn record(&self, op: Op, table: &'static str, id: Option<Uuid>, body: Option<Value>) {
        self.calls.lock().unwrap().push(Call {
            op,
            table,
            id,
            body,
        });
    }

    fn check(&self, table: &'static str, id: Option<Uuid>) -> Result<(), GatewayError> {
        let table_down = self.failing_tables.lock().unwrap().contains(table);
        let row_down = id.is_some_and(|id| self.failing_ids.lock().unwrap().contains(&id));
        if table_down || row_down {
            return Err(GatewayError::Api {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => {
            let parse = |v: &Value| v.as_str().and_then(|s| s.parse::<DateTime<Utc>>().ok());
            match (parse(a), parse(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.to_string().cmp(&b.to_string()),
            }
        }
    }
}

#[async_trait]
impl<R: Record> RecordGateway<R> for MemoryGateway {
    async fn list(&self, scope_id: Uuid) -> Result<Vec<R>, GatewayError> {
        self.record(Op::List, R::TABLE, None, None);
        self.check(R::TABLE, None)?;
        let (column, ascending) = R::ORDER;
        let mut rows: Vec<Value> = self
            .tables
            .lock()
            .unwrap()
            .get(R::TABLE)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row[R::SCOPE_COLUMN] == json!(scope_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| {
            let ord = compare(&a[column], &b[column]);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        Ok(rows
            .into_iter()
            .map(|row| serde_json::from_value(row).expect("row decodes"))
            .collect())
    }

    async fn create(&self, new: &R::New) -> Result<R, GatewayError> {
        let mut row = serde_json::to_value(new)?;
        self.record(Op::Create, R::TABLE, None, Some(row.clone()));
        self.check(R::TABLE, None)?;
        let now = json!(Utc::now());
        let object = row.as_object_mut().expect("new rows are objects");
        object.insert("id".to_string(), json!(Uuid::new_v4()));
        object.entry("created_at").or_insert(now.clone());
        object.entry("updated_at").or_insert(now);
        let record: R = serde_json::from_value(row.clone())?;
        self.tables
            .lock()
            .unwrap()
            .entry(R::TABLE)
            .or_default()
            .insert(0, row);
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: &R::Patch) -> Result<R, GatewayError> {
        let patch = serde_json::to_value(patch)?;
        self.record(Op::Update, R::TABLE, Some(id), Some(patch.clone()));
        self.check(R::TABLE, Some(id))?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .get_mut(R::TABLE)
            .and_then(|rows| rows.iter_mut().find(|row| row["id"] == json!(id)))
            .ok_or(GatewayError::NotFound { table: R::TABLE, id })?;
        if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(serde_json::from_value(row.clone())?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), GatewayError> {
        self.record(Op::Delete, R::TABLE, Some(id), None);
        self.check(R::TABLE, Some(id))?;
        if let Some(rows) = self.tables.lock().unwrap().get_mut(R::TABLE) {
            rows.retain(|row| row["id"] != json!(id));
        }
        Ok(())
    }
}

// ============================================================================
// Session
// ============================================================================

pub struct FakeSession {
    hub: SessionHub,
    accounts: Mutex<BTreeMap<String, (AuthUser, String)>>,
    current: Mutex<Option<AuthUser>>,
    require_confirmation: Mutex<bool>,
    calls: AtomicUsize,
}

impl FakeSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            hub: SessionHub::new(),
            accounts: Mutex::new(BTreeMap::new()),
            current: Mutex::new(None),
            require_confirmation: Mutex::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn with_account(self: &Arc<Self>, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (user.clone(), password.to_string()));
        user
    }

    /// Pretend a session survived from an earlier run.
    pub fn restore(&self, user: AuthUser) {
        *self.current.lock().unwrap() = Some(user);
    }

    pub fn require_confirmation(&self) {
        *self.require_confirmation.lock().unwrap() = true;
    }

    /// Simulate a change that happened outside the store (another tab, a
    /// token refresh).
    pub fn emit(&self, change: SessionChange) {
        *self.current.lock().unwrap() = change.user().cloned();
        self.hub.notify(&change);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.hub.listener_count()
    }
}

#[async_trait]
impl SessionGateway for FakeSession {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<AuthUser>, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !email.contains('@') {
            return Err(AuthError::from_provider("email_address_invalid"));
        }
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (user.clone(), password.to_string()));
        if *self.require_confirmation.lock().unwrap() {
            return Ok(None);
        }
        self.emit(SessionChange::SignedIn(user.clone()));
        Ok(Some(user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let account = self.accounts.lock().unwrap().get(email).cloned();
        match account {
            Some((user, expected)) if expected == password => {
                self.emit(SessionChange::SignedIn(user.clone()));
                Ok(user)
            }
            _ => Err(AuthError::from_provider("Invalid login credentials")),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.emit(SessionChange::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthUser>, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.current.lock().unwrap().clone())
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.hub.subscribe(listener)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

pub fn story(owner: Uuid, title: &str, words: i64) -> Story {
    Story {
        id: Uuid::new_v4(),
        user_id: owner,
        title: title.to_string(),
        description: String::new(),
        genre: "Dark Fantasy".to_string(),
        status: StoryStatus::InProgress,
        content: String::new(),
        word_count: words,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

/// `age_days` orders goals: listings are newest first.
pub fn goal(owner: Uuid, title: &str, target: i64, current: i64, age_days: i64) -> WritingGoal {
    let created = Utc::now() - Duration::days(age_days);
    WritingGoal {
        id: Uuid::new_v4(),
        user_id: owner,
        title: title.to_string(),
        description: String::new(),
        target_words: target,
        target_days: 60,
        current_words: current,
        status: GoalStatus::Active,
        created_at: created,
        updated_at: created,
        completed_at: None,
    }
}
