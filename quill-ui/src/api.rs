//! Supabase calls from the browser: GoTrue for the session, PostgREST for rows.
//!
//! The session is kept in `localStorage` so a reload stays signed in. Every
//! row call refreshes an expired access token first.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use chrono::Utc;
use dioxus_logger::tracing::{info, warn};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde_json::{json, Value};
use shared_types::forms::auth_error_message;
use shared_types::{AuthErrorKind, AuthUser, Record, Session, SessionChange, TokenGrant};
use uuid::Uuid;

const SESSION_KEY: &str = "mystical-quill.session";
const EXPIRY_MARGIN_SECS: i64 = 60;

// ============================================================================
// Backend
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub url: String,
    pub anon_key: String,
}

impl Backend {
    fn from_parts(url: Option<&str>, anon_key: Option<&str>) -> Option<Self> {
        let url = url.unwrap_or_default().trim().trim_end_matches('/');
        let anon_key = anon_key.unwrap_or_default().trim();
        if url.is_empty() || anon_key.is_empty() {
            return None;
        }
        Some(Self {
            url: url.to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.url)
    }

    fn authorize(&self, builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let bearer = format!("Bearer {}", token.unwrap_or(&self.anon_key));
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", &bearer)
    }
}

/// Compiled in at build time: `SUPABASE_URL=... SUPABASE_ANON_KEY=... dx build`.
static BACKEND_CACHE: OnceLock<Option<Backend>> = OnceLock::new();

/// `None` when either key was missing or blank at build time.
pub fn backend() -> Option<&'static Backend> {
    BACKEND_CACHE
        .get_or_init(|| {
            Backend::from_parts(option_env!("SUPABASE_URL"), option_env!("SUPABASE_ANON_KEY"))
        })
        .as_ref()
}

fn require_backend() -> Result<&'static Backend, String> {
    backend().ok_or_else(|| "Backend is not configured".to_string())
}

// ============================================================================
// Errors
// ============================================================================

/// Message from a GoTrue or PostgREST error body.
fn describe_body(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(text) = json.get(key).and_then(Value::as_str) {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
            }
        }
    }
    if body.trim().is_empty() {
        format!("HTTP error: {status}")
    } else {
        body.trim().to_string()
    }
}

fn error_code(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["error_code", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_default()
}

async fn describe_http_error(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    describe_body(status, &body)
}

/// The message shown under the auth form for a rejected auth call.
async fn auth_failure(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = describe_body(status, &body);
    let kind = AuthErrorKind::classify_response(&error_code(&body), &message);
    auth_error_message(kind, &message)
}

// ============================================================================
// Session storage
// ============================================================================

fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

fn load_session() -> Option<Session> {
    let raw = storage()?.get_item(SESSION_KEY).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

/// Persist (or clear) the session and report the transition it makes.
fn store_session(session: Option<&Session>) {
    let Some(storage) = storage() else {
        return;
    };
    let previous = load_session();
    match session.map(serde_json::to_string) {
        Some(Ok(raw)) => {
            let _ = storage.set_item(SESSION_KEY, &raw);
        }
        Some(Err(e)) => {
            warn!("Failed to serialize session: {e}");
            return;
        }
        None => {
            let _ = storage.remove_item(SESSION_KEY);
        }
    }
    if let Some(change) = SessionChange::between(previous.as_ref(), session) {
        notify_session_change(&change);
    }
}

type SessionListener = Rc<dyn Fn(&SessionChange)>;

thread_local! {
    static SESSION_LISTENER: RefCell<Option<SessionListener>> = const { RefCell::new(None) };
}

/// Be told about every later session change: sign-in, sign-out, a refreshed
/// token, or a refresh the provider rejected. Replaces any earlier listener.
pub fn on_session_change(listener: impl Fn(&SessionChange) + 'static) {
    SESSION_LISTENER.with(|slot| *slot.borrow_mut() = Some(Rc::new(listener)));
}

fn notify_session_change(change: &SessionChange) {
    // Cloned out so the listener may re-register.
    let listener = SESSION_LISTENER.with(|slot| slot.borrow().clone());
    if let Some(listener) = listener {
        listener(change);
    }
}

// ============================================================================
// Auth
// ============================================================================

async fn post_auth(backend: &Backend, path: &str, body: &Value) -> Result<Response, String> {
    backend
        .authorize(Request::post(&backend.auth_url(path)), None)
        .json(body)
        .map_err(|e| format!("Failed to serialize request: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))
}

fn read_grant(value: Value) -> Result<Session, String> {
    let grant: TokenGrant =
        serde_json::from_value(value).map_err(|e| format!("Unexpected auth response: {e}"))?;
    Ok(grant.into_session(Utc::now()))
}

pub async fn sign_in(email: &str, password: &str) -> Result<AuthUser, String> {
    let backend = require_backend()?;
    let response = post_auth(
        backend,
        "token?grant_type=password",
        &json!({ "email": email, "password": password }),
    )
    .await?;
    if !response.ok() {
        return Err(auth_failure(response).await);
    }
    let value: Value = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse JSON: {e}"))?;
    let session = read_grant(value)?;
    store_session(Some(&session));
    info!("Signed in as {}", session.user.id);
    Ok(session.user)
}

/// `Ok(None)` when the provider wants the address confirmed first.
pub async fn sign_up(email: &str, password: &str) -> Result<Option<AuthUser>, String> {
    let backend = require_backend()?;
    let response = post_auth(
        backend,
        "signup",
        &json!({ "email": email, "password": password }),
    )
    .await?;
    if !response.ok() {
        return Err(auth_failure(response).await);
    }
    let value: Value = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse JSON: {e}"))?;
    if value.get("access_token").is_none() {
        info!("Sign-up pending email confirmation");
        return Ok(None);
    }
    let session = read_grant(value)?;
    store_session(Some(&session));
    Ok(Some(session.user))
}

/// The local session is dropped even when the server call fails.
pub async fn sign_out() -> Result<(), String> {
    let token = load_session().map(|session| session.access_token);
    store_session(None);
    let (Some(token), Ok(backend)) = (token, require_backend()) else {
        return Ok(());
    };
    let response = backend
        .authorize(Request::post(&backend.auth_url("logout")), Some(&token))
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    if !response.ok() && response.status() != 401 {
        return Err(describe_http_error(response).await);
    }
    Ok(())
}

/// The persisted session, refreshed when its token is about to expire. A
/// rejected refresh clears it; an unreachable backend is an error.
pub async fn current_session() -> Result<Option<Session>, String> {
    let Some(session) = load_session() else {
        return Ok(None);
    };
    if !session.is_expired(Utc::now(), EXPIRY_MARGIN_SECS) {
        return Ok(Some(session));
    }

    let backend = require_backend()?;
    let response = post_auth(
        backend,
        "token?grant_type=refresh_token",
        &json!({ "refresh_token": session.refresh_token }),
    )
    .await?;
    if !response.ok() {
        let reason = describe_http_error(response).await;
        warn!("Session refresh rejected, signing out: {reason}");
        store_session(None);
        return Ok(None);
    }
    let value: Value = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse JSON: {e}"))?;
    let refreshed = read_grant(value)?;
    store_session(Some(&refreshed));
    Ok(Some(refreshed))
}

async fn access_token() -> Option<String> {
    match current_session().await {
        Ok(session) => session.map(|s| s.access_token),
        Err(e) => {
            warn!("Could not refresh session, using stored token: {e}");
            load_session().map(|s| s.access_token)
        }
    }
}

// ============================================================================
// Rows
// ============================================================================

async fn send_rows<R: Record>(request: Result<Request, gloo_net::Error>) -> Result<Vec<R>, String> {
    let response = request
        .map_err(|e| format!("Failed to serialize request: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    if !response.ok() {
        return Err(describe_http_error(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse JSON: {e}"))
}

/// Rows scoped to an owner or story, in the table's listing order.
pub async fn list<R: Record>(scope_id: Uuid) -> Result<Vec<R>, String> {
    let backend = require_backend()?;
    let url = format!(
        "{}?select=*&{}=eq.{scope_id}&order={}",
        backend.rest_url(R::TABLE),
        R::SCOPE_COLUMN,
        R::order_param()
    );
    let token = access_token().await;
    let request = backend.authorize(Request::get(&url), token.as_deref()).build();
    send_rows(request).await
}

pub async fn create<R: Record>(new: &R::New) -> Result<R, String> {
    let backend = require_backend()?;
    let url = format!("{}?select=*", backend.rest_url(R::TABLE));
    let token = access_token().await;
    let request = backend
        .authorize(Request::post(&url), token.as_deref())
        .header("Prefer", "return=representation")
        .json(&[new]);
    send_rows::<R>(request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| format!("Insert into {} returned no row", R::TABLE))
}

pub async fn update<R: Record>(id: Uuid, patch: &R::Patch) -> Result<R, String> {
    let backend = require_backend()?;
    let url = format!("{}?id=eq.{id}&select=*", backend.rest_url(R::TABLE));
    let token = access_token().await;
    let request = backend
        .authorize(Request::patch(&url), token.as_deref())
        .header("Prefer", "return=representation")
        .json(patch);
    send_rows::<R>(request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| format!("No {} row with id {id}", R::TABLE))
}

pub async fn delete<R: Record>(id: Uuid) -> Result<(), String> {
    let backend = require_backend()?;
    let url = format!("{}?id=eq.{id}", backend.rest_url(R::TABLE));
    let token = access_token().await;
    let response = backend
        .authorize(Request::delete(&url), token.as_deref())
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    if !response.ok() {
        return Err(describe_http_error(response).await);
    }
    Ok(())
}
