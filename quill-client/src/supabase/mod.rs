//! Hosted backend over HTTP: GoTrue for auth, PostgREST for tables.

mod auth;
mod rest;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared_types::Session;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GatewayError;
use crate::gateway::SessionHub;

/// Refresh the access token this long before it actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Client for one backend project. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    retries: u32,
    session: RwLock<Option<Session>>,
    hub: SessionHub,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.supabase_url.trim_end_matches('/').to_string(),
                anon_key: config.supabase_anon_key.clone(),
                retries: config.http_retries,
                session: RwLock::new(None),
                hub: SessionHub::new(),
            }),
        })
    }

    /// Snapshot of the stored session, if any.
    pub fn session(&self) -> Option<Session> {
        self.inner
            .session
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Adopt a session persisted by an earlier run. Listeners are not told;
    /// [`crate::gateway::SessionGateway::current_session`] reports it.
    pub fn restore_session(&self, session: Session) {
        self.store_session(Some(session));
    }

    pub(crate) fn store_session(&self, session: Option<Session>) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(|p| p.into_inner()) = session;
    }

    pub(crate) fn hub(&self) -> &SessionHub {
        &self.inner.hub
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.inner.base_url, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.inner.base_url, path)
    }

    /// Attach the project key and a bearer token. Without a session the anon
    /// key doubles as the bearer.
    pub(crate) fn authorize(&self, builder: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        builder
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.inner.anon_key))
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Send, retrying transport failures of idempotent requests up to the
    /// configured count. Error statuses are returned as responses.
    pub(crate) async fn send(
        &self,
        builder: RequestBuilder,
        idempotent: bool,
    ) -> Result<Response, GatewayError> {
        let retries = if idempotent { self.inner.retries } else { 0 };
        let mut attempt = 0;
        let mut pending = builder;
        loop {
            let spare = if attempt < retries {
                pending.try_clone()
            } else {
                None
            };
            match pending.send().await {
                Ok(response) => return Ok(response),
                Err(err) if is_transient(&err) => match spare {
                    Some(next) => {
                        attempt += 1;
                        warn!(attempt, error = %err, "backend request failed, retrying");
                        tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                        pending = next;
                    }
                    None => return Err(err.into()),
                },
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url)
            .field("signed_in", &self.session().is_some())
            .finish()
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Decode a successful body, or turn an error status into `Api`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(api_error(status, &body));
    }
    debug!(status = status.as_u16(), bytes = body.len(), "backend response");
    Ok(serde_json::from_str(&body)?)
}

/// Like [`read_json`] for endpoints whose body is irrelevant.
pub(crate) async fn expect_success(response: Response) -> Result<(), GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

pub(crate) fn api_error(status: StatusCode, body: &str) -> GatewayError {
    GatewayError::Api {
        status: status.as_u16(),
        message: describe_error(status, body),
    }
}

/// Human-readable message from a GoTrue or PostgREST error body.
pub(crate) fn describe_error(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

/// Machine-readable code from a GoTrue error body (`error_code`, or the
/// OAuth-style `error`).
pub(crate) fn error_code(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    ["error_code", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_error_prefers_msg_fields() {
        let body = r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#;
        assert_eq!(
            describe_error(StatusCode::BAD_REQUEST, body),
            "Invalid login credentials"
        );
        assert_eq!(error_code(body).as_deref(), Some("invalid_credentials"));

        let body = r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#;
        assert!(describe_error(StatusCode::NOT_ACCEPTABLE, body).starts_with("JSON object"));

        let body = r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#;
        assert_eq!(describe_error(StatusCode::BAD_REQUEST, body), "Email not confirmed");
    }

    #[test]
    fn test_describe_error_falls_back_to_status() {
        assert_eq!(
            describe_error(StatusCode::BAD_GATEWAY, ""),
            "HTTP 502 Bad Gateway"
        );
        assert_eq!(describe_error(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
    }
}
