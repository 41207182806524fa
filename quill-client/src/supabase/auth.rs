use async_trait::async_trait;
use chrono::Utc;
use reqwest::Response;
use serde_json::{json, Value};
use shared_types::{AuthErrorKind, AuthUser, Session, TokenGrant};
use tracing::{info, warn};

use super::{describe_error, error_code, SupabaseClient, EXPIRY_MARGIN_SECS};
use crate::error::AuthError;
use crate::gateway::{SessionChange, SessionGateway, SessionListener, Subscription};

impl SupabaseClient {
    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Session, AuthError> {
        let url = self.auth_url(&format!("token?grant_type={grant_type}"));
        let request = self.authorize(self.http().post(url), None).json(&body);
        let response = self.send(request, false).await.map_err(transport)?;
        let value = read_auth_body(response).await?;
        let wire: TokenGrant = serde_json::from_value(value)
            .map_err(|e| AuthError::from_provider(format!("unexpected auth response: {e}")))?;
        Ok(wire.into_session(Utc::now()))
    }

    /// The stored session, refreshed if its token is about to expire. A
    /// rejected refresh signs the writer out.
    pub(crate) async fn fresh_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.session() else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now(), EXPIRY_MARGIN_SECS) {
            return Ok(Some(session));
        }

        match self
            .token_grant(
                "refresh_token",
                json!({ "refresh_token": session.refresh_token }),
            )
            .await
        {
            Ok(refreshed) => {
                let user = refreshed.user.clone();
                self.store_session(Some(refreshed.clone()));
                self.hub().notify(&SessionChange::TokenRefreshed(user));
                Ok(Some(refreshed))
            }
            Err(err) if err.is_transport() => Err(err),
            Err(err) => {
                warn!(error = %err, "session refresh rejected, signing out");
                self.store_session(None);
                self.hub().notify(&SessionChange::SignedOut);
                Ok(None)
            }
        }
    }

    /// Bearer token for table requests: the session's, else the anon key.
    pub(crate) async fn access_token(&self) -> Option<String> {
        match self.fresh_session().await {
            Ok(session) => session.map(|s| s.access_token),
            Err(err) => {
                warn!(error = %err, "could not refresh session, using stored token");
                self.session().map(|s| s.access_token)
            }
        }
    }
}

#[async_trait]
impl SessionGateway for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<AuthUser>, AuthError> {
        let request = self
            .authorize(self.http().post(self.auth_url("signup")), None)
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(request, false).await.map_err(transport)?;
        let value = read_auth_body(response).await?;

        // With email confirmation on, GoTrue returns the bare user.
        if value.get("access_token").is_none() {
            info!(email, "sign-up pending email confirmation");
            return Ok(None);
        }
        let wire: TokenGrant = serde_json::from_value(value)
            .map_err(|e| AuthError::from_provider(format!("unexpected auth response: {e}")))?;
        let session = wire.into_session(Utc::now());
        let user = session.user.clone();
        self.store_session(Some(session));
        self.hub().notify(&SessionChange::SignedIn(user.clone()));
        info!(user_id = %user.id, "signed up");
        Ok(Some(user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let session = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        let user = session.user.clone();
        self.store_session(Some(session));
        self.hub().notify(&SessionChange::SignedIn(user.clone()));
        info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        let request = self.authorize(
            self.http().post(self.auth_url("logout")),
            Some(&session.access_token),
        );
        // The local session is discarded whatever the server says.
        let outcome = match self.send(request, false).await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => read_auth_body(response).await.map(|_| ()),
            Err(err) => Err(transport(err)),
        };
        self.store_session(None);
        self.hub().notify(&SessionChange::SignedOut);
        if let Err(err) = &outcome {
            warn!(error = %err, "server-side sign-out failed");
        }
        outcome
    }

    async fn current_session(&self) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.fresh_session().await?.map(|session| session.user))
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.hub().subscribe(listener)
    }
}

fn transport(err: crate::error::GatewayError) -> AuthError {
    AuthError::transport(format!("network error: {err}"))
}

/// JSON body of a successful auth call, or the classified provider error.
async fn read_auth_body(response: Response) -> Result<Value, AuthError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| transport(e.into()))?;
    if status.is_success() {
        return serde_json::from_str(&body)
            .map_err(|e| AuthError::from_provider(format!("unexpected auth response: {e}")));
    }

    let message = describe_error(status, &body);
    let code = error_code(&body).unwrap_or_default();
    Err(provider_error(&code, message))
}

fn provider_error(code: &str, message: String) -> AuthError {
    let kind = AuthErrorKind::classify_response(code, &message);
    AuthError::provider(kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_uses_code_when_text_is_vague() {
        let err = provider_error("email_address_invalid", "Unable to validate email address".into());
        assert_eq!(err.kind, AuthErrorKind::InvalidEmailFormat);
        let err = provider_error("email_not_confirmed", "Sign-in blocked".into());
        assert_eq!(err.kind, AuthErrorKind::UnconfirmedEmail);
        let err = provider_error("", "Invalid login credentials".into());
        assert_eq!(err.kind, AuthErrorKind::InvalidCredentials);
        let err = provider_error("over_request_rate_limit", "Too many requests".into());
        assert_eq!(err.kind, AuthErrorKind::Unknown);
        assert_eq!(err.user_message(), "Too many requests");
    }

    #[test]
    fn test_provider_text_never_reads_as_transport() {
        let err = provider_error("", "network error: upstream refused the refresh".into());
        assert!(!err.is_transport());
        let err = transport(crate::error::GatewayError::NotAuthenticated);
        assert!(err.is_transport());
        assert_eq!(err.kind, AuthErrorKind::Unknown);
    }
}
