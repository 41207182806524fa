use shared_types::forms::auth_error_message;
use shared_types::{AuthErrorKind, FormErrors};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set; the backend cannot be reached without it")]
    Missing(&'static str),
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure reported by the auth provider, already classified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    /// Raw provider text.
    pub message: String,
    /// The provider was never reached; nothing was decided about the session.
    pub transport: bool,
}

impl AuthError {
    pub fn from_provider(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::provider(AuthErrorKind::classify(&message), message)
    }

    pub fn provider(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            transport: false,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: AuthErrorKind::Unknown,
            message: message.into(),
            transport: true,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.transport
    }

    /// Wording shown under the auth form.
    pub fn user_message(&self) -> String {
        auth_error_message(self.kind, &self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("no row in {table} with id {id}")]
    NotFound { table: &'static str, id: uuid::Uuid },
    #[error("backend returned no rows for {0}")]
    EmptyResponse(&'static str),
    #[error("not signed in")]
    NotAuthenticated,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl GatewayError {
    /// Text to surface to the writer.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Auth(err) => err.user_message(),
            GatewayError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("form has {} error(s)", .0.len())]
    InvalidForm(FormErrors),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl StoreError {
    /// Field errors for the auth form, with provider failures under `submit`.
    pub fn form_errors(&self) -> FormErrors {
        match self {
            StoreError::InvalidForm(errors) => errors.clone(),
            other => {
                let message = match other {
                    StoreError::Gateway(err) => err.user_message(),
                    _ => other.to_string(),
                };
                FormErrors::from([(shared_types::forms::FIELD_SUBMIT, message)])
            }
        }
    }
}

impl From<AuthError> for StoreError {
    fn from(err: AuthError) -> Self {
        StoreError::Gateway(GatewayError::Auth(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::forms::FIELD_SUBMIT;

    #[test]
    fn test_auth_error_classification() {
        let err = AuthError::from_provider("Email not confirmed");
        assert_eq!(err.kind, AuthErrorKind::UnconfirmedEmail);
        assert!(err.user_message().starts_with("Please check your email"));
    }

    #[test]
    fn test_provider_error_lands_on_submit() {
        let err: StoreError = AuthError::from_provider("Invalid login credentials").into();
        let errors = err.form_errors();
        assert_eq!(
            errors[FIELD_SUBMIT],
            "Invalid email or password. Please check your credentials."
        );
    }
}
