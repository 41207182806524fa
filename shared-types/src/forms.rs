//! Sign-in / sign-up form rules and auth error wording.
//!
//! Validation runs before any request is made; a form that fails here never
//! reaches the auth provider.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }

    pub fn page_title(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::SignUp => "Sign Up",
        }
    }
}

/// Field name → message. `submit` carries the provider error.
pub type FormErrors = BTreeMap<&'static str, String>;

pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_CONFIRM_PASSWORD: &str = "confirmPassword";
pub const FIELD_SUBMIT: &str = "submit";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl AuthForm {
    pub fn validate(&self, mode: AuthMode) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();

        if self.email.is_empty() {
            errors.insert(FIELD_EMAIL, "Email is required".to_string());
        } else if !EMAIL_SHAPE.is_match(&self.email) {
            errors.insert(FIELD_EMAIL, "Email is invalid".to_string());
        }

        if self.password.is_empty() {
            errors.insert(FIELD_PASSWORD, "Password is required".to_string());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                FIELD_PASSWORD,
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }

        if mode == AuthMode::SignUp && self.password != self.confirm_password {
            errors.insert(FIELD_CONFIRM_PASSWORD, "Passwords do not match".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Coarse category of an auth provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    InvalidCredentials,
    UnconfirmedEmail,
    InvalidEmailFormat,
    Unknown,
}

impl AuthErrorKind {
    /// Classify a raw provider message (or error code) by substring.
    pub fn classify(raw: &str) -> Self {
        if raw.contains("Email not confirmed") {
            AuthErrorKind::UnconfirmedEmail
        } else if raw.contains("Invalid login credentials") {
            AuthErrorKind::InvalidCredentials
        } else if raw.contains("email_address_invalid") {
            AuthErrorKind::InvalidEmailFormat
        } else {
            AuthErrorKind::Unknown
        }
    }

    /// Classify on the error code and the text together; the provider
    /// reports some failures only through its `error_code`.
    pub fn classify_response(code: &str, message: &str) -> Self {
        match Self::classify(message) {
            AuthErrorKind::Unknown => Self::classify(match code {
                "email_not_confirmed" => "Email not confirmed",
                "invalid_credentials" => "Invalid login credentials",
                other => other,
            }),
            kind => kind,
        }
    }
}

/// Text shown under the auth form. Unclassified errors pass through as-is.
pub fn auth_error_message(kind: AuthErrorKind, raw: &str) -> String {
    match kind {
        AuthErrorKind::UnconfirmedEmail => {
            "Please check your email and click the confirmation link before signing in.".to_string()
        }
        AuthErrorKind::InvalidCredentials => {
            "Invalid email or password. Please check your credentials.".to_string()
        }
        AuthErrorKind::InvalidEmailFormat => "Please enter a valid email address.".to_string(),
        AuthErrorKind::Unknown => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str) -> AuthForm {
        AuthForm {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_short_password_rejected_on_sign_up() {
        let errors = form("a@b.com", "short", "short")
            .validate(AuthMode::SignUp)
            .unwrap_err();
        assert_eq!(
            errors.get(FIELD_PASSWORD).map(String::as_str),
            Some("Password must be at least 6 characters")
        );
        assert!(!errors.contains_key(FIELD_EMAIL));
    }

    #[test]
    fn test_required_and_shape_errors() {
        let errors = form("", "", "").validate(AuthMode::SignIn).unwrap_err();
        assert_eq!(errors[FIELD_EMAIL], "Email is required");
        assert_eq!(errors[FIELD_PASSWORD], "Password is required");

        let errors = form("scribe@realm", "longenough", "")
            .validate(AuthMode::SignIn)
            .unwrap_err();
        assert_eq!(errors[FIELD_EMAIL], "Email is invalid");
    }

    #[test]
    fn test_confirmation_only_checked_on_sign_up() {
        let f = form("scribe@realm.io", "longenough", "different");
        assert!(f.validate(AuthMode::SignIn).is_ok());
        let errors = f.validate(AuthMode::SignUp).unwrap_err();
        assert_eq!(errors[FIELD_CONFIRM_PASSWORD], "Passwords do not match");
    }

    #[test]
    fn test_classify_provider_messages() {
        assert_eq!(
            AuthErrorKind::classify("Email not confirmed"),
            AuthErrorKind::UnconfirmedEmail
        );
        assert_eq!(
            AuthErrorKind::classify("Invalid login credentials"),
            AuthErrorKind::InvalidCredentials
        );
        assert_eq!(
            AuthErrorKind::classify("email_address_invalid: bad"),
            AuthErrorKind::InvalidEmailFormat
        );
        assert_eq!(AuthErrorKind::classify("rate limited"), AuthErrorKind::Unknown);
    }

    #[test]
    fn test_unknown_message_passes_through() {
        assert_eq!(
            auth_error_message(AuthErrorKind::Unknown, "rate limited"),
            "rate limited"
        );
        assert_eq!(
            auth_error_message(AuthErrorKind::InvalidEmailFormat, "ignored"),
            "Please enter a valid email address."
        );
    }
}
