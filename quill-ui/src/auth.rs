//! Sign-in / sign-up page.
//!
//! Fields are validated locally before any request. Provider failures land
//! under the form as a single message.

use dioxus::prelude::*;
use dioxus_logger::tracing::info;
use shared_types::forms::{FIELD_CONFIRM_PASSWORD, FIELD_EMAIL, FIELD_PASSWORD, FIELD_SUBMIT};
use shared_types::{AuthForm, AuthMode, FormErrors, APP_NAME};

use crate::api;
use crate::state::{set_auth, AppState, AuthState};

const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

fn headings(mode: AuthMode) -> (&'static str, &'static str) {
    match mode {
        AuthMode::SignIn => ("Sign in to your account", "Welcome back, writer"),
        AuthMode::SignUp => ("Create your account", "Start your writing journey"),
    }
}

fn toggle_label(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::SignIn => "Don't have an account? Sign up",
        AuthMode::SignUp => "Already have an account? Sign in",
    }
}

#[component]
pub fn AuthPage() -> Element {
    let app = use_context::<AppState>();
    let mut mode = app.auth_mode;

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut show_password = use_signal(|| false);
    let mut errors = use_signal(FormErrors::new);
    let mut notice = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let mut clear_error = move |field: &'static str| {
        if errors.peek().contains_key(field) {
            errors.write().remove(field);
        }
    };

    let handle_submit = use_callback(move |_| {
        if busy() {
            return;
        }
        let current_mode = mode();
        let form = AuthForm {
            email: email(),
            password: password(),
            confirm_password: confirm_password(),
        };
        if let Err(field_errors) = form.validate(current_mode) {
            errors.set(field_errors);
            return;
        }
        errors.set(FormErrors::new());
        notice.set(None);
        busy.set(true);

        let auth = app.auth;
        spawn(async move {
            let outcome = match current_mode {
                AuthMode::SignIn => api::sign_in(&form.email, &form.password).await.map(Some),
                AuthMode::SignUp => api::sign_up(&form.email, &form.password).await,
            };
            match outcome {
                Ok(Some(user)) => {
                    info!("Auth successful for {}", user.email);
                    set_auth(auth, AuthState::Authenticated(user));
                }
                Ok(None) => {
                    notice.set(Some(
                        "Check your email for a confirmation link, then sign in.".to_string(),
                    ));
                    mode.set(AuthMode::SignIn);
                }
                Err(message) => {
                    let message = if message.trim().is_empty() {
                        UNEXPECTED_ERROR.to_string()
                    } else {
                        message
                    };
                    errors.write().insert(FIELD_SUBMIT, message);
                }
            }
            busy.set(false);
        });
    });

    let current_mode = mode();
    let (heading, subtitle) = headings(current_mode);
    let field_error = move |field: &'static str| errors.read().get(field).cloned();
    let password_type = if show_password() { "text" } else { "password" };
    let password_autocomplete = match current_mode {
        AuthMode::SignIn => "current-password",
        AuthMode::SignUp => "new-password",
    };
    let submit_label = match (busy(), current_mode) {
        (true, _) => "Summoning...",
        (false, AuthMode::SignIn) => "Sign in",
        (false, AuthMode::SignUp) => "Create account",
    };

    rsx! {
        div { class: "auth-page",
            form {
                class: "auth-card",
                onsubmit: move |e: FormEvent| {
                    e.prevent_default();
                    handle_submit.call(());
                },

                div { class: "auth-brand", "{APP_NAME}" }
                h2 { class: "auth-heading", "{heading}" }
                p { class: "auth-subtitle", "{subtitle}" }

                label { r#for: "email", "Email address" }
                input {
                    id: "email",
                    r#type: "email",
                    autocomplete: "email",
                    placeholder: "Enter your email",
                    value: "{email}",
                    oninput: move |e: FormEvent| {
                        email.set(e.value());
                        clear_error(FIELD_EMAIL);
                    },
                }
                if let Some(message) = field_error(FIELD_EMAIL) {
                    p { class: "field-error", "{message}" }
                }

                label { r#for: "password", "Password" }
                div { class: "password-row",
                    input {
                        id: "password",
                        r#type: "{password_type}",
                        autocomplete: "{password_autocomplete}",
                        placeholder: "Enter your password",
                        value: "{password}",
                        oninput: move |e: FormEvent| {
                            password.set(e.value());
                            clear_error(FIELD_PASSWORD);
                        },
                    }
                    button {
                        r#type: "button",
                        class: "ghost-button",
                        onclick: move |_| show_password.toggle(),
                        if show_password() { "Hide" } else { "Show" }
                    }
                }
                if let Some(message) = field_error(FIELD_PASSWORD) {
                    p { class: "field-error", "{message}" }
                }

                if current_mode == AuthMode::SignUp {
                    label { r#for: "confirmPassword", "Confirm Password" }
                    input {
                        id: "confirmPassword",
                        r#type: "password",
                        autocomplete: "new-password",
                        placeholder: "Confirm your password",
                        value: "{confirm_password}",
                        oninput: move |e: FormEvent| {
                            confirm_password.set(e.value());
                            clear_error(FIELD_CONFIRM_PASSWORD);
                        },
                    }
                    if let Some(message) = field_error(FIELD_CONFIRM_PASSWORD) {
                        p { class: "field-error", "{message}" }
                    }
                }

                if let Some(message) = field_error(FIELD_SUBMIT) {
                    div { class: "form-error", "{message}" }
                }
                if let Some(message) = notice() {
                    div { class: "form-notice", "{message}" }
                }

                button {
                    r#type: "submit",
                    class: "primary-button",
                    disabled: busy(),
                    "{submit_label}"
                }

                button {
                    r#type: "button",
                    class: "link-button",
                    onclick: move |_| {
                        mode.set(current_mode.toggled());
                        errors.set(FormErrors::new());
                        email.set(String::new());
                        password.set(String::new());
                        confirm_password.set(String::new());
                    },
                    "{toggle_label(current_mode)}"
                }
            }
        }
    }
}
