use std::sync::{Arc, Mutex, RwLock};

use shared_types::{AuthForm, AuthMode, AuthUser};
use tracing::{info, warn};

use super::{read, write};
use crate::error::StoreError;
use crate::gateway::{SessionChange, SessionGateway, Subscription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    /// True until the persisted session has been checked once.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

pub struct SessionStore {
    auth: Arc<dyn SessionGateway>,
    state: Arc<RwLock<SessionState>>,
    subscription: Mutex<Option<Subscription>>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn SessionGateway>) -> Self {
        Self {
            auth,
            state: Arc::new(RwLock::new(SessionState::default())),
            subscription: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        read(&self.state).clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        read(&self.state).user.clone()
    }

    /// Resolve the persisted session, then follow every later change.
    /// Calling again only re-checks the session.
    pub async fn initialize(&self) {
        match self.auth.current_session().await {
            Ok(user) => {
                let mut state = write(&self.state);
                state.user = user;
                state.loading = false;
            }
            Err(err) => {
                warn!(error = %err, "session check failed");
                write(&self.state).loading = false;
            }
        }

        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if subscription.is_none() {
            let state = Arc::clone(&self.state);
            *subscription = Some(self.auth.subscribe(Box::new(move |change: &SessionChange| {
                let mut guard = write(&state);
                guard.user = change.user().cloned();
                guard.loading = false;
            })));
        }
    }

    /// Validates the form first; an invalid form never reaches the provider.
    pub async fn sign_in(&self, form: &AuthForm) -> Result<AuthUser, StoreError> {
        form.validate(AuthMode::SignIn)
            .map_err(StoreError::InvalidForm)?;
        let user = self.auth.sign_in(&form.email, &form.password).await?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// `Ok(None)` when the account needs email confirmation first.
    pub async fn sign_up(&self, form: &AuthForm) -> Result<Option<AuthUser>, StoreError> {
        form.validate(AuthMode::SignUp)
            .map_err(StoreError::InvalidForm)?;
        let user = self.auth.sign_up(&form.email, &form.password).await?;
        match &user {
            Some(user) => self.set_user(Some(user.clone())),
            None => info!(email = %form.email, "awaiting email confirmation"),
        }
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<(), StoreError> {
        self.auth.sign_out().await?;
        self.set_user(None);
        Ok(())
    }

    fn set_user(&self, user: Option<AuthUser>) {
        let mut state = write(&self.state);
        state.user = user;
        state.loading = false;
    }
}
