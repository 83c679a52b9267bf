//! Login and logout.

use std::sync::Arc;

use tracing::{info, warn};

use super::SessionStore;
use crate::error::ClientError;
use crate::gateway::{AuthGateway, Outcome};
use crate::notify::{Notification, Notifier};
use crate::routing::{Navigator, Route};
use crate::types::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    SignedIn(Session),
    Failed(ClientError),
    Evicted,
}

/// Establishes and ends sessions.
#[derive(Clone)]
pub struct LoginFlow {
    gateway: AuthGateway,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl LoginFlow {
    pub fn new(
        gateway: AuthGateway,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = gateway.store().clone();
        Self {
            gateway,
            store,
            navigator,
            notifier,
        }
    }

    /// Sign in. On success the session replaces any previous one and the
    /// user is sent to the dashboard; on failure the session is untouched.
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        match self.gateway.login(email, password).await {
            Ok(Outcome::Completed(session)) if session.is_complete() => {
                info!(email = %session.email, "Signed in");
                self.store.set(Some(session.clone()));
                self.notifier.notify(Notification::success("success login"));
                self.navigator.redirect(Route::Dashboard);
                LoginOutcome::SignedIn(session)
            }
            Ok(Outcome::Completed(_)) => {
                let err = ClientError::Parse("login response is missing fields".into());
                self.report(&err);
                LoginOutcome::Failed(err)
            }
            Ok(Outcome::Evicted) => LoginOutcome::Evicted,
            Err(err) => {
                self.report(&err);
                LoginOutcome::Failed(err)
            }
        }
    }

    /// Drop the session and return to the login page.
    pub fn logout(&self) {
        self.store.clear();
        self.navigator.redirect(Route::Login);
    }

    fn report(&self, err: &ClientError) {
        warn!(error = %err, "Login failed");
        self.notifier
            .notify(Notification::error(err.title(), err.description()));
    }
}
