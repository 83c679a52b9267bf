//! Routes, navigation, and the session-aware route guard.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::session::{ExecutionContext, SessionStore};

/// The two logical routes the core knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            _ => None,
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

/// Performs full, non-cancelable redirects.
pub trait Navigator: Send + Sync {
    fn redirect(&self, to: Route);
}

/// Navigator that records every redirect instead of performing one.
///
/// Front ends poll it after an operation to decide where to go next.
#[derive(Debug, Default)]
pub struct NavigationLog {
    redirects: Mutex<Vec<Route>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<Route> {
        self.redirects
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Route> {
        self.redirects.lock().ok().and_then(|r| r.last().copied())
    }

    /// Take and forget the most recent redirect. Earlier ones are kept.
    pub fn take_last(&self) -> Option<Route> {
        self.redirects.lock().ok()?.pop()
    }
}

impl Navigator for NavigationLog {
    fn redirect(&self, to: Route) {
        debug!(path = to.path(), "Redirect requested");
        if let Ok(mut redirects) = self.redirects.lock() {
            redirects.push(to);
        }
    }
}

/// Result of checking a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Keeps signed-out users off protected routes and signed-in users off
/// the login route.
///
/// The session is read fresh on every check.
#[derive(Clone)]
pub struct RouteGuard {
    store: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Decide what should happen when navigating to `path`.
    pub fn check(&self, path: &str) -> GuardDecision {
        // Server-side navigation is not guarded; the first client check corrects it.
        if self.store.context() == ExecutionContext::Server {
            return GuardDecision::Allow;
        }

        let Some(destination) = Route::from_path(path) else {
            return GuardDecision::Allow;
        };
        let has_session = self.store.get().is_some();

        match (has_session, destination) {
            (false, route) if route.is_protected() => GuardDecision::Redirect(Route::Login),
            (true, Route::Login) => GuardDecision::Redirect(Route::Dashboard),
            _ => GuardDecision::Allow,
        }
    }

    /// Check `path` and perform the redirect, if any, through `navigator`.
    pub fn enforce(&self, path: &str, navigator: &dyn Navigator) -> GuardDecision {
        let decision = self.check(path);
        if let GuardDecision::Redirect(to) = decision {
            debug!(from = path, to = to.path(), "Route guard redirect");
            navigator.redirect(to);
        }
        decision
    }
}
