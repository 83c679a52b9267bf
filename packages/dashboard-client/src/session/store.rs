//! Single owner of the signed-in session.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::storage::SessionStorage;
use crate::types::Session;

/// Default storage key for the persisted session.
pub const SESSION_KEY: &str = "auth.user";

/// Where the store is running.
///
/// Durable client storage only exists on the client. On the server every
/// operation is a no-op and the session is always absent, so one user's
/// session can never leak into output shared across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionContext {
    #[default]
    Client,
    Server,
}

#[derive(Debug, Default)]
struct StoreState {
    session: Option<Session>,
    hydrated: bool,
    version: u64,
}

/// Holds the current session, persists it, and hydrates it lazily after
/// a reload.
///
/// All readers go through [`SessionStore::get`]; only [`SessionStore::set`]
/// and [`SessionStore::clear`] write to storage under the session key.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    context: ExecutionContext,
    key: String,
    state: Mutex<StoreState>,
    updates: watch::Sender<Option<Session>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_context(storage, ExecutionContext::Client)
    }

    pub fn with_context(storage: Arc<dyn SessionStorage>, context: ExecutionContext) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            storage,
            context,
            key: SESSION_KEY.to_string(),
            state: Mutex::new(StoreState::default()),
            updates,
        }
    }

    /// Use a different storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current session, hydrating from storage on first access.
    pub fn get(&self) -> Option<Session> {
        if self.context == ExecutionContext::Server {
            return None;
        }

        let mut state = self.lock_state();
        if !state.hydrated {
            state.session = self.read_storage();
            state.hydrated = true;
            self.updates.send_replace(state.session.clone());
        }
        state.session.clone()
    }

    /// Replace the session wholesale and persist it.
    ///
    /// Persistence failures are logged; the in-memory value stays
    /// authoritative either way.
    pub fn set(&self, session: Option<Session>) {
        if self.context == ExecutionContext::Server {
            return;
        }

        // Partial sessions would not survive a reload; store them as absent
        let session = session.filter(|s| {
            let complete = s.is_complete();
            if !complete {
                warn!(key = %self.key, "auth: refusing incomplete session, clearing instead");
            }
            complete
        });

        {
            let mut state = self.lock_state();
            state.session = session.clone();
            state.hydrated = true;
            state.version += 1;
            self.write_storage(session.as_ref());
        }

        match &session {
            Some(s) => info!(email = %s.email, role = %s.role, "Session established"),
            None => info!("Session cleared"),
        }
        self.updates.send_replace(session);
    }

    pub fn clear(&self) {
        self.set(None);
    }

    /// Re-read the session from storage, discarding the in-memory value.
    pub fn load_from_storage(&self) {
        if self.context == ExecutionContext::Server {
            return;
        }

        let session = {
            let mut state = self.lock_state();
            state.session = self.read_storage();
            state.hydrated = true;
            state.session.clone()
        };
        self.updates.send_replace(session);
    }

    /// Number of writes through `set`/`clear` since construction.
    pub fn version(&self) -> u64 {
        self.lock_state().version
    }

    /// Watch session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.updates.subscribe()
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        // State is replaced wholesale, so a panic elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_storage(&self) -> Option<Session> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "auth: loading session failed");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if session.is_complete() => {
                debug!(key = %self.key, "Hydrated session from storage");
                Some(session)
            }
            Ok(_) => {
                warn!(key = %self.key, "auth: stored session is incomplete, ignoring");
                None
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "auth: stored session is corrupt, ignoring");
                None
            }
        }
    }

    fn write_storage(&self, session: Option<&Session>) {
        let result = match session {
            Some(session) => serde_json::to_string(session)
                .map_err(Into::into)
                .and_then(|raw| self.storage.set_item(&self.key, &raw)),
            None => self.storage.remove_item(&self.key),
        };

        if let Err(e) = result {
            warn!(key = %self.key, error = %e, "auth: saving session failed");
        }
    }
}
