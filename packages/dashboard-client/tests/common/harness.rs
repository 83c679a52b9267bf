//! Wires a `Dashboard` over the fake backend and a chosen storage.

use std::sync::Arc;

use dashboard_client::{
    ControllerPolicy, Dashboard, NavigationLog, NotificationLog, SessionStorage, SessionStore,
};

use super::FakeBackend;

pub struct TestHarness {
    pub dashboard: Dashboard,
    pub backend: Arc<FakeBackend>,
    pub nav: Arc<NavigationLog>,
    pub notes: Arc<NotificationLog>,
}

impl TestHarness {
    /// A fresh "page load" over `storage`.
    pub fn load(storage: Arc<dyn SessionStorage>, backend: Arc<FakeBackend>) -> Self {
        Self::load_with(storage, backend, ControllerPolicy::default())
    }

    pub fn load_with(
        storage: Arc<dyn SessionStorage>,
        backend: Arc<FakeBackend>,
        policy: ControllerPolicy,
    ) -> Self {
        let nav = Arc::new(NavigationLog::new());
        let notes = Arc::new(NotificationLog::new());
        let dashboard = Dashboard::assemble(
            Arc::new(SessionStore::new(storage)),
            backend.clone(),
            nav.clone(),
            notes.clone(),
            policy,
        );
        Self {
            dashboard,
            backend,
            nav,
            notes,
        }
    }
}
