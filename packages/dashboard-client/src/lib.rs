//! Session-aware data access for the payments dashboard.
//!
//! Three pieces, leaf first:
//!
//! - [`SessionStore`]: the one owner of the signed-in identity, persisted
//!   under a single storage key and hydrated lazily after a reload.
//! - [`AuthGateway`]: every backend call goes through it. It attaches the
//!   bearer credential and turns an authorization failure into a cleared
//!   session plus a redirect to login.
//! - [`PaymentListController`]: debounced search, status filter, sort
//!   toggle and pagination folded into one [`PaymentQuery`], with stale
//!   responses discarded and the review action gated by role.
//!
//! [`RouteGuard`] and [`LoginFlow`] sit alongside, reading the same store.
//!
//! # Example
//!
//! ```rust,ignore
//! use dashboard_client::{ClientConfig, Dashboard, NavigationLog, TracingNotifier};
//! use std::sync::Arc;
//!
//! let config = ClientConfig::from_env()?;
//! let dashboard = Dashboard::from_config(
//!     &config,
//!     Arc::new(NavigationLog::new()),
//!     Arc::new(TracingNotifier),
//! )?;
//!
//! dashboard.login.login("operation@test.com", "password").await;
//! dashboard.payments.refresh().await;
//! for row in dashboard.payments.rows() {
//!     println!("{} {}", row.payment.id, row.payment.status);
//! }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod payments;
pub mod routing;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use error::{ApiError, ClientError, Result, StorageError};
pub use gateway::{is_authorization_failure, AuthGateway, Outcome, UNAUTHORIZED_MESSAGE};
pub use notify::{Notification, NotificationLog, Notifier, Severity, TracingNotifier};
pub use payments::{
    ControllerPolicy, ListView, PaymentListController, PaymentQuery, PaymentRow, Presentation,
    ReviewOutcome, SortColumn,
};
pub use routing::{GuardDecision, NavigationLog, Navigator, Route, RouteGuard};
pub use session::{
    ExecutionContext, FileStorage, LoginFlow, LoginOutcome, MemoryStorage, SessionStorage,
    SessionStore,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use types::*;

use std::sync::Arc;

/// Everything a front end needs, wired over one session store.
#[derive(Clone)]
pub struct Dashboard {
    pub store: Arc<SessionStore>,
    pub gateway: AuthGateway,
    pub guard: RouteGuard,
    pub login: LoginFlow,
    pub payments: PaymentListController,
}

impl Dashboard {
    /// Wire the components over file storage and an HTTP transport.
    pub fn from_config(
        config: &ClientConfig,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(&config.storage_dir));
        let transport = Arc::new(HttpTransport::with_timeout(
            &config.api_base,
            config.request_timeout,
        )?);
        let store =
            Arc::new(SessionStore::new(storage).with_key(config.session_key.clone()));
        Ok(Self::assemble(
            store,
            transport,
            navigator,
            notifier,
            config.controller_policy(),
        ))
    }

    /// Wire the components over caller-supplied pieces.
    pub fn assemble(
        store: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        policy: ControllerPolicy,
    ) -> Self {
        let gateway = AuthGateway::new(transport, store.clone(), navigator.clone());
        Self {
            guard: RouteGuard::new(store.clone()),
            login: LoginFlow::new(gateway.clone(), navigator, notifier.clone()),
            payments: PaymentListController::new(gateway.clone(), notifier, policy),
            gateway,
            store,
        }
    }
}
