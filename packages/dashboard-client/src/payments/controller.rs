//! Drives the payments list: turns user interaction into queries, fetches
//! through the gateway, and gates row actions by role.
//!
//! Every control change issues exactly one request for the full query at
//! send time. Requests are stamped with a generation number and a response
//! is applied only if no newer request has been issued since, so a slow
//! response can never overwrite the result of a later interaction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::query::{page_count, PaymentQuery, SortColumn, DEFAULT_PAGE_SIZE};
use crate::error::ClientError;
use crate::gateway::{AuthGateway, Outcome};
use crate::notify::{Notification, Notifier};
use crate::types::{Payment, PaymentList, ReviewDecision};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_REVIEW_ROLE: &str = "operation";

/// Tunables for the list controller.
#[derive(Debug, Clone)]
pub struct ControllerPolicy {
    pub debounce: Duration,
    pub page_size: u32,
    /// Roles allowed to see and use the review action.
    pub review_roles: Vec<String>,
    /// Refetch the current page after a successful review.
    pub refetch_after_review: bool,
}

impl Default for ControllerPolicy {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_SEARCH_DEBOUNCE,
            page_size: DEFAULT_PAGE_SIZE,
            review_roles: vec![DEFAULT_REVIEW_ROLE.to_string()],
            refetch_after_review: false,
        }
    }
}

/// What the list currently shows. Exactly one state at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Failed(ClientError),
    Empty(PaymentList),
    Populated(PaymentList),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Loading,
    Error,
    Empty,
    Populated,
}

impl ListView {
    fn from_list(list: PaymentList) -> Self {
        if list.payments.is_empty() {
            ListView::Empty(list)
        } else {
            ListView::Populated(list)
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            ListView::Loading => Presentation::Loading,
            ListView::Failed(_) => Presentation::Error,
            ListView::Empty(_) => Presentation::Empty,
            ListView::Populated(_) => Presentation::Populated,
        }
    }

    pub fn list(&self) -> Option<&PaymentList> {
        match self {
            ListView::Empty(list) | ListView::Populated(list) => Some(list),
            ListView::Loading | ListView::Failed(_) => None,
        }
    }
}

/// A rendered row and whether its review action is shown.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRow {
    pub payment: Payment,
    pub can_review: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// Server accepted the review; carries its message.
    Reviewed(String),
    Failed(ClientError),
    /// Current role may not review; nothing was sent.
    NotPermitted,
    Evicted,
}

struct ControllerState {
    query: PaymentQuery,
    search_text: String,
    view: ListView,
}

struct PendingSearch {
    seq: u64,
    token: CancellationToken,
}

struct Inner {
    gateway: AuthGateway,
    notifier: Arc<dyn Notifier>,
    policy: ControllerPolicy,
    state: Mutex<ControllerState>,
    generation: AtomicU64,
    search_seq: AtomicU64,
    pending_search: Mutex<Option<PendingSearch>>,
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PaymentListController {
    inner: Arc<Inner>,
}

impl PaymentListController {
    pub fn new(gateway: AuthGateway, notifier: Arc<dyn Notifier>, policy: ControllerPolicy) -> Self {
        let query = PaymentQuery::with_page_size(policy.page_size);
        Self {
            inner: Arc::new(Inner {
                gateway,
                notifier,
                policy,
                state: Mutex::new(ControllerState {
                    query,
                    search_text: String::new(),
                    view: ListView::Loading,
                }),
                generation: AtomicU64::new(0),
                search_seq: AtomicU64::new(0),
                pending_search: Mutex::new(None),
            }),
        }
    }

    pub fn policy(&self) -> &ControllerPolicy {
        &self.inner.policy
    }

    pub fn query(&self) -> PaymentQuery {
        self.lock_state().query.clone()
    }

    pub fn view(&self) -> ListView {
        self.lock_state().view.clone()
    }

    pub fn presentation(&self) -> Presentation {
        self.lock_state().view.presentation()
    }

    /// Raw search box contents, which may be ahead of the query's `id`.
    pub fn search_text(&self) -> String {
        self.lock_state().search_text.clone()
    }

    /// Number of fetches issued so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------------
    // Interactions
    // ------------------------------------------------------------------------

    /// Fetch the current query again (initial mount, manual refresh).
    pub async fn refresh(&self) {
        self.update_and_fetch(|q| q.clone()).await;
    }

    /// Replace the whole query and fetch it once. For deep links, where
    /// several controls are set before the first request.
    pub async fn open(&self, query: PaymentQuery) {
        self.update_and_fetch(|_| query).await;
    }

    pub async fn select_status(&self, status: Option<String>) {
        self.update_and_fetch(|q| q.filtered_by_status(status)).await;
    }

    pub async fn toggle_sort(&self, column: SortColumn) {
        self.update_and_fetch(|q| q.toggled_sort(column)).await;
    }

    /// Zero-based page; filters are kept.
    pub async fn go_to_page(&self, page_index: u32) {
        self.update_and_fetch(|q| q.at_page(page_index)).await;
    }

    /// Record a keystroke in the search box.
    ///
    /// The fetch happens once input has been quiet for the debounce
    /// interval; any earlier pending search is cancelled. Must be called
    /// from within a tokio runtime.
    pub fn search_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.lock_state().search_text = text.clone();

        let seq = self.inner.search_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let previous = self.lock_pending().replace(PendingSearch {
            seq,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            previous.token.cancel();
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let delay = self.inner.policy.debounce;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(seq, "Search superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    if token.is_cancelled() {
                        debug!(seq, "Search superseded");
                        return;
                    }
                    let Some(inner) = weak.upgrade() else { return };
                    let controller = PaymentListController { inner };
                    controller.finish_pending(seq);
                    controller.update_and_fetch(|q| q.searching(&text)).await;
                }
            }
        });
    }

    /// Cancel a pending debounced search. Returns whether one was pending.
    pub fn cancel_pending_search(&self) -> bool {
        match self.lock_pending().take() {
            Some(pending) => {
                pending.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn has_pending_search(&self) -> bool {
        self.lock_pending().is_some()
    }

    // ------------------------------------------------------------------------
    // Rendering helpers
    // ------------------------------------------------------------------------

    /// Whether the signed-in role may review. Absent session means no.
    pub fn can_review(&self) -> bool {
        self.inner
            .gateway
            .store()
            .get()
            .map(|session| self.inner.policy.review_roles.contains(&session.role))
            .unwrap_or(false)
    }

    pub fn rows(&self) -> Vec<PaymentRow> {
        let can_review = self.can_review();
        self.lock_state()
            .view
            .list()
            .map(|list| {
                list.payments
                    .iter()
                    .map(|payment| PaymentRow {
                        payment: payment.clone(),
                        can_review,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pages available for the current filters, from the last result.
    pub fn page_count(&self) -> u32 {
        let state = self.lock_state();
        state
            .view
            .list()
            .map(|list| page_count(list.meta.total, state.query.limit))
            .unwrap_or(0)
    }

    /// One-based page the current query points at.
    pub fn current_page(&self) -> u32 {
        self.lock_state().query.page_index() + 1
    }

    // ------------------------------------------------------------------------
    // Row actions
    // ------------------------------------------------------------------------

    pub async fn review(&self, payment_id: &str) -> ReviewOutcome {
        self.review_with(payment_id, ReviewDecision::Approve).await
    }

    pub async fn review_with(&self, payment_id: &str, decision: ReviewDecision) -> ReviewOutcome {
        if !self.can_review() {
            warn!(payment_id, "Review attempted without a permitted role");
            return ReviewOutcome::NotPermitted;
        }

        match self
            .inner
            .gateway
            .review_payment(payment_id, decision)
            .await
        {
            Ok(Outcome::Completed(response)) => {
                debug!(payment_id, ?decision, "Payment reviewed");
                self.inner.notifier.notify(
                    Notification::success("success").with_description(response.message.clone()),
                );
                if self.inner.policy.refetch_after_review {
                    self.refresh().await;
                }
                ReviewOutcome::Reviewed(response.message)
            }
            Ok(Outcome::Evicted) => ReviewOutcome::Evicted,
            Err(err) => {
                warn!(payment_id, error = %err, "Review failed");
                self.inner
                    .notifier
                    .notify(Notification::error(err.title(), err.description()));
                ReviewOutcome::Failed(err)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Supersede the query, then fetch it. The new query, its generation and
    /// the loading state are committed together.
    async fn update_and_fetch(&self, update: impl FnOnce(&PaymentQuery) -> PaymentQuery) {
        let (query, generation) = {
            let mut state = self.lock_state();
            state.query = update(&state.query);
            state.view = ListView::Loading;
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (state.query.clone(), generation)
        };
        debug!(generation, ?query, "Fetching payments");

        let view = match self.inner.gateway.list_payments(&query).await {
            Ok(Outcome::Completed(list)) => ListView::from_list(list),
            Ok(Outcome::Evicted) => {
                debug!(generation, "Fetch ended by eviction");
                return;
            }
            Err(err) => {
                warn!(generation, error = %err, "Fetching payments failed");
                ListView::Failed(err)
            }
        };

        let mut state = self.lock_state();
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding stale response");
            return;
        }
        state.view = view;
    }

    fn finish_pending(&self, seq: u64) {
        let mut pending = self.lock_pending();
        if pending.as_ref().is_some_and(|p| p.seq == seq) {
            pending.take();
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingSearch>> {
        self.inner
            .pending_search
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
