//! End-to-end tests: session store, gateway, guard and list controller
//! wired together over a fake backend.
//!
//! Covers:
//! - Login, listing, paging and reviewing as an operation user
//! - Role gating for other roles
//! - Eviction when the backend stops accepting the credential
//! - Session persistence across reloads with file storage

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{payment, sample_payments, FakeBackend, TestHarness, VALID_TOKEN};
use dashboard_client::{
    ClientError, FileStorage, GuardDecision, LoginOutcome, MemoryStorage, Presentation,
    ReviewOutcome, Route, Session, SessionStorage, SessionStore, SortColumn,
};
use tokio_test::{assert_err, assert_ok};

// ============================================================================
// Test Helpers
// ============================================================================

fn row_ids(harness: &TestHarness) -> Vec<String> {
    harness
        .dashboard
        .payments
        .rows()
        .into_iter()
        .map(|row| row.payment.id)
        .collect()
}

async fn signed_in_operator(storage: Arc<dyn SessionStorage>) -> TestHarness {
    let backend = Arc::new(FakeBackend::new(sample_payments()));
    let harness = TestHarness::load(storage, backend);
    let outcome = harness
        .dashboard
        .login
        .login("operation@test.com", "password")
        .await;
    assert!(matches!(outcome, LoginOutcome::SignedIn(_)));
    harness
}

// ============================================================================
// Session persistence
// ============================================================================

#[test]
fn session_survives_reload_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::new("operation@test.com", VALID_TOKEN, "operation");

    SessionStore::new(Arc::new(FileStorage::new(dir.path()))).set(Some(session.clone()));

    let reloaded = SessionStore::new(Arc::new(FileStorage::new(dir.path())));
    assert_eq!(reloaded.get(), Some(session));

    reloaded.clear();
    reloaded.clear();
    assert_eq!(reloaded.get(), None);
    assert_eq!(
        SessionStore::new(Arc::new(FileStorage::new(dir.path()))).get(),
        None
    );
}

#[test]
fn corrupt_file_is_treated_as_signed_out() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("auth.user.json"), "{not json").unwrap();

    let store = SessionStore::new(Arc::new(FileStorage::new(dir.path())));
    assert_eq!(store.get(), None);
}

// ============================================================================
// Operation user
// ============================================================================

#[tokio::test]
async fn operator_lists_pages_and_reviews() {
    let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
    let harness = signed_in_operator(storage).await;
    let dashboard = &harness.dashboard;

    assert_eq!(harness.nav.last(), Some(Route::Dashboard));
    assert_eq!(dashboard.guard.check("/login"), GuardDecision::Redirect(Route::Dashboard));
    assert_eq!(dashboard.guard.check("/dashboard"), GuardDecision::Allow);

    dashboard.payments.refresh().await;
    assert_eq!(dashboard.payments.presentation(), Presentation::Populated);
    assert_eq!(dashboard.payments.rows().len(), 10);
    assert_eq!(dashboard.payments.page_count(), 2);
    assert!(dashboard.payments.rows().iter().all(|row| row.can_review));

    dashboard.payments.go_to_page(1).await;
    assert_eq!(row_ids(&harness), ["11", "12"]);

    let outcome = dashboard.payments.review("3").await;
    assert_eq!(outcome, ReviewOutcome::Reviewed("success review".into()));

    let last_note = harness.notes.entries().pop().unwrap();
    assert_eq!(last_note.title, "success");
    assert_eq!(last_note.description.as_deref(), Some("success review"));
}

#[tokio::test]
async fn filter_and_sort_reach_the_backend() {
    let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
    let harness = signed_in_operator(storage).await;
    let payments = &harness.dashboard.payments;

    payments.go_to_page(1).await;
    payments.select_status(Some("pending".into())).await;
    assert_eq!(payments.query().offset, 0);
    assert!(payments
        .rows()
        .iter()
        .all(|row| row.payment.status == "pending"));

    payments.select_status(None).await;
    payments.toggle_sort(SortColumn::Amount).await;
    let last = harness.backend.requests().pop().unwrap();
    assert_eq!(last.query_param("sort"), Some("amount"));
    assert_eq!(last.query_param("status"), None);
    assert_eq!(row_ids(&harness).first().map(String::as_str), Some("1"));
}

#[tokio::test]
async fn review_failure_keeps_session() {
    let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
    let harness = signed_in_operator(storage).await;

    let outcome = harness.dashboard.payments.review("999").await;

    match outcome {
        ReviewOutcome::Failed(ClientError::Api(err)) => {
            assert_eq!(err.code, "404");
            assert_eq!(err.message, "payment not found");
        }
        other => panic!("expected API failure, got {other:?}"),
    }
    assert!(harness.dashboard.store.get().is_some());
}

#[tokio::test(start_paused = true)]
async fn search_box_fetches_once_after_typing_stops() {
    let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
    let harness = signed_in_operator(storage).await;
    let payments = &harness.dashboard.payments;
    let before = harness.backend.requests().len();

    for text in ["1", "12"] {
        payments.search_input(text);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    let sent = harness.backend.requests();
    assert_eq!(sent.len(), before + 1);
    assert_eq!(sent.last().unwrap().query_param("id"), Some("12"));
    assert_eq!(row_ids(&harness), ["12"]);
}

// ============================================================================
// Other roles
// ============================================================================

#[tokio::test]
async fn cs_user_sees_no_review_action() {
    let backend = Arc::new(FakeBackend::new(vec![payment("1", "100", "pending")]));
    let harness = TestHarness::load(Arc::new(MemoryStorage::new()), backend);

    harness
        .dashboard
        .login
        .login("cs@test.com", "password")
        .await;
    assert_eq!(
        harness.dashboard.store.get().map(|s| s.role),
        Some("cs".to_string())
    );

    harness.dashboard.payments.refresh().await;
    assert_eq!(harness.dashboard.payments.presentation(), Presentation::Populated);
    assert!(harness.dashboard.payments.rows().iter().all(|row| !row.can_review));
    assert_eq!(
        harness.dashboard.payments.review("1").await,
        ReviewOutcome::NotPermitted
    );
}

#[tokio::test]
async fn wrong_password_is_reported() {
    let backend = Arc::new(FakeBackend::new(sample_payments()));
    let harness = TestHarness::load(Arc::new(MemoryStorage::new()), backend);

    let outcome = harness
        .dashboard
        .login
        .login("operation@test.com", "nope")
        .await;

    assert!(matches!(outcome, LoginOutcome::Failed(ClientError::Api(_))));
    assert_eq!(harness.dashboard.store.get(), None);
    let note = harness.notes.entries().pop().unwrap();
    assert_eq!(note.title, "400");
    assert_eq!(note.description.as_deref(), Some("invalid email or password"));
}

// ============================================================================
// Eviction
// ============================================================================

#[tokio::test]
async fn expired_credential_evicts_and_guards_next_load() {
    let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
    let harness = signed_in_operator(storage.clone()).await;
    harness.dashboard.payments.refresh().await;
    assert_eq!(harness.dashboard.payments.presentation(), Presentation::Populated);

    harness.backend.expire_tokens();
    harness.dashboard.payments.toggle_sort(SortColumn::Amount).await;

    assert_eq!(harness.dashboard.store.get(), None);
    assert_eq!(harness.nav.last(), Some(Route::Login));
    assert_eq!(assert_ok!(storage.get_item("auth.user")), None);

    // Next page load is sent back to login
    let reload = TestHarness::load(storage, harness.backend.clone());
    assert_eq!(
        reload.dashboard.guard.check("/dashboard"),
        GuardDecision::Redirect(Route::Login)
    );
}

#[tokio::test]
async fn signed_out_fetch_is_evicted_not_failed() {
    let backend = Arc::new(FakeBackend::new(sample_payments()));
    let harness = TestHarness::load(Arc::new(MemoryStorage::new()), backend);

    let outcome = harness
        .dashboard
        .gateway
        .list_payments(&harness.dashboard.payments.query())
        .await;

    let outcome = assert_ok!(outcome);
    assert!(outcome.is_evicted());
    assert_eq!(harness.nav.last(), Some(Route::Login));

    let sent = harness.backend.requests();
    assert_eq!(sent[0].headers[reqwest::header::AUTHORIZATION], "Bearer ");
}

#[test]
fn file_storage_rejects_unsafe_keys() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    assert_err!(storage.set_item("../outside", "x"));
}
