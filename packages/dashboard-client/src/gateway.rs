//! Authenticated API gateway.
//!
//! Every backend call passes through [`AuthGateway`], which attaches the
//! bearer credential and inspects the response before the caller sees it:
//!
//! - 2xx: decoded and handed back as [`Outcome::Completed`].
//! - Authorization failure: the session is cleared, a redirect to login is
//!   issued, and the caller gets [`Outcome::Evicted`] instead of an error.
//! - Anything else: the parsed [`ApiError`] is returned unchanged.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ApiError, ClientError, Result};
use crate::payments::PaymentQuery;
use crate::routing::{Navigator, Route};
use crate::session::SessionStore;
use crate::transport::{ApiRequest, Transport};
use crate::types::{
    LoginRequest, PaymentList, ReviewDecision, ReviewRequest, ReviewResponse, Session,
};

/// Message the backend sends when the presented credential is rejected.
pub const UNAUTHORIZED_MESSAGE: &str = "security requirements failed: authorization failed";

const LOGIN_PATH: &str = "/dashboard/v1/auth/login";
const PAYMENTS_PATH: &str = "/dashboard/v1/payments";

/// Decides whether a parsed failure means "credential rejected".
pub type FailurePredicate = Arc<dyn Fn(&ApiError) -> bool + Send + Sync>;

/// Default predicate: exact match against [`UNAUTHORIZED_MESSAGE`].
pub fn is_authorization_failure(err: &ApiError) -> bool {
    err.message == UNAUTHORIZED_MESSAGE
}

/// What a successful round trip through the gateway produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    /// Credential was rejected; the session is gone and a redirect is underway.
    Evicted,
}

impl<T> Outcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Evicted => None,
        }
    }

    pub fn is_evicted(&self) -> bool {
        matches!(self, Outcome::Evicted)
    }
}

/// Single choke point for backend calls.
#[derive(Clone)]
pub struct AuthGateway {
    transport: Arc<dyn Transport>,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    is_authorization_failure: FailurePredicate,
}

impl AuthGateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            store,
            navigator,
            is_authorization_failure: Arc::new(is_authorization_failure),
        }
    }

    /// Replace the authorization-failure predicate.
    pub fn with_failure_predicate(
        mut self,
        predicate: impl Fn(&ApiError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_authorization_failure = Arc::new(predicate);
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// `Bearer <token>`; the credential is empty when nobody is signed in
    /// and the backend rejects it.
    fn authorization_header(&self) -> HeaderValue {
        let token = self.store.get().map(|s| s.token).unwrap_or_default();
        HeaderValue::from_str(&format!("Bearer {token}"))
            .unwrap_or_else(|_| HeaderValue::from_static("Bearer "))
    }

    /// Send a request and decode a 2xx body as `T`.
    pub async fn send<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<Outcome<T>> {
        request
            .headers
            .insert(AUTHORIZATION, self.authorization_header());

        let method = request.method.clone();
        let path = request.path.clone();
        let response = self.transport.execute(request).await?;

        if response.is_success() {
            debug!(%method, %path, status = response.status.as_u16(), "Request succeeded");
            let value = serde_json::from_str(&response.body)
                .map_err(|e| ClientError::Parse(format!("{method} {path}: {e}")))?;
            return Ok(Outcome::Completed(value));
        }

        let err = ApiError::from_response(response.status, &response.body);
        if (self.is_authorization_failure)(&err) {
            warn!(%method, %path, "Credential rejected, ending session");
            self.store.clear();
            self.navigator.redirect(Route::Login);
            return Ok(Outcome::Evicted);
        }

        debug!(%method, %path, code = %err.code, message = %err.message, "Request failed");
        Err(ClientError::Api(err))
    }

    async fn send_json<B, T>(&self, request: ApiRequest, body: &B) -> Result<Outcome<T>>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Parse(e.to_string()))?;
        self.send(request.with_json(body)).await
    }

    // ------------------------------------------------------------------------
    // Endpoints
    // ------------------------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<Outcome<Session>> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send_json(ApiRequest::post(LOGIN_PATH), &body).await
    }

    pub async fn list_payments(&self, query: &PaymentQuery) -> Result<Outcome<PaymentList>> {
        self.send(ApiRequest::get(PAYMENTS_PATH).with_query(query.to_params()))
            .await
    }

    pub async fn review_payment(
        &self,
        payment_id: &str,
        decision: ReviewDecision,
    ) -> Result<Outcome<ReviewResponse>> {
        let path = format!("/dashboard/v1/payment/{payment_id}/review");
        self.send_json(ApiRequest::put(path), &ReviewRequest { decision })
            .await
    }
}
