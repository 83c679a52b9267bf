//! In-memory stand-in for the dashboard API.

use std::sync::Mutex;

use async_trait::async_trait;
use dashboard_client::{ApiRequest, ApiResponse, Result, UNAUTHORIZED_MESSAGE};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

pub const VALID_TOKEN: &str = "token-operation";
pub const CS_TOKEN: &str = "token-cs";

/// Answers login, list and review calls from a fixed payment table.
///
/// Only tokens handed out by login are accepted on protected endpoints;
/// anything else gets the authorization-failure body.
pub struct FakeBackend {
    payments: Vec<Value>,
    token_valid: Mutex<bool>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl FakeBackend {
    pub fn new(payments: Vec<Value>) -> Self {
        Self {
            payments,
            token_valid: Mutex::new(true),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Make the backend reject every credential from now on.
    pub fn expire_tokens(&self) {
        *self.token_valid.lock().unwrap() = false;
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn authorized(&self, request: &ApiRequest) -> bool {
        let presented = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        *self.token_valid.lock().unwrap() && matches!(presented, Some(VALID_TOKEN | CS_TOKEN))
    }

    fn login(&self, request: &ApiRequest) -> ApiResponse {
        let body = request.body.clone().unwrap_or(Value::Null);
        match (body["email"].as_str(), body["password"].as_str()) {
            (Some("operation@test.com"), Some("password")) => ApiResponse::json(
                StatusCode::OK,
                &json!({"email": "operation@test.com", "role": "operation", "token": VALID_TOKEN}),
            ),
            (Some("cs@test.com"), Some("password")) => ApiResponse::json(
                StatusCode::OK,
                &json!({"email": "cs@test.com", "role": "cs", "token": CS_TOKEN}),
            ),
            _ => ApiResponse::json(
                StatusCode::BAD_REQUEST,
                &json!({"code": "400", "message": "invalid email or password"}),
            ),
        }
    }

    fn list(&self, request: &ApiRequest) -> ApiResponse {
        let param = |name: &str| request.query_param(name).map(str::to_string);
        let limit: usize = param("limit").and_then(|v| v.parse().ok()).unwrap_or(10);
        let offset: usize = param("offset").and_then(|v| v.parse().ok()).unwrap_or(0);

        let mut filtered: Vec<Value> = self
            .payments
            .iter()
            .filter(|p| param("status").map_or(true, |s| p["status"] == s.as_str()))
            .filter(|p| param("id").map_or(true, |id| p["id"] == id.as_str()))
            .cloned()
            .collect();
        if param("sort").as_deref() == Some("amount") {
            filtered.sort_by_key(|p| p["amount"].as_str().and_then(|a| a.parse::<u64>().ok()));
        }

        let total = filtered.len();
        let page: Vec<Value> = filtered.into_iter().skip(offset).take(limit).collect();
        let count = |status: &str| self.payments.iter().filter(|p| p["status"] == status).count();

        ApiResponse::json(
            StatusCode::OK,
            &json!({
                "meta": {"limit": limit, "offset": offset, "total": total},
                "payments": page,
                "summary": {
                    "total": self.payments.len(),
                    "completed": count("completed"),
                    "failed": count("failed"),
                    "pending": count("pending"),
                }
            }),
        )
    }

    fn review(&self, request: &ApiRequest) -> ApiResponse {
        let id = request
            .path
            .trim_start_matches("/dashboard/v1/payment/")
            .trim_end_matches("/review");
        if self.payments.iter().any(|p| p["id"] == id) {
            ApiResponse::json(StatusCode::OK, &json!({"message": "success review"}))
        } else {
            ApiResponse::json(
                StatusCode::NOT_FOUND,
                &json!({"code": "404", "message": "payment not found"}),
            )
        }
    }
}

#[async_trait]
impl dashboard_client::Transport for FakeBackend {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.seen.lock().unwrap().push(request.clone());

        if request.method == Method::POST && request.path == "/dashboard/v1/auth/login" {
            return Ok(self.login(&request));
        }
        if !self.authorized(&request) {
            return Ok(ApiResponse::json(
                StatusCode::UNAUTHORIZED,
                &json!({"code": "401", "message": UNAUTHORIZED_MESSAGE}),
            ));
        }

        if request.method == Method::GET && request.path == "/dashboard/v1/payments" {
            return Ok(self.list(&request));
        }
        if request.method == Method::PUT && request.path.ends_with("/review") {
            return Ok(self.review(&request));
        }
        Ok(ApiResponse::json(
            StatusCode::NOT_FOUND,
            &json!({"code": "404", "message": "not found"}),
        ))
    }
}

pub fn payment(id: &str, amount: &str, status: &str) -> Value {
    json!({
        "id": id,
        "merchant": format!("merchant {id}"),
        "amount": amount,
        "status": status,
        "createdAt": "2025-11-24T01:10:25+07:00"
    })
}

pub fn sample_payments() -> Vec<Value> {
    (1..=12)
        .map(|n| {
            let status = match n % 4 {
                0 => "failed",
                1 | 2 => "completed",
                _ => "pending",
            };
            payment(&n.to_string(), &(n * 100).to_string(), status)
        })
        .collect()
}
