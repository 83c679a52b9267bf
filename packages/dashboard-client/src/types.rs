//! Wire types for the dashboard API.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Auth Types
// ============================================================================

/// The signed-in actor. Present as a whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub token: String,
    pub role: String,
}

impl Session {
    pub fn new(
        email: impl Into<String>,
        token: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
            role: role.into(),
        }
    }

    /// True when every field carries a value.
    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.token.is_empty() && !self.role.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Payment Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub merchant: String,
    #[serde(default, deserialize_with = "amount_as_string")]
    pub amount: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<FixedOffset>>,
}

/// Echo of the page window plus the filtered total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub total: u64,
}

/// Aggregate counts by status across all payments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSummary {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub pending: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentList {
    #[serde(default)]
    pub meta: PaginationMeta,
    #[serde(default, alias = "items")]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub summary: PaymentSummary,
}

/// Decision sent with a review. Fixed per call, never edited afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewResponse {
    #[serde(default)]
    pub message: String,
}

/// The backend encodes amounts as strings; older builds sent numbers.
fn amount_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected amount: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_list_response() {
        let body = r#"{
            "meta": {"limit": 10, "offset": 0, "total": 12},
            "payments": [
                {"amount": "100", "createdAt": "2025-11-24T01:10:25+07:00", "id": "1", "merchant": "merchant 1", "status": "pending"},
                {"amount": 200, "created_at": "2025-11-24T01:10:25+07:00", "id": "2", "merchant": "merchant 2", "status": "completed"}
            ],
            "summary": {"completed": 9, "failed": 2, "pending": 1, "total": 12}
        }"#;

        let list: PaymentList = serde_json::from_str(body).unwrap();
        assert_eq!(list.meta.total, 12);
        assert_eq!(list.payments.len(), 2);
        assert_eq!(list.payments[0].amount, "100");
        assert_eq!(list.payments[1].amount, "200");
        assert!(list.payments[0].created_at.is_some());
        assert_eq!(list.summary.completed, 9);
    }

    #[test]
    fn null_meta_window_is_accepted() {
        let body = r#"{"meta": {"limit": null, "offset": null, "total": 0}, "payments": [], "summary": {}}"#;
        let list: PaymentList = serde_json::from_str(body).unwrap();
        assert_eq!(list.meta, PaginationMeta::default());
        assert_eq!(list.summary, PaymentSummary::default());
    }

    #[test]
    fn partial_session_does_not_decode() {
        let partial = r#"{"email": "a@test.com", "token": "t"}"#;
        assert!(serde_json::from_str::<Session>(partial).is_err());
    }

    #[test]
    fn review_request_wire_format() {
        let json = serde_json::to_value(ReviewRequest {
            decision: ReviewDecision::Approve,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"decision": "approve"}));
    }
}
