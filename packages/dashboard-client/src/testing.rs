//! In-crate test doubles.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::Result;
use crate::transport::{ApiRequest, ApiResponse, Transport};

pub struct Scripted {
    pub delay: Duration,
    pub result: Result<ApiResponse>,
}

impl Scripted {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(ApiResponse::json(status, &body)),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = Box<dyn Fn(&ApiRequest) -> Scripted + Send + Sync>;

/// Replays queued responses in order, then falls back to a responder.
/// Records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<Scripted>>,
    responder: Mutex<Option<Responder>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: StatusCode, body: &str) {
        self.push(Scripted {
            delay: Duration::ZERO,
            result: Ok(ApiResponse::new(status, body)),
        });
    }

    pub fn respond_json(&self, status: StatusCode, body: Value) {
        self.push(Scripted::json(status, body));
    }

    pub fn fail_next(&self, err: crate::error::ClientError) {
        self.push(Scripted {
            delay: Duration::ZERO,
            result: Err(err),
        });
    }

    pub fn push(&self, scripted: Scripted) {
        self.queue.lock().unwrap().push_back(scripted);
    }

    pub fn respond_with(&self, responder: impl Fn(&ApiRequest) -> Scripted + Send + Sync + 'static) {
        *self.responder.lock().unwrap() = Some(Box::new(responder));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let scripted = {
            let queued = self.queue.lock().unwrap().pop_front();
            match queued {
                Some(scripted) => scripted,
                None => match self.responder.lock().unwrap().as_ref() {
                    Some(responder) => responder(&request),
                    None => Scripted {
                        delay: Duration::ZERO,
                        result: Ok(ApiResponse::new(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            r#"{"code":"500","message":"no scripted response"}"#,
                        )),
                    },
                },
            }
        };
        self.requests.lock().unwrap().push(request);

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.result
    }
}
