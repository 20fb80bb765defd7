//! Retrying HTTP request executor
//!
//! Every remote call in this crate goes through [`RequestExecutor`],
//! which owns the retry loop: transient failures (HTTP 429, 5xx,
//! network errors, per-attempt timeouts) are retried with backoff,
//! other 4xx responses fail immediately. A fresh bearer token is
//! fetched before each attempt so a refresh between retries is picked
//! up without restarting the operation.
//!
//! Retrying is conditional on [`RequestSpec::idempotent`]: a request
//! whose repetition could duplicate an effect is sent at most once,
//! and its first transient failure is reported as exhaustion after
//! one attempt.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{header::RETRY_AFTER, Client, Method, Response, StatusCode};
use spdrive_core::domain::errors::{OperationKind, TransferError};
use spdrive_core::ports::ICredentialProvider;
use tracing::{debug, info, warn};

use crate::backoff::{parse_retry_after, BackoffPolicy};

/// Request payload variants
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Bytes(Bytes),
}

/// A fully described request, ready to be attempted
///
/// The spec is immutable across attempts; only the bearer token
/// changes between tries.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Operation this request belongs to, for error attribution
    pub op: OperationKind,
    /// Whether repeating this request is safe
    pub idempotent: bool,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>, op: OperationKind, idempotent: bool) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            op,
            idempotent,
        }
    }

    /// GET requests are always idempotent
    pub fn get(url: impl Into<String>, op: OperationKind) -> Self {
        Self::new(Method::GET, url, op, true)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn bytes(mut self, bytes: Bytes) -> Self {
        self.body = RequestBody::Bytes(bytes);
        self
    }
}

/// Executes requests with authentication, timeouts, and retry
pub struct RequestExecutor {
    http: Client,
    credentials: Arc<dyn ICredentialProvider>,
    policy: BackoffPolicy,
    timeout: Duration,
}

impl RequestExecutor {
    pub fn new(
        credentials: Arc<dyn ICredentialProvider>,
        policy: BackoffPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            http: Client::new(),
            credentials,
            policy,
            timeout,
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Sends the request, retrying transient failures per the policy
    ///
    /// Returns the first successful response. Fatal 4xx statuses map
    /// to [`TransferError::Remote`]; a spent retry budget maps to
    /// [`TransferError::RetryExhausted`] carrying the last cause.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Response, TransferError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let token = self.credentials.bearer_token().await?;
            let mut request = self
                .http
                .request(spec.method.clone(), &spec.url)
                .bearer_auth(token)
                .timeout(self.timeout);
            for (name, value) in &spec.headers {
                request = request.header(name, value);
            }
            request = match &spec.body {
                RequestBody::Empty => request,
                RequestBody::Json(value) => request.json(value),
                RequestBody::Bytes(bytes) => request.body(bytes.clone()),
            };

            let (last, hint) = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        if attempt > 1 {
                            info!(url = %spec.url, attempt, "Request succeeded after retry");
                        }
                        return Ok(response);
                    }
                    if !is_retryable(status) {
                        let message = remote_error_message(response).await;
                        warn!(url = %spec.url, status = status.as_u16(), %message, "Fatal remote error");
                        return Err(TransferError::Remote {
                            op: spec.op,
                            status: status.as_u16(),
                            message,
                        });
                    }
                    let hint = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(parse_retry_after);
                    (format!("HTTP {}", status.as_u16()), hint)
                }
                Err(err) => {
                    let cause = if err.is_timeout() {
                        format!("attempt timed out after {:?}", self.timeout)
                    } else {
                        format!("network error: {err}")
                    };
                    (cause, None)
                }
            };

            if !spec.idempotent {
                warn!(url = %spec.url, %last, "Transient failure on non-repeatable request");
                return Err(TransferError::RetryExhausted {
                    op: spec.op,
                    attempts: attempt,
                    last,
                });
            }

            match self.policy.delay_for(attempt, hint) {
                Some(delay) => {
                    debug!(
                        url = %spec.url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %last,
                        "Transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    warn!(url = %spec.url, attempts = attempt, %last, "Retry budget exhausted");
                    return Err(TransferError::RetryExhausted {
                        op: spec.op,
                        attempts: attempt,
                        last,
                    });
                }
            }
        }
    }

    /// Executes the request and deserializes the JSON body
    pub async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        spec: &RequestSpec,
    ) -> Result<T, TransferError> {
        let response = self.execute(spec).await?;
        response
            .json()
            .await
            .map_err(|e| TransferError::Protocol(format!("Malformed response body: {e}")))
    }
}

/// 429 and every 5xx are worth retrying; all other non-success
/// statuses are final.
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Extracts a human-readable message from a Graph error response
///
/// Graph errors carry `{"error": {"code": ..., "message": ...}}`;
/// anything else falls back to the raw body, truncated.
async fn remote_error_message(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(error) = value.get("error") {
            let code = error.get("code").and_then(|c| c.as_str()).unwrap_or("");
            let message = error.get("message").and_then(|m| m.as_str()).unwrap_or("");
            if !code.is_empty() || !message.is_empty() {
                return format!("{code}: {message}");
            }
        }
    }
    let mut trimmed = body.trim().to_string();
    if trimmed.len() > 200 {
        let end = (0..=200).rev().find(|&i| trimmed.is_char_boundary(i)).unwrap_or(0);
        trimmed.truncate(end);
    }
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed
    }
}
