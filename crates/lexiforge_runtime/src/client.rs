//! Model client primitive.
//!
//! A [`ModelClient`] turns one [`ModelRequest`] into raw text. Transport
//! failures are retried inside [`RetryingClient`] with exponential backoff
//! and never reach the semantic attempt loop of the executor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// One prompt sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Operation kind, e.g. `inventory`
    pub operation: String,
    /// System instructions
    pub system: String,
    /// Operation prompt
    pub prompt: String,
    /// Corrections accumulated from earlier rejected attempts
    pub feedback: Vec<String>,
    /// Semantic attempt number, starting at 1
    pub attempt: u32,
}

impl ModelRequest {
    /// Prompt text with the feedback block appended
    #[must_use]
    pub fn render(&self) -> String {
        if self.feedback.is_empty() {
            return self.prompt.clone();
        }
        let mut text = self.prompt.clone();
        text.push_str("\n\nYour previous answer was rejected. Fix these problems:\n");
        for line in &self.feedback {
            text.push_str("- ");
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Raw model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    /// Response text
    pub text: String,
}

/// Transport-level failure of a model call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// HTTP 429
    #[error("rate limited{}", retry_after_ms.map(|ms| format!(" (retry after {ms} ms)")).unwrap_or_default())]
    RateLimited {
        /// Server-requested wait
        retry_after_ms: Option<u64>,
    },
    /// HTTP 5xx
    #[error("server error {status}: {message}")]
    Server {
        /// Status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// HTTP 4xx other than 429
    #[error("client error {status}: {message}")]
    Client {
        /// Status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// The call did not finish in time
    #[error("request timed out after {after_ms} ms")]
    Timeout {
        /// Configured timeout
        after_ms: u64,
    },
    /// Network failure
    #[error("connection failed: {reason}")]
    Connection {
        /// Underlying message
        reason: String,
    },
    /// The client cannot serve requests at all
    #[error("model unavailable: {reason}")]
    Unavailable {
        /// Why
        reason: String,
    },
}

impl TransportError {
    /// True for failures worth retrying with backoff
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Server { .. } | Self::Timeout { .. } | Self::Connection { .. }
        )
    }
}

/// Anything that can answer a [`ModelRequest`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one request
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the call fails
    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, TransportError>;
}

/// Transport retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first failed call
    pub max_retries: u32,
    /// First backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Backoff ceiling in milliseconds
    pub max_delay_ms: u64,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            timeout_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Set the retry count
    #[must_use]
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Per-call timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Wait before retry number `retry` (0-based). A server-supplied
    /// `retry_after` wins over the computed backoff.
    #[must_use]
    pub fn delay_for(&self, retry: u32, err: &TransportError) -> Duration {
        if let TransportError::RateLimited {
            retry_after_ms: Some(ms),
        } = err
        {
            return Duration::from_millis(*ms);
        }
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        let ms = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

/// Wraps a client with timeouts and exponential backoff.
pub struct RetryingClient {
    inner: Arc<dyn ModelClient>,
    policy: RetryPolicy,
}

impl RetryingClient {
    /// Wrap `inner` with the given policy
    #[must_use]
    pub fn new(inner: Arc<dyn ModelClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Active policy
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl ModelClient for RetryingClient {
    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, TransportError> {
        let timeout = self.policy.timeout();
        let mut retry = 0;
        loop {
            let outcome = match tokio::time::timeout(timeout, self.inner.complete(request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(TransportError::Timeout {
                    after_ms: self.policy.timeout_ms,
                }),
            };
            match outcome {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && retry < self.policy.max_retries => {
                    let delay = self.policy.delay_for(retry, &err);
                    tracing::warn!(
                        operation = %request.operation,
                        retry = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "model call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Replays recorded responses in order.
///
/// Used by the CLI to run the pipeline offline and by tests to script the
/// model. Every request is recorded so callers can inspect prompts and
/// feedback afterwards.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<ModelRequest>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    /// Script of successful responses
    #[must_use]
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(responses.into_iter().map(|r| Ok(r.into())))
    }

    /// Script mixing responses and transport failures
    #[must_use]
    pub fn with_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, TransportError>>,
    {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Load a script from a JSON array of response strings
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a JSON array of strings
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let responses: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::new(responses))
    }

    /// Calls made so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Responses not yet served
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every request received, in order
    #[must_use]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(result) => result.map(|text| ModelResponse { text }),
            None => Err(TransportError::Unavailable {
                reason: format!("script exhausted at `{}`", request.operation),
            }),
        }
    }
}
