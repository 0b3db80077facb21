//! Retry-gated executor.
//!
//! One invocation runs: cache check, then up to `max_attempts` rounds of
//! call model, parse, validate. A rejected round turns its problems into
//! feedback lines for the next prompt. The first accepted output is
//! written to the cache and returned.

use crate::client::{ModelClient, ModelRequest, TransportError};
use crate::operation::{Attempt, GatedOperation};
use lexiforge_cache::{Cache, CacheKey};
use lexiforge_core::{LanguageDefinition, ValidationResult};
use lexiforge_validate::RuleValidator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Semantic attempts per invocation, shared by every operation kind
    pub max_attempts: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl ExecutorConfig {
    /// Set the attempt budget (at least 1)
    #[must_use]
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// Attempt budget actually used; a deserialized 0 still allows one call
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// A validated operation output.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult<T> {
    /// Operation name
    pub operation: String,
    /// Attempt that succeeded; 0 on a cache hit
    pub attempt: u32,
    /// Raw model text
    pub raw: String,
    /// Decoded output
    pub data: T,
    /// Validation slice result (warnings only)
    pub validation: ValidationResult,
    /// Wall-clock time of the invocation
    pub duration: Duration,
    /// Served from cache
    pub from_cache: bool,
    /// Cache key the output lives under
    pub cache_key: Option<CacheKey>,
}

/// Terminal failure of an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// Every attempt was rejected
    #[error("{operation} failed after {attempts} attempt(s): {last_error}")]
    Exhausted {
        /// Operation name
        operation: String,
        /// Attempts made
        attempts: u32,
        /// Message of the last attempt
        last_error: String,
        /// One reason per attempt, in order
        retry_reasons: Vec<String>,
        /// Wall-clock time in milliseconds
        duration_ms: u64,
    },
    /// The model call itself failed after transport retries
    #[error("{operation} attempt {attempt}: {source}")]
    Transport {
        /// Operation name
        operation: String,
        /// Attempt during which the call failed
        attempt: u32,
        /// Underlying failure
        source: TransportError,
    },
    /// The request could not be encoded
    #[error("{operation}: cannot encode request: {reason}")]
    Request {
        /// Operation name
        operation: String,
        /// Encoder message
        reason: String,
    },
}

#[derive(Serialize, Deserialize)]
struct CachedOutput<T> {
    raw: String,
    data: T,
    validation: ValidationResult,
}

/// Runs gated operations against a model client and a cache.
#[derive(Clone)]
pub struct GatedExecutor {
    client: Arc<dyn ModelClient>,
    cache: Arc<dyn Cache>,
    validator: RuleValidator,
    config: ExecutorConfig,
}

impl GatedExecutor {
    /// Create an executor with the default configuration and validator
    #[must_use]
    pub fn new(client: Arc<dyn ModelClient>, cache: Arc<dyn Cache>) -> Self {
        Self {
            client,
            cache,
            validator: RuleValidator::new(),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the configuration
    #[must_use]
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the validator
    #[must_use]
    pub fn with_validator(mut self, validator: RuleValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Validator used for operation slices
    #[must_use]
    pub fn validator(&self) -> &RuleValidator {
        &self.validator
    }

    /// Parse and validate one raw response
    pub fn evaluate<O: GatedOperation>(
        &self,
        op: &O,
        base: &LanguageDefinition,
        raw: &str,
    ) -> Attempt<O::Output> {
        let data = match op.parse(raw) {
            Ok(data) => data,
            Err(err) => return Attempt::ParseFailure(err),
        };
        let candidate = op.candidate(base, &data);
        let validation = self.validator.validate_passes(&candidate, op.passes());
        if validation.valid {
            Attempt::Success { data, validation }
        } else {
            Attempt::ValidationFailure(validation)
        }
    }

    /// Execute `op` for `request` against the current language
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Exhausted`] if no attempt passes, or
    /// [`OperationError::Transport`] if a model call fails outright
    #[tracing::instrument(skip_all, fields(operation = op.name()))]
    pub async fn execute<O: GatedOperation>(
        &self,
        op: &O,
        request: &O::Request,
        base: &LanguageDefinition,
    ) -> Result<OperationResult<O::Output>, OperationError> {
        let started = Instant::now();
        let name = op.name();
        let request_json = serde_json::to_value(request).map_err(|e| OperationError::Request {
            operation: name.to_string(),
            reason: e.to_string(),
        })?;

        match self.cache.get(name, &request_json).await {
            Ok(Some(entry)) => match serde_json::from_value::<CachedOutput<O::Output>>(entry.data) {
                Ok(cached) => {
                    tracing::debug!(key = %entry.key, "cache hit");
                    return Ok(OperationResult {
                        operation: name.to_string(),
                        attempt: 0,
                        raw: cached.raw,
                        data: cached.data,
                        validation: cached.validation,
                        duration: started.elapsed(),
                        from_cache: true,
                        cache_key: Some(entry.key),
                    });
                }
                Err(err) => tracing::warn!(key = %entry.key, error = %err, "ignoring undecodable cache entry"),
            },
            Ok(None) => tracing::debug!("cache miss"),
            Err(err) => tracing::warn!(error = %err, "cache lookup failed"),
        }

        let prompt = op.prompt(request, base);
        let max_attempts = self.config.attempt_budget();
        let mut feedback: Vec<String> = Vec::new();
        let mut retry_reasons: Vec<String> = Vec::new();

        for attempt in 1..=max_attempts {
            let model_request = ModelRequest {
                operation: name.to_string(),
                system: op.system().to_string(),
                prompt: prompt.clone(),
                feedback: feedback.clone(),
                attempt,
            };
            let response = self
                .client
                .complete(&model_request)
                .await
                .map_err(|source| OperationError::Transport {
                    operation: name.to_string(),
                    attempt,
                    source,
                })?;

            match self.evaluate(op, base, &response.text) {
                Attempt::Success { data, validation } => {
                    tracing::debug!(attempt, warnings = validation.issues.len(), "attempt accepted");
                    let cache_key = self
                        .store(name, &request_json, &response.text, &data, &validation)
                        .await;
                    return Ok(OperationResult {
                        operation: name.to_string(),
                        attempt,
                        raw: response.text,
                        data,
                        validation,
                        duration: started.elapsed(),
                        from_cache: false,
                        cache_key,
                    });
                }
                Attempt::ParseFailure(err) => {
                    tracing::warn!(attempt, error = %err, "response rejected: parse failure");
                    retry_reasons.push(format!("parse error: {err}"));
                    feedback.push(format!(
                        "Your response could not be parsed ({err}). Reply with one JSON document in the requested shape."
                    ));
                }
                Attempt::ValidationFailure(result) => {
                    let lines = result.feedback();
                    tracing::warn!(attempt, errors = lines.len(), "response rejected: validation failure");
                    retry_reasons.push(format!("{}: {}", result.summary(), lines.join("; ")));
                    feedback.extend(lines);
                }
            }
        }

        Err(OperationError::Exhausted {
            operation: name.to_string(),
            attempts: max_attempts,
            last_error: retry_reasons.last().cloned().unwrap_or_default(),
            retry_reasons,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn store<T: Serialize>(
        &self,
        operation: &str,
        request: &serde_json::Value,
        raw: &str,
        data: &T,
        validation: &ValidationResult,
    ) -> Option<CacheKey> {
        let payload = CachedOutput {
            raw: raw.to_string(),
            data,
            validation: validation.clone(),
        };
        let value = match serde_json::to_value(&payload) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "output not cacheable");
                return None;
            }
        };
        match self.cache.set(operation, request, value).await {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::warn!(error = %err, "cache write failed");
                None
            }
        }
    }
}
