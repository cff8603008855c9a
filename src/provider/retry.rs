// src/provider/retry.rs — Retry with exponential backoff for model providers
//
// Wraps any ModelProvider and retries `chat()` when the upstream rate-limits us.
// Retries: RateLimited (HTTP 429) only.
// Does NOT retry: anything else. Those propagate on the first failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, ModelProvider};
use crate::infra::config::RetrySettings;
use crate::infra::errors::WayfareError;

/// Ceiling on a server-supplied retry-after hint.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, counting the first call.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: Duration::from_secs(settings.initial_delay_secs),
            backoff_factor: settings.backoff_factor,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt + 1` (0-indexed): initial * factor^attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let ms = self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        Duration::from_millis(ms as u64)
    }
}

/// A provider wrapper that adds retry with exponential backoff.
pub struct RetryProvider {
    inner: Arc<dyn ModelProvider>,
    config: RetryConfig,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn ModelProvider>) -> Self {
        Self {
            inner,
            config: RetryConfig::default(),
        }
    }

    pub fn with_config(inner: Arc<dyn ModelProvider>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// The server's retry-after hint wins when it asks for a longer pause,
    /// up to `MAX_RETRY_AFTER`.
    fn delay_for(&self, attempt: u32, error: &WayfareError) -> Duration {
        let backoff = self.config.delay_for_attempt(attempt);
        match error {
            WayfareError::RateLimited { retry_after_ms, .. } => {
                let hint = Duration::from_millis(*retry_after_ms).min(MAX_RETRY_AFTER);
                backoff.max(hint)
            }
            _ => backoff,
        }
    }
}

#[async_trait]
impl ModelProvider for RetryProvider {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, WayfareError> {
        let mut attempt = 0;
        loop {
            match self.inner.chat(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !e.is_rate_limit() || attempt + 1 >= self.config.max_attempts {
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt, &e);
                    tracing::warn!(
                        provider = self.inner.id(),
                        attempt = attempt + 1,
                        max_attempts = self.config.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
