//! LLM provider trait and shared HTTP plumbing for decision generation

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{LlmBackend, LlmConfig};
use crate::error::{Error, Result};

use super::ollama::OllamaLlm;
use super::openrouter::OpenRouterLlm;

/// Trait for sending a rendered prompt to a language model
///
/// Implementations:
/// - `OpenRouterLlm`: OpenAI-compatible chat completions on OpenRouter
/// - `OllamaLlm`: local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the prompt and return the model's text output unmodified
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model in use
    fn model(&self) -> &str;
}

/// Build the configured LLM provider
pub fn create_llm(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.backend {
        LlmBackend::OpenRouter => Arc::new(OpenRouterLlm::new(config)?),
        LlmBackend::Ollama => Arc::new(OllamaLlm::new(config)?),
    };
    tracing::info!(
        "LLM provider initialized: {} (model: {})",
        provider.name(),
        provider.model()
    );
    Ok(provider)
}

/// Exponential backoff for transient remote failures
#[derive(Debug, Clone)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
}

impl RetryPolicy {
    pub(crate) fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Run `operation`, retrying only errors that report themselves as retryable
    pub(crate) async fn run<F, Fut, T>(&self, what: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.initial_backoff.saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}, retrying in {:?}",
                        what,
                        attempt,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// HTTP client with the configured request timeout
pub(crate) fn http_client(config: &LlmConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_max_idle_per_host(5)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Classify a transport failure
pub(crate) fn send_error(err: reqwest::Error, timeout_secs: u64) -> Error {
    if err.is_timeout() {
        Error::LlmTimeout(timeout_secs)
    } else if err.is_connect() || err.is_request() {
        Error::remote_transient(format!("Request failed: {}", err))
    } else {
        Error::remote(format!("Request failed: {}", err))
    }
}

/// Turn non-2xx responses into remote service errors
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("HTTP {} - {}", status, body.trim());
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Err(Error::remote_transient(message))
    } else {
        Err(Error::remote(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = policy(2)
            .run("generation", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::remote_transient("HTTP 503"))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = policy(1)
            .run("generation", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::LlmTimeout(1))
            })
            .await;

        assert!(matches!(result, Err(Error::LlmTimeout(1))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_backoff_saturates_on_long_retry_chains() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            max_retries: 40,
            initial_backoff: Duration::ZERO,
        };
        let result = policy
            .run("generation", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 35 {
                    Err(Error::remote_transient("HTTP 429"))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 36);
    }

    #[tokio::test]
    async fn test_does_not_retry_auth_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = policy(3)
            .run("generation", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::remote("HTTP 401 Unauthorized"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
