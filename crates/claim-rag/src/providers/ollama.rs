//! Ollama LLM provider for running the adjudicator against a local model

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::llm::{ensure_success, http_client, send_error, LlmProvider, RetryPolicy};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama `/api/generate` client with automatic retry
pub struct OllamaLlm {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
    retry: RetryPolicy,
}

impl OllamaLlm {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
            retry: RetryPolicy::from_config(config),
        })
    }

    async fn generate_once(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;
        let response = ensure_success(response).await?;

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse generate response: {}", e)))?;

        Ok(result.response)
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!("Generating with Ollama model {}", self.model);
        self.retry
            .run("Ollama generation", move || self.generate_once(prompt))
            .await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
