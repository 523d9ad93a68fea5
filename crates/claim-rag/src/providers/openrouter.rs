//! OpenRouter chat-completions provider

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{LlmConfig, API_KEY_ENV};
use crate::error::{Error, Result};

use super::llm::{ensure_success, http_client, send_error, LlmProvider, RetryPolicy};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible client for `https://openrouter.ai/api/v1`
///
/// Sends the whole prompt as a single user message and returns the first
/// choice's content untouched.
pub struct OpenRouterLlm {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    referer: String,
    timeout_secs: u64,
    retry: RetryPolicy,
}

impl OpenRouterLlm {
    /// Create a provider; fails when no API key is configured
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "OpenRouter API key missing; set {} or llm.api_key",
                    API_KEY_ENV
                ))
            })?;

        Ok(Self {
            client: http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            referer: config.referer.clone(),
            timeout_secs: config.timeout_secs,
            retry: RetryPolicy::from_config(config),
        })
    }

    async fn chat_once(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;
        let response = ensure_success(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse chat response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::remote("Chat response contained no choices"))
    }
}

#[async_trait]
impl LlmProvider for OpenRouterLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!(
            "Requesting completion from {} ({} prompt bytes)",
            self.model,
            prompt.len()
        );
        self.retry
            .run("OpenRouter completion", move || self.chat_once(prompt))
            .await
    }

    fn name(&self) -> &str {
        "openrouter"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
