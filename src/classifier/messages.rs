//! HTTP client for a messages-style text-generation API.

use super::TextCompletion;
use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Default messages endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// API version header value.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

/// Sends one user message per request and returns the first content block's
/// text.
#[derive(Debug, Clone)]
pub struct MessagesClient {
    client: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key: Option<String>,
    api_version: String,
}

impl MessagesClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            max_tokens,
            api_key: None,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Build a client from configuration, reading the API key from the
    /// configured environment variable when it is set.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty());
        Self {
            api_key,
            api_version: config.api_version.clone(),
            ..Self::new(&config.endpoint, &config.model, config.max_tokens)
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextCompletion for MessagesClient {
    async fn complete(&self, prompt: &str) -> Result<String, ClassifyError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "Requesting classification");

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("anthropic-version", &self.api_version)
            .json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: MessagesResponse = serde_json::from_str(&response.text().await?)?;
        body.content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or(ClassifyError::EmptyContent)
    }
}
