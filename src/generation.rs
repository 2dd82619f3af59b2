//! Generation service boundary.
//!
//! The text-completion service is an external collaborator; the default
//! implementation talks to an OpenAI-compatible chat-completions endpoint
//! (OpenRouter in the shipped platform).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::conversation::{ConversationTurn, Role};
use crate::core::config::GenerationConfig;
use crate::core::errors::RagError;

/// Wire-format chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// Sampling options forwarded to the completion endpoint.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Opaque text-completion collaborator.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, RagError>;
}

/// OpenRouter chat-completions client (OpenAI-compatible API).
pub struct OpenRouterProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl OpenRouterProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://openrouter.ai/api/v1";

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: Client::new(),
        }
    }

    pub fn with_defaults(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(Self::DEFAULT_BASE_URL, api_key, model)
    }
}

#[async_trait]
impl GenerationService for OpenRouterProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, RagError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", "https://synapse.app")
            .header("X-Title", "Synapse Learning Platform")
            .json(&body)
            .send()
            .await
            .map_err(RagError::generation)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RagError::Generation(format!(
                "completion request failed with {status}: {text}"
            )));
        }

        let payload: Value = response.json().await.map_err(RagError::generation)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        if content.is_empty() {
            return Err(RagError::Generation(
                "completion response contained no content".to_string(),
            ));
        }

        Ok(content)
    }
}
