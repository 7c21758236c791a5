use std::time::Duration;

use async_trait::async_trait;
use cartwise_core::config::LlmConfig;
use cartwise_core::domain::conversation::Message;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Sampling is always disabled so identical histories route identically.
pub const TEMPERATURE: f32 = 0.0;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to language backend failed: {0}")]
    Transport(String),
    #[error("language backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("language backend returned no content")]
    EmptyResponse,
    #[error("could not decode language backend response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Completes `history` under `system_prompt`, constrained to a single JSON
    /// object. Returns the raw object text.
    async fn complete_json(
        &self,
        system_prompt: &str,
        history: &[Message],
    ) -> Result<String, LlmError>;
}

/// Client for any backend exposing the OpenAI `chat/completions` endpoint
/// (OpenAI, Groq, Ollama).
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

impl OpenAiCompatibleClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Transport(error.to_string()))?;

        Ok(Self {
            http,
            endpoint: completions_endpoint(config.effective_base_url()),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete_json(
        &self,
        system_prompt: &str,
        history: &[Message],
    ) -> Result<String, LlmError> {
        let body = build_request_body(&self.model, system_prompt, history);
        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response =
            request.send().await.map_err(|error| LlmError::Transport(error.to_string()))?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let payload: ChatCompletionResponse =
            response.json().await.map_err(|error| LlmError::Decode(error.to_string()))?;
        extract_content(payload)
    }
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

pub(crate) fn build_request_body(model: &str, system_prompt: &str, history: &[Message]) -> Value {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(json!({ "role": "system", "content": system_prompt }));
    messages.extend(
        history
            .iter()
            .map(|message| json!({ "role": message.role.as_str(), "content": message.content })),
    );

    json!({
        "model": model,
        "temperature": TEMPERATURE,
        "response_format": { "type": "json_object" },
        "messages": messages,
    })
}

#[derive(Debug, Deserialize, Serialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize, Serialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_content(payload: ChatCompletionResponse) -> Result<String, LlmError> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}
