//! OpenAI-compatible chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::models::{ChatMessage, ChatRequest, ChatResponse};
use crate::{ModelConfig, ModelError, ModelInvoker, Result};

/// Client for any server speaking the `/chat/completions` protocol.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    api_key: Option<String>,
    request_timeout_secs: u64,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl ChatClient {
    /// Build a client from config, reading the API key from the environment.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit API key (or none).
    pub fn with_api_key(config: &ModelConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ModelError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key,
            request_timeout_secs: config.request_timeout_secs,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a chat completion request
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if status.is_success() {
            response
                .json::<ChatResponse>()
                .await
                .map_err(|e| ModelError::InvalidResponse(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, body))
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout {
                seconds: self.request_timeout_secs,
            }
        } else if err.is_connect() {
            ModelError::Unavailable(format!("cannot reach {}: {err}", self.base_url))
        } else {
            ModelError::Unavailable(err.to_string())
        }
    }
}

/// Overload and gateway statuses mean the model is temporarily unavailable;
/// everything else is reported verbatim.
fn status_error(status: StatusCode, body: String) -> ModelError {
    match status {
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => {
            ModelError::Unavailable(format!("{status}: {body}"))
        }
        _ => ModelError::Server {
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl ModelInvoker for ChatClient {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model, vec![ChatMessage::user(prompt)])
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "sending chat completion"
        );
        let response = self.chat_completion(&request).await?;

        if let Some(usage) = response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }

        response
            .content()
            .map(str::to_string)
            .ok_or_else(|| ModelError::InvalidResponse("response contained no choices".into()))
    }
}
