//! Model invocation for coderev.
//!
//! Every pipeline stage turns a rendered prompt into generated text through
//! the [`ModelInvoker`] trait. Two implementations ship with the crate:
//!
//! - [`ChatClient`]: talks to any OpenAI-compatible `/chat/completions` endpoint
//!   (OpenAI itself, LM Studio, vLLM, ...).
//! - [`ScriptedInvoker`]: answers from a fixed script and records prompts, for
//!   tests and dry runs.

mod client;
mod config;
mod models;
mod scripted;

pub use client::ChatClient;
pub use config::ModelConfig;
pub use models::{ChatMessage, ChatRequest, ChatResponse, Choice, Usage};
pub use scripted::ScriptedInvoker;

use async_trait::async_trait;

/// Default chat completions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default sampling temperature. Low, since reviews should be repeatable-ish.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Default environment variable holding the API key.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Error types for model invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Model endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("Model request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Model server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("API key not found in environment variable {var}")]
    MissingApiKey { var: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Turns a fully formatted prompt into generated text.
///
/// Callers await the whole response. Retries, rate limiting and timeouts are
/// the implementation's business; failures are returned to the caller.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String>;
}
