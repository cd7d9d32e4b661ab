//! Model endpoint configuration.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Settings for [`ChatClient`](crate::ChatClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional completion token cap.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Environment variable holding the API key. Empty means no key is sent,
    /// which is what local servers expect.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    300 // 5 minutes, full reviews of large files are slow
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            api_key_env: default_api_key_env(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ModelConfig {
    /// Read the API key named by `api_key_env`.
    ///
    /// Returns `Ok(None)` when no variable is configured.
    pub fn resolve_api_key(&self) -> crate::Result<Option<String>> {
        if self.api_key_env.is_empty() {
            return Ok(None);
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
            _ => Err(crate::ModelError::MissingApiKey {
                var: self.api_key_env.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_review_settings() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "gpt-4o");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"model": "qwen2.5-coder", "api_key_env": ""}"#).unwrap();
        assert_eq!(config.model, "qwen2.5-coder");
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.resolve_api_key().unwrap(), None);
    }

    #[test]
    fn test_missing_key_variable_is_reported() {
        let config = ModelConfig {
            api_key_env: "CODEREV_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_api_key(),
            Err(crate::ModelError::MissingApiKey {
                var: "CODEREV_TEST_KEY_THAT_IS_NEVER_SET".to_string()
            })
        );
    }
}
