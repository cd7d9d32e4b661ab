//! Deterministic invoker driven by a script of prompt matchers.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{ModelError, ModelInvoker, Result};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(ModelError),
}

/// Answers prompts from a fixed script and records every prompt it sees.
///
/// Rules are checked in insertion order; the first rule whose needle occurs in
/// the prompt wins. Without a matching rule the fallback is used, and without
/// a fallback the call fails with [`ModelError::InvalidResponse`].
#[derive(Debug, Default)]
pub struct ScriptedInvoker {
    rules: Vec<(String, Reply)>,
    fallback: Option<Reply>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `response` to prompts containing `needle`.
    pub fn respond_when(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules
            .push((needle.into(), Reply::Text(response.into())));
        self
    }

    /// Fail with `error` for prompts containing `needle`.
    pub fn fail_when(mut self, needle: impl Into<String>, error: ModelError) -> Self {
        self.rules.push((needle.into(), Reply::Fail(error)));
        self
    }

    /// Reply used when no rule matches.
    pub fn with_fallback(mut self, response: impl Into<String>) -> Self {
        self.fallback = Some(Reply::Text(response.into()));
        self
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// First recorded prompt containing `needle`.
    pub fn prompt_containing(&self, needle: &str) -> Option<String> {
        self.prompts
            .lock()
            .iter()
            .find(|prompt| prompt.contains(needle))
            .cloned()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .or(self.fallback.as_ref());

        match reply {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Fail(err)) => Err(err.clone()),
            None => Err(ModelError::InvalidResponse(
                "no scripted reply matches prompt".to_string(),
            )),
        }
    }
}
