//! Reviewer configuration.

use std::path::{Path, PathBuf};

use coderev_graph::DEFAULT_MAX_STEPS;
use coderev_llm::ModelConfig;
use coderev_prompts::PromptLibrary;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "coderev.toml";

/// Reviewer configuration, read from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Directory of `<name>.txt` templates overriding the built-ins.
    #[serde(default)]
    pub prompts_dir: Option<PathBuf>,

    /// Bound on stage executions per run.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Model endpoint.
    #[serde(default)]
    pub model: ModelConfig,
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            prompts_dir: None,
            max_steps: default_max_steps(),
            model: ModelConfig::default(),
        }
    }
}

impl ReviewConfig {
    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(PipelineError::config)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))
    }

    /// Resolve configuration for the current process.
    ///
    /// Uses `explicit` when given; otherwise `./coderev.toml`, then
    /// `<config dir>/coderev/config.toml`, then defaults. Environment
    /// overrides are applied last.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::candidate_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => {
                    debug!(path = %path.display(), "using config file");
                    Self::load(path)?
                }
                None => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("coderev").join("config.toml"));
        }
        paths
    }

    /// Apply `CODEREV_MODEL`, `CODEREV_BASE_URL` and `CODEREV_PROMPTS_DIR`
    /// from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("CODEREV_MODEL") {
            self.model.model = model;
        }
        if let Some(url) = lookup("CODEREV_BASE_URL") {
            self.model.base_url = url;
        }
        if let Some(dir) = lookup("CODEREV_PROMPTS_DIR") {
            self.prompts_dir = Some(PathBuf::from(dir));
        }
    }

    /// Template library honoring `prompts_dir`.
    pub fn prompt_library(&self) -> PromptLibrary {
        match &self.prompts_dir {
            Some(dir) => PromptLibrary::new().with_dir(dir),
            None => PromptLibrary::new(),
        }
    }
}
