use coderev_graph::GraphError;
use coderev_llm::ModelError;
use coderev_prompts::TemplateError;
use thiserror::Error;

/// Errors surfaced by pipeline runs.
///
/// Graph, template and model errors are wrapped transparently so callers can
/// match on the original failure.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("State field '{0}' has not been written")]
    IncompleteState(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn config<E: std::fmt::Display>(e: E) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
