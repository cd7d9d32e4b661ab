//! Entry points that run the compiled pipelines.

use std::sync::Arc;

use coderev_graph::DEFAULT_MAX_STEPS;
use coderev_llm::{ChatClient, ModelInvoker};
use coderev_prompts::{PromptLibrary, builtin};
use tracing::{info, instrument};

use crate::config::ReviewConfig;
use crate::error::Result;
use crate::project::{ProjectPipeline, project_pipeline};
use crate::report::{FileReview, ProjectReport};
use crate::single_file::{SingleFilePipeline, single_file_pipeline};
use crate::state::{CodeState, ProjectFiles, ProjectRequest, ProjectState};

/// Both pipelines, compiled once and reusable across runs.
pub struct Reviewer {
    single_file: SingleFilePipeline,
    project: ProjectPipeline,
}

impl Reviewer {
    pub fn new(invoker: Arc<dyn ModelInvoker>, prompts: Arc<PromptLibrary>) -> Result<Self> {
        Self::with_max_steps(invoker, prompts, DEFAULT_MAX_STEPS)
    }

    pub fn with_max_steps(
        invoker: Arc<dyn ModelInvoker>,
        prompts: Arc<PromptLibrary>,
        max_steps: usize,
    ) -> Result<Self> {
        Ok(Self {
            single_file: single_file_pipeline(invoker.clone(), prompts.clone(), max_steps)?,
            project: project_pipeline(invoker, prompts, max_steps)?,
        })
    }

    /// Reviewer talking to the configured chat endpoint.
    ///
    /// All templates are loaded up front so a bad override directory fails
    /// here rather than halfway through a run.
    pub fn from_config(config: &ReviewConfig) -> Result<Self> {
        let client = ChatClient::new(&config.model)?;
        let prompts = config.prompt_library();
        prompts.warm_up(builtin::ALL)?;
        info!(
            model = client.model(),
            base_url = client.base_url(),
            "reviewer ready"
        );
        Self::with_max_steps(Arc::new(client), Arc::new(prompts), config.max_steps)
    }

    pub fn single_file_pipeline(&self) -> &SingleFilePipeline {
        &self.single_file
    }

    pub fn project_pipeline(&self) -> &ProjectPipeline {
        &self.project
    }

    /// Run parse, review, refactor and test over one file.
    #[instrument(skip_all, fields(language = language.as_deref().unwrap_or("unknown")))]
    pub async fn run_single_file_pipeline(
        &self,
        raw_code: impl Into<String>,
        language: Option<String>,
    ) -> Result<FileReview> {
        let state = self.review_file(CodeState::new(raw_code, language)).await?;
        FileReview::try_from(&state)
    }

    /// Run the single-file pipeline and return the final state.
    pub async fn review_file(&self, state: CodeState) -> Result<CodeState> {
        self.single_file.invoke(state).await
    }

    /// Run one project request over a set of files.
    #[instrument(skip_all, fields(request = %request, files = files.len()))]
    pub async fn run_project_pipeline(
        &self,
        files: ProjectFiles,
        request: ProjectRequest,
    ) -> Result<ProjectReport> {
        let state = self
            .run_project_state(ProjectState::new(files, request))
            .await?;
        ProjectReport::try_from(state)
    }

    /// Run the project pipeline and return the final state.
    pub async fn run_project_state(&self, state: ProjectState) -> Result<ProjectState> {
        self.project.invoke(state).await
    }
}
