//! Review pipelines for coderev.
//!
//! Two fixed stage graphs are built on [`coderev_graph`]:
//!
//! - the single-file pipeline, `parse → review → refactor → test`, over a
//!   [`CodeState`];
//! - the project pipeline, a router that dispatches a [`ProjectState`] to
//!   exactly one of review, explain or interview.
//!
//! Every model-backed stage is a [`PromptStage`]: render a template from
//! [`coderev_prompts`], send it through a [`coderev_llm::ModelInvoker`], and
//! write the reply into one state field. [`Reviewer`] compiles both graphs
//! once and runs them.

pub mod config;
pub mod error;
pub mod project;
pub mod report;
pub mod reviewer;
pub mod single_file;
pub mod stage;
pub mod state;

pub use config::ReviewConfig;
pub use error::{PipelineError, Result};
pub use project::{ProjectPipeline, build_project_graph, project_pipeline};
pub use report::{FileReview, ProjectReport};
pub use reviewer::Reviewer;
pub use single_file::{SingleFilePipeline, build_single_file_graph, single_file_pipeline};
pub use stage::{PromptStage, Vars};
pub use state::{
    Approval, CodeState, CodeUpdate, ProjectFiles, ProjectRequest, ProjectState, ProjectUpdate,
    flatten_project_files,
};
