//! Project pipeline: a router dispatching to exactly one of review, explain
//! or interview.

use std::sync::Arc;

use coderev_graph::{CompiledGraph, END, FnStage, StageGraph};
use coderev_llm::ModelInvoker;
use coderev_prompts::{PromptLibrary, builtin};

use crate::error::{PipelineError, Result};
use crate::stage::{PromptStage, Vars};
use crate::state::{ProjectRequest, ProjectState, ProjectUpdate, flatten_project_files};

pub const ROUTER: &str = "router";
pub const PROJECT_REVIEW: &str = "project_review";
pub const PROJECT_EXPLAIN: &str = "project_explain";
pub const INTERVIEW: &str = "interview";

/// Compiled project pipeline.
pub type ProjectPipeline = CompiledGraph<ProjectState, PipelineError>;

/// Stage graph for a whole project.
///
/// The routing table is built from [`ProjectRequest::ALL`] and
/// [`ProjectRequest::stage_name`], so every request kind has a route.
pub fn build_project_graph(
    invoker: Arc<dyn ModelInvoker>,
    prompts: Arc<PromptLibrary>,
) -> Result<StageGraph<ProjectState, PipelineError>> {
    let stage = |template: &'static str, output: fn(String) -> ProjectUpdate| {
        PromptStage::new(
            template,
            invoker.clone(),
            prompts.clone(),
            project_files,
            output,
        )
    };

    let mut graph = StageGraph::new();
    graph.add_stage(
        ROUTER,
        FnStage::new(|_: &ProjectState| Ok(ProjectUpdate::Nothing)),
    )?;
    graph.add_stage(
        PROJECT_REVIEW,
        stage(builtin::PROJECT_REVIEW, ProjectUpdate::ReviewReport),
    )?;
    graph.add_stage(
        PROJECT_EXPLAIN,
        stage(builtin::PROJECT_EXPLAIN, ProjectUpdate::ProjectExplanation),
    )?;
    graph.add_stage(
        INTERVIEW,
        stage(builtin::INTERVIEW_QUESTIONS, ProjectUpdate::InterviewQuestions),
    )?;

    graph.set_entry_point(ROUTER)?;
    graph.add_conditional_edge(
        ROUTER,
        |state: &ProjectState| state.user_request,
        ProjectRequest::ALL.map(|request| (request, request.stage_name())),
    )?;
    for request in ProjectRequest::ALL {
        graph.add_edge(request.stage_name(), END)?;
    }

    Ok(graph)
}

/// Build and compile the project pipeline.
pub fn project_pipeline(
    invoker: Arc<dyn ModelInvoker>,
    prompts: Arc<PromptLibrary>,
    max_steps: usize,
) -> Result<ProjectPipeline> {
    let graph = build_project_graph(invoker, prompts)?.with_max_steps(max_steps);
    Ok(graph.compile()?)
}

fn project_files(state: &ProjectState) -> Result<Vars> {
    Ok(vec![(
        "project_files",
        flatten_project_files(&state.project_files),
    )])
}
