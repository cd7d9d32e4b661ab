//! Single-file pipeline: parse → review → refactor → test.
//!
//! Parse and Review both read only `raw_code`. The parse summary is returned
//! to the caller but nothing downstream consumes it, so that model call is
//! dead computation as far as the other stages are concerned.

use std::sync::Arc;

use coderev_graph::{CompiledGraph, END, StageGraph};
use coderev_llm::ModelInvoker;
use coderev_prompts::{PromptLibrary, builtin};

use crate::error::{PipelineError, Result};
use crate::stage::{PromptStage, Vars};
use crate::state::{CodeState, CodeUpdate};

pub const PARSE: &str = "parse";
pub const REVIEW: &str = "review";
pub const REFACTOR: &str = "refactor";
pub const TEST: &str = "test";

/// Compiled single-file pipeline.
pub type SingleFilePipeline = CompiledGraph<CodeState, PipelineError>;

/// Stage graph for one source file.
pub fn build_single_file_graph(
    invoker: Arc<dyn ModelInvoker>,
    prompts: Arc<PromptLibrary>,
) -> Result<StageGraph<CodeState, PipelineError>> {
    let stage = |template: &'static str,
                 inputs: fn(&CodeState) -> Result<Vars>,
                 output: fn(String) -> CodeUpdate| {
        PromptStage::new(template, invoker.clone(), prompts.clone(), inputs, output)
    };

    let mut graph = StageGraph::new();
    graph.add_stage(
        PARSE,
        stage(builtin::PARSER, raw_code_only, CodeUpdate::ParsedSummary),
    )?;
    graph.add_stage(
        REVIEW,
        stage(builtin::REVIEWER, raw_code_only, CodeUpdate::ReviewCode),
    )?;
    graph.add_stage(
        REFACTOR,
        stage(builtin::REFACTOR, code_and_review, CodeUpdate::RefactoredCode),
    )?;
    graph.add_stage(
        TEST,
        stage(builtin::TEST, refactored_code, CodeUpdate::TestReport),
    )?;

    graph.set_entry_point(PARSE)?;
    graph.add_edge(PARSE, REVIEW)?;
    graph.add_edge(REVIEW, REFACTOR)?;
    graph.add_edge(REFACTOR, TEST)?;
    graph.add_edge(TEST, END)?;

    Ok(graph)
}

/// Build and compile the single-file pipeline.
pub fn single_file_pipeline(
    invoker: Arc<dyn ModelInvoker>,
    prompts: Arc<PromptLibrary>,
    max_steps: usize,
) -> Result<SingleFilePipeline> {
    let graph = build_single_file_graph(invoker, prompts)?.with_max_steps(max_steps);
    Ok(graph.compile()?)
}

fn raw_code_only(state: &CodeState) -> Result<Vars> {
    Ok(vec![("code", state.raw_code.clone())])
}

fn code_and_review(state: &CodeState) -> Result<Vars> {
    Ok(vec![
        ("code", state.raw_code.clone()),
        ("review", state.review()?.to_string()),
    ])
}

/// The test stage sees the refactored code, never the original.
fn refactored_code(state: &CodeState) -> Result<Vars> {
    Ok(vec![("code", state.refactored()?.to_string())])
}
