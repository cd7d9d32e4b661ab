//! End-to-end runs of both pipelines against a scripted model.

use std::sync::Arc;

use coderev_graph::{END, GraphError, StageGraph};
use coderev_llm::{ModelError, ScriptedInvoker};
use coderev_pipeline::{
    CodeState, CodeUpdate, FileReview, PipelineError, ProjectFiles, ProjectReport,
    ProjectRequest, ProjectState, PromptStage, Reviewer, Vars,
};
use coderev_prompts::{PromptLibrary, TemplateError, builtin};
use pretty_assertions::assert_eq;

const ADD: &str = "def add(a,b): return a+b";

/// Templates that tag each prompt with its stage so the script can tell them
/// apart.
fn tagged_library() -> Arc<PromptLibrary> {
    Arc::new(
        PromptLibrary::new()
            .with_template(builtin::PARSER, "PARSE::{code}")
            .with_template(builtin::REVIEWER, "REVIEW::{code}")
            .with_template(builtin::REFACTOR, "REFACTOR::{code}||{review}")
            .with_template(builtin::TEST, "TEST::{code}")
            .with_template(builtin::PROJECT_REVIEW, "PROJECT_REVIEW::{project_files}")
            .with_template(builtin::PROJECT_EXPLAIN, "PROJECT_EXPLAIN::{project_files}")
            .with_template(builtin::INTERVIEW_QUESTIONS, "INTERVIEW::{project_files}"),
    )
}

fn file_script() -> ScriptedInvoker {
    ScriptedInvoker::new()
        .respond_when("PARSE::", "parsed summary")
        .respond_when("REVIEW::", "review notes")
        .respond_when("REFACTOR::", "def add(a, b):\n    return a + b\n")
        .respond_when("TEST::", "test suggestions")
}

fn project_script() -> ScriptedInvoker {
    ScriptedInvoker::new()
        .respond_when("PROJECT_REVIEW::", "project review")
        .respond_when("PROJECT_EXPLAIN::", "project explanation")
        .respond_when("INTERVIEW::", "interview questions")
}

fn reviewer(invoker: &Arc<ScriptedInvoker>) -> Reviewer {
    Reviewer::new(invoker.clone(), tagged_library()).unwrap()
}

fn raw_code_var(state: &CodeState) -> coderev_pipeline::Result<Vars> {
    Ok(vec![("code", state.raw_code.clone())])
}

fn sample_project() -> ProjectFiles {
    let mut files = ProjectFiles::new();
    files.insert("a.py".to_string(), "x=1".to_string());
    files
}

// ============================================================================
// Single-file pipeline
// ============================================================================

#[tokio::test]
async fn test_add_scenario_fills_every_field() {
    let invoker = Arc::new(file_script());
    let review = reviewer(&invoker)
        .run_single_file_pipeline(ADD, Some("python".to_string()))
        .await
        .unwrap();

    assert_eq!(
        review,
        FileReview {
            parsed_summary: "parsed summary".to_string(),
            review_code: "review notes".to_string(),
            refactored_code: "def add(a, b):\n    return a + b\n".to_string(),
            test_report: "test suggestions".to_string(),
        }
    );

    let refactor_prompt = invoker.prompt_containing("REFACTOR::").unwrap();
    assert!(refactor_prompt.contains(ADD));
}

#[tokio::test]
async fn test_refactor_prompt_has_code_and_review() {
    let invoker = Arc::new(file_script());
    reviewer(&invoker)
        .run_single_file_pipeline("fn main() { println!(\"{}\", 1); }", None)
        .await
        .unwrap();

    let prompt = invoker.prompt_containing("REFACTOR::").unwrap();
    assert_eq!(
        prompt,
        "REFACTOR::fn main() { println!(\"{}\", 1); }||review notes"
    );
}

#[tokio::test]
async fn test_test_prompt_sees_refactored_code_only() {
    let invoker = Arc::new(file_script());
    reviewer(&invoker)
        .run_single_file_pipeline(ADD, None)
        .await
        .unwrap();

    let prompt = invoker.prompt_containing("TEST::").unwrap();
    assert!(prompt.contains("return a + b"));
    assert!(!prompt.contains(ADD));
}

#[tokio::test]
async fn test_review_does_not_read_parse_output() {
    let invoker = Arc::new(file_script());
    reviewer(&invoker)
        .run_single_file_pipeline(ADD, None)
        .await
        .unwrap();

    let prompt = invoker.prompt_containing("REVIEW::").unwrap();
    assert_eq!(prompt, format!("REVIEW::{ADD}"));
}

#[tokio::test]
async fn test_stages_run_in_order_with_one_call_each() {
    let invoker = Arc::new(file_script());
    reviewer(&invoker)
        .run_single_file_pipeline(ADD, None)
        .await
        .unwrap();

    let tags: Vec<String> = invoker
        .prompts()
        .iter()
        .map(|prompt| prompt.split("::").next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(tags, ["PARSE", "REVIEW", "REFACTOR", "TEST"]);
}

#[tokio::test]
async fn test_review_file_keeps_inputs_and_approval() {
    let invoker = Arc::new(file_script());
    let mut state = CodeState::new(ADD, Some("python".to_string()));
    state.record_approval("YES");

    let state = reviewer(&invoker).review_file(state).await.unwrap();

    assert_eq!(state.raw_code, ADD);
    assert_eq!(state.language.as_deref(), Some("python"));
    assert_eq!(state.user_approval, Some(coderev_pipeline::Approval::Approved));
    assert_eq!(state.test_report.as_deref(), Some("test suggestions"));
}

#[tokio::test]
async fn test_model_timeout_aborts_run() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .respond_when("PARSE::", "parsed")
            .fail_when("REVIEW::", ModelError::Timeout { seconds: 30 })
            .with_fallback("unused"),
    );

    let err = reviewer(&invoker)
        .run_single_file_pipeline(ADD, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Model(ModelError::Timeout { seconds: 30 })
    ));
    assert_eq!(invoker.call_count(), 2);
}

#[tokio::test]
async fn test_model_unavailable_propagates_unchanged() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .respond_when("PARSE::", "p")
            .respond_when("REVIEW::", "r")
            .fail_when(
                "REFACTOR::",
                ModelError::Unavailable("connection refused".into()),
            ),
    );

    let err = reviewer(&invoker)
        .run_single_file_pipeline(ADD, None)
        .await
        .unwrap_err();

    match err {
        PipelineError::Model(ModelError::Unavailable(message)) => {
            assert_eq!(message, "connection refused");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(invoker.prompt_containing("TEST::").is_none());
}

#[tokio::test]
async fn test_missing_template_aborts_before_model_call() {
    let invoker = Arc::new(ScriptedInvoker::new().with_fallback("reply"));
    let prompts = Arc::new(PromptLibrary::new());

    let mut graph: StageGraph<CodeState, PipelineError> = StageGraph::new();
    graph
        .add_stage(
            "summarize",
            PromptStage::new(
                "no_such_template",
                invoker.clone(),
                prompts,
                raw_code_var,
                CodeUpdate::ParsedSummary,
            ),
        )
        .unwrap();
    graph.set_entry_point("summarize").unwrap();
    graph.add_edge("summarize", END).unwrap();

    let err = graph
        .compile()
        .unwrap()
        .invoke(CodeState::new(ADD, None))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Template(TemplateError::NotFound(ref name)) if name == "no_such_template"
    ));
    assert_eq!(invoker.call_count(), 0);
}

// ============================================================================
// Project pipeline
// ============================================================================

#[tokio::test]
async fn test_interview_scenario() {
    let invoker = Arc::new(project_script());
    let report = reviewer(&invoker)
        .run_project_pipeline(sample_project(), ProjectRequest::Interview)
        .await
        .unwrap();

    assert_eq!(
        report,
        ProjectReport::InterviewQuestions("interview questions".to_string())
    );
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        serde_json::json!({"interview_questions": "interview questions"})
    );
    assert_eq!(
        invoker.prompts(),
        ["INTERVIEW::===== FILE: a.py =====\nx=1\n\n"]
    );
}

#[tokio::test]
async fn test_each_request_fills_exactly_one_field() {
    for request in ProjectRequest::ALL {
        let invoker = Arc::new(project_script());
        let state = reviewer(&invoker)
            .run_project_state(ProjectState::new(sample_project(), request))
            .await
            .unwrap();

        assert_eq!(state.populated_outputs(), 1, "request {request}");
        assert_eq!(invoker.call_count(), 1, "request {request}");

        let report = ProjectReport::try_from(state).unwrap();
        assert_eq!(report.request(), request);
    }
}

#[tokio::test]
async fn test_project_files_flattened_in_order() {
    let invoker = Arc::new(project_script());
    let mut files = ProjectFiles::new();
    files.insert("src/main.rs".to_string(), "fn main() {}\n".to_string());
    files.insert("README.md".to_string(), "# demo".to_string());

    reviewer(&invoker)
        .run_project_pipeline(files, ProjectRequest::ProjectReview)
        .await
        .unwrap();

    let prompt = invoker.prompt_containing("PROJECT_REVIEW::").unwrap();
    let main_at = prompt.find("===== FILE: src/main.rs =====").unwrap();
    let readme_at = prompt.find("===== FILE: README.md =====").unwrap();
    assert!(main_at < readme_at);
}

#[tokio::test]
async fn test_unknown_request_is_unroutable() {
    let err = "CODE_GOLF".parse::<ProjectRequest>().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Graph(GraphError::UnroutableDecision { ref decision, .. })
            if decision == "CODE_GOLF"
    ));
}

#[tokio::test]
async fn test_project_model_failure_leaves_no_output() {
    let invoker = Arc::new(ScriptedInvoker::new().fail_when(
        "PROJECT_EXPLAIN::",
        ModelError::Timeout { seconds: 300 },
    ));
    let err = reviewer(&invoker)
        .run_project_pipeline(sample_project(), ProjectRequest::ProjectExplain)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Model(ModelError::Timeout { seconds: 300 })
    ));
}

#[tokio::test]
async fn test_pipelines_are_reusable() {
    let invoker = Arc::new(file_script());
    let reviewer = reviewer(&invoker);

    let first = reviewer.run_single_file_pipeline("a = 1", None).await.unwrap();
    let second = reviewer.run_single_file_pipeline("b = 2", None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(invoker.call_count(), 8);
    assert!(invoker.prompt_containing("REFACTOR::b = 2").is_some());
}

#[test]
fn test_execution_plans() {
    let invoker = Arc::new(ScriptedInvoker::new());
    let reviewer = reviewer(&invoker);

    assert_eq!(
        reviewer.single_file_pipeline().execution_plan(),
        "entry: parse\n\
         parse -> review\n\
         review -> refactor\n\
         refactor -> test\n\
         test -> __end__"
    );
    assert_eq!(
        reviewer.project_pipeline().execution_plan(),
        "entry: router\n\
         router -> {interview | project_explain | project_review}\n\
         project_review -> __end__\n\
         project_explain -> __end__\n\
         interview -> __end__"
    );
}
