//! Pipeline state records and their partial updates.

use std::fmt;
use std::str::FromStr;

use coderev_graph::{GraphError, GraphState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Project files keyed by path, in the order they were collected.
pub type ProjectFiles = IndexMap<String, String>;

// ============================================================================
// Single file
// ============================================================================

/// State of a single-file review run.
///
/// `raw_code` and `language` are inputs. Every other field is written by
/// exactly one stage and stays `None` until that stage has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeState {
    pub raw_code: String,
    /// Descriptive tag only; no stage branches on it.
    pub language: Option<String>,
    pub parsed_summary: Option<String>,
    pub review_code: Option<String>,
    pub refactored_code: Option<String>,
    pub test_report: Option<String>,
    /// Written by the caller's approval step, never by a stage.
    pub user_approval: Option<Approval>,
}

impl CodeState {
    pub fn new(raw_code: impl Into<String>, language: Option<String>) -> Self {
        Self {
            raw_code: raw_code.into(),
            language,
            ..Default::default()
        }
    }

    pub(crate) fn review(&self) -> Result<&str> {
        required(&self.review_code, "review_code")
    }

    pub(crate) fn refactored(&self) -> Result<&str> {
        required(&self.refactored_code, "refactored_code")
    }

    /// Record the answer to "Approve refactored code?".
    pub fn record_approval(&mut self, answer: &str) -> Approval {
        let approval = Approval::from_answer(answer);
        self.user_approval = Some(approval);
        approval
    }
}

/// Field written by one single-file stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CodeUpdate {
    #[default]
    Nothing,
    ParsedSummary(String),
    ReviewCode(String),
    RefactoredCode(String),
    TestReport(String),
}

impl GraphState for CodeState {
    type Update = CodeUpdate;

    fn apply(&mut self, update: CodeUpdate) {
        match update {
            CodeUpdate::Nothing => {}
            CodeUpdate::ParsedSummary(text) => self.parsed_summary = Some(text),
            CodeUpdate::ReviewCode(text) => self.review_code = Some(text),
            CodeUpdate::RefactoredCode(text) => self.refactored_code = Some(text),
            CodeUpdate::TestReport(text) => self.test_report = Some(text),
        }
    }
}

/// Outcome of the approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approval {
    Approved,
    Rejected,
}

impl Approval {
    /// `yes`/`y` in any case approves, anything else rejects.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "yes" | "y" => Approval::Approved,
            _ => Approval::Rejected,
        }
    }
}

// ============================================================================
// Project
// ============================================================================

/// What to do with a whole project. Each request routes to exactly one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRequest {
    ProjectReview,
    ProjectExplain,
    Interview,
}

impl ProjectRequest {
    pub const ALL: [ProjectRequest; 3] = [
        ProjectRequest::ProjectReview,
        ProjectRequest::ProjectExplain,
        ProjectRequest::Interview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRequest::ProjectReview => "PROJECT_REVIEW",
            ProjectRequest::ProjectExplain => "PROJECT_EXPLAIN",
            ProjectRequest::Interview => "INTERVIEW",
        }
    }

    /// Stage that handles this request.
    pub fn stage_name(&self) -> &'static str {
        match self {
            ProjectRequest::ProjectReview => crate::project::PROJECT_REVIEW,
            ProjectRequest::ProjectExplain => crate::project::PROJECT_EXPLAIN,
            ProjectRequest::Interview => crate::project::INTERVIEW,
        }
    }
}

impl fmt::Display for ProjectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectRequest {
    type Err = PipelineError;

    /// Unknown values fail the same way an unrouted decision does.
    fn from_str(s: &str) -> Result<Self> {
        ProjectRequest::ALL
            .into_iter()
            .find(|request| request.as_str() == s)
            .ok_or_else(|| {
                GraphError::UnroutableDecision {
                    stage: crate::project::ROUTER.to_string(),
                    decision: s.to_string(),
                }
                .into()
            })
    }
}

/// State of a project run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    pub project_files: ProjectFiles,
    pub user_request: ProjectRequest,
    pub review_report: Option<String>,
    pub project_explanation: Option<String>,
    pub interview_questions: Option<String>,
}

impl ProjectState {
    pub fn new(project_files: ProjectFiles, user_request: ProjectRequest) -> Self {
        Self {
            project_files,
            user_request,
            review_report: None,
            project_explanation: None,
            interview_questions: None,
        }
    }

    /// Number of output fields that have been written.
    pub fn populated_outputs(&self) -> usize {
        [
            &self.review_report,
            &self.project_explanation,
            &self.interview_questions,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }
}

/// Field written by one project stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProjectUpdate {
    #[default]
    Nothing,
    ReviewReport(String),
    ProjectExplanation(String),
    InterviewQuestions(String),
}

impl GraphState for ProjectState {
    type Update = ProjectUpdate;

    fn apply(&mut self, update: ProjectUpdate) {
        match update {
            ProjectUpdate::Nothing => {}
            ProjectUpdate::ReviewReport(text) => self.review_report = Some(text),
            ProjectUpdate::ProjectExplanation(text) => self.project_explanation = Some(text),
            ProjectUpdate::InterviewQuestions(text) => self.interview_questions = Some(text),
        }
    }
}

/// Concatenate every file behind a delimiter line naming it.
pub fn flatten_project_files(files: &ProjectFiles) -> String {
    let mut out = String::new();
    for (path, content) in files {
        out.push_str("===== FILE: ");
        out.push_str(path);
        out.push_str(" =====\n");
        out.push_str(content);
        if !content.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub(crate) fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or(PipelineError::IncompleteState(field))
}
