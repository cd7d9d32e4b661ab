//! Results handed back to callers.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::state::{CodeState, ProjectRequest, ProjectState, required};

/// Everything a single-file run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReview {
    pub parsed_summary: String,
    pub review_code: String,
    pub refactored_code: String,
    pub test_report: String,
}

impl TryFrom<&CodeState> for FileReview {
    type Error = PipelineError;

    fn try_from(state: &CodeState) -> Result<Self> {
        Ok(Self {
            parsed_summary: required(&state.parsed_summary, "parsed_summary")?.to_string(),
            review_code: required(&state.review_code, "review_code")?.to_string(),
            refactored_code: required(&state.refactored_code, "refactored_code")?.to_string(),
            test_report: required(&state.test_report, "test_report")?.to_string(),
        })
    }
}

/// The single output of a project run.
///
/// Serializes as a one-key object named after the field that was populated,
/// e.g. `{"interview_questions": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectReport {
    #[serde(rename = "review_report")]
    Review(String),
    #[serde(rename = "project_explanation")]
    Explanation(String),
    #[serde(rename = "interview_questions")]
    InterviewQuestions(String),
}

impl ProjectReport {
    pub fn request(&self) -> ProjectRequest {
        match self {
            ProjectReport::Review(_) => ProjectRequest::ProjectReview,
            ProjectReport::Explanation(_) => ProjectRequest::ProjectExplain,
            ProjectReport::InterviewQuestions(_) => ProjectRequest::Interview,
        }
    }

    /// Name of the state field this report came from.
    pub fn field_name(&self) -> &'static str {
        match self {
            ProjectReport::Review(_) => "review_report",
            ProjectReport::Explanation(_) => "project_explanation",
            ProjectReport::InterviewQuestions(_) => "interview_questions",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ProjectReport::Review(text)
            | ProjectReport::Explanation(text)
            | ProjectReport::InterviewQuestions(text) => text,
        }
    }
}

impl TryFrom<ProjectState> for ProjectReport {
    type Error = PipelineError;

    fn try_from(state: ProjectState) -> Result<Self> {
        match state.user_request {
            ProjectRequest::ProjectReview => state
                .review_report
                .map(ProjectReport::Review)
                .ok_or(PipelineError::IncompleteState("review_report")),
            ProjectRequest::ProjectExplain => state
                .project_explanation
                .map(ProjectReport::Explanation)
                .ok_or(PipelineError::IncompleteState("project_explanation")),
            ProjectRequest::Interview => state
                .interview_questions
                .map(ProjectReport::InterviewQuestions)
                .ok_or(PipelineError::IncompleteState("interview_questions")),
        }
    }
}
