//! Rendering results for the terminal.

use std::io::{BufRead, Write};

use anyhow::Result;
use coderev_pipeline::{FileReview, ProjectReport};
use similar::{ChangeTag, TextDiff};

pub const APPROVAL_PROMPT: &str = "Approve refactored code? (yes/no): ";

pub fn file_review_text(review: &FileReview) -> String {
    [
        ("Parsed Summary", review.parsed_summary.as_str()),
        ("Review", review.review_code.as_str()),
        ("Refactored Code", review.refactored_code.as_str()),
        ("Test Suggestions", review.test_report.as_str()),
    ]
    .iter()
    .map(|(title, body)| section(title, body))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn project_report_text(report: &ProjectReport) -> String {
    let title = match report {
        ProjectReport::Review(_) => "Project Review",
        ProjectReport::Explanation(_) => "Project Explanation",
        ProjectReport::InterviewQuestions(_) => "Interview Questions",
    };
    section(title, report.text())
}

fn section(title: &str, body: &str) -> String {
    let rule = "=".repeat(title.len());
    format!("{title}\n{rule}\n{}\n", body.trim_end())
}

/// Unified diff of the original file against the refactored one.
pub fn unified_diff(original: &str, refactored: &str, name: &str) -> String {
    TextDiff::from_lines(original, refactored)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .to_string()
}

/// Number of inserted and deleted lines.
pub fn diff_stats(original: &str, refactored: &str) -> (usize, usize) {
    TextDiff::from_lines(original, refactored)
        .iter_all_changes()
        .fold((0, 0), |(ins, del), change| match change.tag() {
            ChangeTag::Insert => (ins + 1, del),
            ChangeTag::Delete => (ins, del + 1),
            ChangeTag::Equal => (ins, del),
        })
}

/// Ask the approval question on `output` and read one line from `input`.
pub fn ask_approval(mut input: impl BufRead, mut output: impl Write) -> Result<String> {
    write!(output, "{APPROVAL_PROMPT}")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}
