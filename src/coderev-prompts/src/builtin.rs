//! Built-in templates.

/// Structural summary of a single file. Variables: `code`.
pub const PARSER: &str = "parser";
/// Review of a single file. Variables: `code`.
pub const REVIEWER: &str = "reviewer";
/// Refactor guided by a review. Variables: `code`, `review`.
pub const REFACTOR: &str = "refactor";
/// Test suggestions. Variables: `code`.
pub const TEST: &str = "test";
/// Whole-project review. Variables: `project_files`.
pub const PROJECT_REVIEW: &str = "project_review";
/// Whole-project walkthrough. Variables: `project_files`.
pub const PROJECT_EXPLAIN: &str = "project_explain";
/// Interview questions about a project. Variables: `project_files`.
pub const INTERVIEW_QUESTIONS: &str = "interview_questions";

/// Every built-in template name.
pub const ALL: [&str; 7] = [
    PARSER,
    REVIEWER,
    REFACTOR,
    TEST,
    PROJECT_REVIEW,
    PROJECT_EXPLAIN,
    INTERVIEW_QUESTIONS,
];

/// Text of a built-in template.
pub fn get(name: &str) -> Option<&'static str> {
    let text = match name {
        PARSER => include_str!("templates/parser.txt"),
        REVIEWER => include_str!("templates/reviewer.txt"),
        REFACTOR => include_str!("templates/refactor.txt"),
        TEST => include_str!("templates/test.txt"),
        PROJECT_REVIEW => include_str!("templates/project_review.txt"),
        PROJECT_EXPLAIN => include_str!("templates/project_explain.txt"),
        INTERVIEW_QUESTIONS => include_str!("templates/interview_questions.txt"),
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitute;

    #[test]
    fn test_every_builtin_exists() {
        for name in ALL {
            assert!(get(name).is_some(), "missing built-in template {name}");
        }
        assert!(get("nope").is_none());
    }

    #[test]
    fn test_builtins_render_with_documented_variables() {
        let vars = [
            ("code", "fn main() {}"),
            ("review", "looks good"),
            ("project_files", "===== FILE: a.rs =====\nfn a() {}"),
        ];
        for name in ALL {
            let text = get(name).unwrap();
            let rendered = substitute(text, &vars)
                .unwrap_or_else(|var| panic!("{name} uses undocumented variable {var}"));
            assert!(!rendered.contains("{code}"));
        }
    }

    #[test]
    fn test_refactor_template_uses_code_and_review() {
        let text = get(REFACTOR).unwrap();
        assert!(text.contains("{code}"));
        assert!(text.contains("{review}"));
    }
}
