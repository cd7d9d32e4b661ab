//! Prompt templates for coderev.
//!
//! Templates are plain text with `{name}` placeholders. `{{` and `}}` produce
//! literal braces. Substitution is a single pass over the template, so braces
//! inside substituted source code are never interpreted.
//!
//! Lookup order for a template name:
//! 1. templates registered in memory with [`PromptLibrary::with_template`]
//! 2. `<dir>/<name>.txt` when a directory is configured
//! 3. the built-in templates in [`builtin`]
//!
//! Loaded templates are cached for the life of the [`PromptLibrary`].
//!
//! ```rust
//! use coderev_prompts::PromptLibrary;
//!
//! let library = PromptLibrary::new().with_template("greet", "Hello {who}, {{ok}}");
//! let text = library.render("greet", &[("who", "world")]).unwrap();
//! assert_eq!(text, "Hello world, {ok}");
//! ```

pub mod builtin;
mod library;
mod render;

pub use library::PromptLibrary;
pub use render::substitute;

use thiserror::Error;

/// Errors that can occur while loading or rendering templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template '{template}' references unknown variable '{variable}'")]
    MissingVariable { template: String, variable: String },

    #[error("Failed to read template '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
