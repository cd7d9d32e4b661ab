//! Template lookup and cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::{Result, TemplateError, builtin, render};

/// Loads named templates and renders them.
///
/// The cache only ever grows and holds no per-request data, so a single
/// library can be shared between concurrent pipeline runs.
#[derive(Debug, Default)]
pub struct PromptLibrary {
    dir: Option<PathBuf>,
    overrides: HashMap<String, Arc<str>>,
    cache: RwLock<HashMap<String, Arc<str>>>,
}

impl PromptLibrary {
    /// Library backed by the built-in templates only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for `<dir>/<name>.txt` before falling back to built-ins.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Register an in-memory template that shadows files and built-ins.
    pub fn with_template(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        let text: String = text.into();
        self.overrides.insert(name.into(), Arc::from(text));
        self
    }

    /// Configured override directory.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Load a template by name.
    pub fn load(&self, name: &str) -> Result<Arc<str>> {
        if let Some(text) = self.overrides.get(name) {
            return Ok(Arc::clone(text));
        }
        if let Some(text) = self.cache.read().get(name) {
            return Ok(Arc::clone(text));
        }

        let text = self.read_uncached(name)?;
        let mut cache = self.cache.write();
        let entry = cache
            .entry(name.to_string())
            .or_insert_with(|| Arc::clone(&text));
        Ok(Arc::clone(entry))
    }

    /// Load every named template up front so later lookups only read the cache.
    pub fn warm_up<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for name in names {
            self.load(name)?;
        }
        Ok(())
    }

    /// Load `name` and substitute `vars` into it.
    pub fn render(&self, name: &str, vars: &[(&str, &str)]) -> Result<String> {
        let template = self.load(name)?;
        render::substitute(&template, vars).map_err(|variable| TemplateError::MissingVariable {
            template: name.to_string(),
            variable: variable.to_string(),
        })
    }

    fn read_uncached(&self, name: &str) -> Result<Arc<str>> {
        if !is_valid_name(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{name}.txt"));
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    debug!(template = name, path = %path.display(), "loaded template from disk");
                    return Ok(Arc::from(text));
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(TemplateError::Io {
                        name: name.to_string(),
                        source,
                    });
                }
            }
        }

        builtin::get(name)
            .map(Arc::from)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }
}

/// Template names map to file names, so keep them to a safe alphabet.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_fallback() {
        let library = PromptLibrary::new();
        let text = library.load(builtin::REVIEWER).unwrap();
        assert!(text.contains("{code}"));
    }

    #[test]
    fn test_unknown_template_not_found() {
        let library = PromptLibrary::new();
        assert!(matches!(
            library.load("does_not_exist"),
            Err(TemplateError::NotFound(name)) if name == "does_not_exist"
        ));
    }

    #[test]
    fn test_path_like_names_rejected() {
        let library = PromptLibrary::new();
        assert!(matches!(
            library.load("../secrets"),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_directory_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("reviewer.txt"), "CUSTOM {code}").unwrap();

        let library = PromptLibrary::new().with_dir(dir.path());
        assert_eq!(
            library.render("reviewer", &[("code", "x = 1")]).unwrap(),
            "CUSTOM x = 1"
        );
        // Templates missing from the directory still come from the built-ins.
        assert!(library.load(builtin::TEST).is_ok());
    }

    #[test]
    fn test_templates_are_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.txt");
        std::fs::write(&path, "v1").unwrap();

        let library = PromptLibrary::new().with_dir(dir.path());
        library.warm_up(["custom"]).unwrap();
        std::fs::write(&path, "v2").unwrap();

        assert_eq!(&*library.load("custom").unwrap(), "v1");
    }

    #[test]
    fn test_in_memory_template_wins() {
        let library = PromptLibrary::new().with_template("reviewer", "MEM {code}");
        assert_eq!(
            library.render("reviewer", &[("code", "y")]).unwrap(),
            "MEM y"
        );
    }

    #[test]
    fn test_render_reports_missing_variable() {
        let library = PromptLibrary::new();
        match library.render(builtin::REFACTOR, &[("code", "x")]) {
            Err(TemplateError::MissingVariable { template, variable }) => {
                assert_eq!(template, "refactor");
                assert_eq!(variable, "review");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
