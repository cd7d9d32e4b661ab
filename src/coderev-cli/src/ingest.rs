//! Reading source files from disk.

use std::path::Path;

use anyhow::{Context, Result, bail};
use coderev_pipeline::ProjectFiles;
use ignore::WalkBuilder;
use tracing::{debug, warn};

/// Files larger than this are left out of a project.
pub const MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Read one file, replacing invalid UTF-8.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Collect every file under `root`, honoring `.gitignore`.
///
/// Keys are paths relative to `root` with `/` separators, sorted so runs are
/// repeatable.
pub fn collect_project(root: &Path) -> Result<ProjectFiles> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut entries = Vec::new();
    for entry in WalkBuilder::new(root).hidden(true).build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size > MAX_FILE_BYTES {
            debug!(path = %path.display(), size, "skipping large file");
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push((key, read_source(path)?));
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    debug!(root = %root.display(), files = entries.len(), "collected project");
    Ok(entries.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_source_is_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, b"ok \xff end").unwrap();

        assert_eq!(read_source(&path).unwrap(), "ok \u{fffd} end");
    }

    #[test]
    fn test_collect_project_relative_sorted_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("README.md"), "# demo").unwrap();

        let files = collect_project(dir.path()).unwrap();
        let keys: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(keys, ["README.md", "src/main.rs"]);
        assert_eq!(files["src/main.rs"], "fn main() {}");
    }

    #[test]
    fn test_collect_project_skips_large_and_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("small.py"), "x = 1").unwrap();
        std::fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        let big = vec![b'a'; (MAX_FILE_BYTES + 1) as usize];
        std::fs::write(dir.path().join("big.txt"), big).unwrap();

        let files = collect_project(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.contains_key("small.py"));
    }

    #[test]
    fn test_collect_project_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.py");
        std::fs::write(&path, "x").unwrap();

        assert!(collect_project(&path).is_err());
    }
}
