//! [`TestProject`] builder for rulesmith test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Rule template text with a metadata header.
pub fn rule_source(description: &str, body: &str) -> String {
    format!("---\ndescription: {}\n---\n{}", description, body)
}

/// A temporary directory laid out as one rulesmith project:
///
/// ```text
/// <tmp>/project/            project scope root
/// <tmp>/project/rules/      local origin root
/// <tmp>/vendors/<name>/     vendor origin roots
/// <tmp>/home/               global scope root
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use rulesmith_test_utils::{TestProject, rule_source};
///
/// let project = TestProject::new();
/// project.write_local("review.tmpl", &rule_source("Review code", "Be kind."));
/// project.write_vendor("acme", "review.tmpl", "ACME review");
/// project.assert_file_exists("rules/review.tmpl");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["project/rules", "vendors", "home"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        Self { temp_dir }
    }

    /// The temporary directory itself.
    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Project scope root.
    pub fn root(&self) -> PathBuf {
        self.base().join("project")
    }

    /// Local origin root.
    pub fn local_root(&self) -> PathBuf {
        self.root().join("rules")
    }

    pub fn vendor_root(&self, vendor: &str) -> PathBuf {
        self.base().join("vendors").join(vendor)
    }

    /// Global scope root.
    pub fn home(&self) -> PathBuf {
        self.base().join("home")
    }

    pub fn write_local(&self, relative: &str, content: &str) -> PathBuf {
        write(&self.local_root().join(relative), content)
    }

    pub fn write_vendor(&self, vendor: &str, relative: &str, content: &str) -> PathBuf {
        write(&self.vendor_root(vendor).join(relative), content)
    }

    /// Write a file relative to the project root.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        write(&self.root().join(relative), content)
    }

    /// Read a file relative to the project root.
    pub fn read(&self, relative: &str) -> String {
        let path = self.root().join(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Remove a file relative to the project root.
    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.root().join(relative)).unwrap();
    }

    /// Files directly inside `dir` (relative to the project root) whose
    /// name starts with `prefix`.
    pub fn files_with_prefix(&self, dir: &str, prefix: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.root().join(dir)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    /// Assert that `path` (relative to the project root) exists.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the project root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain {:?}.\nActual content:\n{}",
            path,
            content,
            file_content
        );
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
