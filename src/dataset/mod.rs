// src/dataset/mod.rs

//! Benchmark scenarios.
//!
//! The dataset is a tab-separated file (`total_list.txt`), one scenario per
//! line:
//!
//! ```text
//! repo url <TAB> project name <TAB> merge sha <TAB> left sha <TAB> right sha <TAB> base sha <TAB> conflicting file
//! ```
//!
//! - [`loader`] parses the file into [`Scenario`]s.
//! - [`rename`] works out whether the merge commit renamed the conflicting
//!   file, by asking `git` through the process runner.

pub mod loader;
pub mod rename;

use std::sync::OnceLock;

pub use loader::{load_dataset, parse_dataset};
pub use rename::{parse_renames, resolve_merged_file};

/// One benchmark entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub repo_url: String,
    /// Local repository directory name under the workspace.
    pub repo_name: String,
    /// The merge ("child") commit whose version of the file is the ground truth.
    pub merge_commit: String,
    pub left_commit: String,
    pub right_commit: String,
    pub base_commit: String,
    /// Repository-relative path of the file that conflicted.
    pub conflicting_file: String,
    merged_file: OnceLock<String>,
}

impl Scenario {
    pub fn new(
        repo_url: impl Into<String>,
        repo_name: impl Into<String>,
        merge_commit: impl Into<String>,
        left_commit: impl Into<String>,
        right_commit: impl Into<String>,
        base_commit: impl Into<String>,
        conflicting_file: impl Into<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            repo_name: repo_name.into(),
            merge_commit: merge_commit.into(),
            left_commit: left_commit.into(),
            right_commit: right_commit.into(),
            base_commit: base_commit.into(),
            conflicting_file: conflicting_file.into(),
            merged_file: OnceLock::new(),
        }
    }

    /// Path of the file in the merge commit, once resolved.
    ///
    /// Usually the same as the conflicting file, but whoever resolved the
    /// conflict may have renamed it. See [`resolve_merged_file`].
    pub fn merged_file(&self) -> Option<&str> {
        self.merged_file.get().map(String::as_str)
    }

    /// File name of the conflicting file, for log lines.
    pub fn conflicting_file_name(&self) -> &str {
        self.conflicting_file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.conflicting_file)
    }

    pub fn is_java(&self) -> bool {
        self.conflicting_file.ends_with(".java")
    }

    pub(crate) fn cache_merged_file(&self, path: String) -> &str {
        self.merged_file.get_or_init(|| path)
    }
}
