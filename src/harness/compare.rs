// src/harness/compare.rs

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::dataset::{resolve_merged_file, Scenario};
use crate::exec::{CommandSpec, ProcessBackend, ProcessError, RunOptions};
use crate::harness::layout::WorkspaceLayout;
use crate::types::EvaluationRange;

/// Size of the textual diff between a tool's output and the real merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiffSize {
    /// Characters of `git diff` output; 0 means identical.
    Chars(usize),
    /// Nothing to compare, or the comparison failed.
    Unavailable,
}

impl DiffSize {
    pub fn chars(self) -> Option<usize> {
        match self {
            DiffSize::Chars(n) => Some(n),
            DiffSize::Unavailable => None,
        }
    }
}

impl fmt::Display for DiffSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffSize::Chars(n) => write!(f, "{n}"),
            DiffSize::Unavailable => f.write_str("-"),
        }
    }
}

/// One line of the comparison report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRow {
    pub repo: String,
    pub conflicting_file: String,
    pub diff: DiffSize,
}

/// Compares `result/<merger>/<repo>/<file>` against the merge commit's
/// version in `<repo>/<file>`.
pub struct Comparator<B: ProcessBackend> {
    backend: B,
    layout: WorkspaceLayout,
    merger: String,
    diff_timeout: Duration,
    git_timeout: Duration,
}

impl<B: ProcessBackend> fmt::Debug for Comparator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator")
            .field("merger", &self.merger)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Comparator<B> {
    /// `merger` is the result directory name, e.g. `IntelliMerge`.
    pub fn new(
        backend: B,
        layout: WorkspaceLayout,
        merger: impl Into<String>,
        diff_timeout: Duration,
        git_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            layout,
            merger: merger.into(),
            diff_timeout,
            git_timeout,
        }
    }

    pub async fn compare(&self, scenarios: &[Scenario], range: &EvaluationRange) -> Vec<CompareRow> {
        let mut rows = Vec::new();
        for index in range.resolve(scenarios.len()) {
            let scenario = &scenarios[index];
            info!("Start verifying project {index} {}", scenario.repo_name);
            rows.push(self.compare_one(scenario).await);
        }
        rows
    }

    pub async fn compare_one(&self, scenario: &Scenario) -> CompareRow {
        let repo = &scenario.repo_name;
        let repo_dir = self.layout.repo_dir(repo);
        let merged_file = resolve_merged_file(&self.backend, scenario, &repo_dir, self.git_timeout).await;

        let expected = repo_dir.join(merged_file);
        let actual = self.layout.output_dir(&self.merger, repo).join(merged_file);

        let diff = if !expected.exists() {
            warn!(
                "File {} doesn't exist. The file may be deleted in the merge commit.",
                expected.display()
            );
            if actual.exists() {
                info!("Merged file exists at {}.", actual.display());
            } else {
                info!("Fully matched");
            }
            DiffSize::Unavailable
        } else if !actual.exists() {
            info!("File name error: File {} doesn't exist", actual.display());
            DiffSize::Unavailable
        } else {
            self.diff(&actual, &expected).await
        };

        CompareRow {
            repo: repo.clone(),
            conflicting_file: scenario.conflicting_file.clone(),
            diff,
        }
    }

    async fn diff(&self, actual: &Path, expected: &Path) -> DiffSize {
        let spec = CommandSpec::new("git")
            .args([
                "diff",
                "--exit-code",
                "--no-index",
                "--ignore-blank-lines",
                "--ignore-all-space",
                "--",
            ])
            .arg(actual)
            .arg(expected);
        let options = RunOptions::new(self.diff_timeout).text();

        match self.backend.run(&spec, &options).await {
            Ok(_) => {
                info!("Fully matched");
                DiffSize::Chars(0)
            }
            Err(ProcessError::Failure(failure)) if failure.exit_code == Some(1) => {
                let size = String::from_utf8_lossy(&failure.stdout).chars().count();
                info!(
                    "Merged file does not fully match actual file. Diff size is {size}. Command is {}",
                    spec.display()
                );
                DiffSize::Chars(size)
            }
            Err(e) => {
                error!("{e}");
                DiffSize::Unavailable
            }
        }
    }
}
