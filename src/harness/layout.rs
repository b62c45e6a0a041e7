// src/harness/layout.rs

use std::path::{Path, PathBuf};

use crate::dataset::Scenario;
use crate::errors::{MergeBenchError, Result};
use crate::tools::{MergerKind, Worktrees};

/// Where everything lives on disk.
///
/// ```text
/// <prefix>/<workspace>/<repo>                  main clone
/// <prefix>/<workspace>/<repo>-{base,left,...}  worktrees
/// <prefix>/<workspace>/result/<Tool>/<repo>    tool output
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    prefix: PathBuf,
    workspace: PathBuf,
}

impl WorkspaceLayout {
    /// `workspace` is joined onto `prefix` unless it is absolute.
    pub fn new(prefix: impl Into<PathBuf>, workspace: impl AsRef<Path>) -> Self {
        let prefix = prefix.into();
        let workspace = prefix.join(workspace);
        Self { prefix, workspace }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn result_root(&self) -> PathBuf {
        self.workspace.join("result")
    }

    /// `result/<tool>`; `tool` is the kind name (or any name for compare).
    pub fn tool_result_dir(&self, tool: &str) -> PathBuf {
        self.result_root().join(tool)
    }

    pub fn output_dir(&self, tool: &str, repo: &str) -> PathBuf {
        self.tool_result_dir(tool).join(repo)
    }

    pub fn repo_dir(&self, repo: &str) -> PathBuf {
        self.workspace.join(repo)
    }

    pub fn worktrees(&self, repo: &str) -> Worktrees {
        let dir = |suffix: &str| self.workspace.join(format!("{repo}-{suffix}"));
        Worktrees {
            base: dir("base"),
            left: dir("left"),
            right: dir("right"),
            child: dir("child"),
        }
    }
}

/// Supplies the base/left/right/child checkouts for a scenario.
pub trait WorktreeProvider: Send + Sync {
    fn worktrees(&self, layout: &WorkspaceLayout, scenario: &Scenario, kind: MergerKind) -> Result<Worktrees>;
}

/// Uses checkouts prepared ahead of time next to the main clone.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrebuiltWorktrees;

impl WorktreeProvider for PrebuiltWorktrees {
    fn worktrees(&self, layout: &WorkspaceLayout, scenario: &Scenario, _kind: MergerKind) -> Result<Worktrees> {
        let trees = layout.worktrees(&scenario.repo_name);
        for (what, dir) in [
            ("base worktree", &trees.base),
            ("left worktree", &trees.left),
            ("right worktree", &trees.right),
            ("child worktree", &trees.child),
        ] {
            if !dir.is_dir() {
                return Err(MergeBenchError::MissingInput {
                    what: what.to_string(),
                    path: dir.clone(),
                });
            }
        }
        Ok(trees)
    }
}
