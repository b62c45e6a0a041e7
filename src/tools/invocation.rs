// src/tools/invocation.rs

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{MergeBenchError, Result};
use crate::exec::{CommandSpec, RunOptions};
use crate::tools::MergerKind;

/// The base/left/right/child checkouts of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktrees {
    pub base: PathBuf,
    pub left: PathBuf,
    pub right: PathBuf,
    pub child: PathBuf,
}

/// Everything a tool adapter needs to know about one scenario.
#[derive(Debug, Clone)]
pub struct MergeInputs {
    /// Executable or jar the user pointed at.
    pub tool: PathBuf,
    /// `java` launcher for jar-based tools.
    pub java: String,
    pub workspace: PathBuf,
    pub repo_name: String,
    /// Main clone of the repository.
    pub repo_dir: PathBuf,
    /// `None` for tools that work on the repository directly.
    pub worktrees: Option<Worktrees>,
    /// `<workspace>/result/<Tool>`.
    pub tool_result_dir: PathBuf,
    /// `<workspace>/result/<Tool>/<repo>`.
    pub output_dir: PathBuf,
    pub conflicting_file: String,
    /// Path of the file in the merge commit (after rename detection).
    pub merged_file: String,
    pub base_commit: String,
    pub left_commit: String,
    pub right_commit: String,
}

impl MergeInputs {
    fn worktrees(&self, kind: MergerKind) -> Result<&Worktrees> {
        self.worktrees.as_ref().ok_or_else(|| MergeBenchError::MissingInput {
            what: format!("{kind} worktrees"),
            path: self.workspace.join(format!("{}-base", self.repo_name)),
        })
    }
}

/// Filesystem work that must happen before the command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStep {
    CreateDir(PathBuf),
    /// Written only if `path` does not exist yet.
    WriteIfMissing { path: PathBuf, contents: String },
    /// The scenario is skipped when this file is absent.
    RequireFile(PathBuf),
}

/// A fully described run of one merge tool on one scenario.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub kind: MergerKind,
    pub command: CommandSpec,
    pub options: RunOptions,
    pub setup: Vec<SetupStep>,
    /// Directory inspected afterwards for freshly written files.
    pub output_dir: PathBuf,
}

impl ToolInvocation {
    /// Perform the setup steps.
    ///
    /// A missing required file yields [`MergeBenchError::UnsupportedScenario`].
    pub fn prepare(&self) -> Result<()> {
        for step in &self.setup {
            match step {
                SetupStep::CreateDir(dir) => fs::create_dir_all(dir)?,
                SetupStep::WriteIfMissing { path, contents } => {
                    if !path.exists() {
                        debug!(path = %path.display(), "writing tool input");
                        fs::write(path, contents)?;
                    }
                }
                SetupStep::RequireFile(path) => {
                    if !path.is_file() {
                        return Err(MergeBenchError::UnsupportedScenario {
                            tool: self.kind.name().to_string(),
                            message: format!(
                                "{} can't deal with file renaming. Missing {}",
                                self.kind.name().to_lowercase(),
                                path.display()
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Hint for the first abort signature found in `stderr`.
    pub fn abort_reason(&self, stderr: &str) -> Option<&'static str> {
        self.kind
            .abort_signatures()
            .iter()
            .find(|(signature, _)| stderr.contains(signature))
            .map(|(_, hint)| *hint)
    }
}

/// Describe how `kind` runs on `inputs`.
///
/// Pure: nothing touches the filesystem until [`ToolInvocation::prepare`].
pub fn build_invocation(
    kind: MergerKind,
    inputs: &MergeInputs,
    config: &ConfigFile,
) -> Result<ToolInvocation> {
    let options = RunOptions::new(config.resolve_timeout(kind))
        .with_fatal_signatures(config.fatal_signatures(kind));
    let mut setup = vec![SetupStep::CreateDir(inputs.output_dir.clone())];

    let command = match kind {
        MergerKind::JDime => {
            let trees = inputs.worktrees(kind)?;
            CommandSpec::new(&inputs.tool)
                .args(["-f", "--mode", config.jdime_mode().as_arg(), "--output"])
                .arg(&inputs.output_dir)
                .args([&trees.left, &trees.base, &trees.right])
        }
        MergerKind::FstMerge => {
            inputs.worktrees(kind)?;
            let repo = &inputs.repo_name;
            let expression = inputs.tool_result_dir.join(format!("{repo}.config"));
            setup.push(SetupStep::CreateDir(inputs.tool_result_dir.clone()));
            setup.push(SetupStep::WriteIfMissing {
                path: expression.clone(),
                contents: format!("{repo}-left\n{repo}-base\n{repo}-right"),
            });
            CommandSpec::new(&inputs.java)
                .arg("-cp")
                .arg(&inputs.tool)
                .arg("merger.FSTGenMerger")
                .arg("--expression")
                .arg(expression)
                .arg("--output-directory")
                .arg(&inputs.tool_result_dir)
                .arg("--base-directory")
                .arg(&inputs.workspace)
                .cwd(&inputs.tool_result_dir)
        }
        MergerKind::IntelliMerge => {
            let trees = inputs.worktrees(kind)?;
            CommandSpec::new(&inputs.java)
                .arg("-jar")
                .arg(&inputs.tool)
                .arg("-d")
                .args([&trees.left, &trees.base, &trees.right])
                .arg("-o")
                .arg(&inputs.output_dir)
        }
        MergerKind::AutoMerge => {
            let trees = inputs.worktrees(kind)?;
            let mut spec = CommandSpec::new(&inputs.java)
                .arg("-jar")
                .arg(&inputs.tool)
                .arg("-o")
                .arg(&inputs.output_dir)
                .args(["-m", "structured", "-log", "info", "-f", "-S"])
                .args([&trees.left, &trees.base, &trees.right]);
            // AutoMerge resolves its bundled resources relative to the cwd.
            if let Some(dir) = inputs.tool.parent().filter(|d| !d.as_os_str().is_empty()) {
                spec = spec.cwd(dir);
            }
            spec
        }
        MergerKind::KDiff3 | MergerKind::Wiggle => {
            let trees = inputs.worktrees(kind)?;
            let file = Path::new(&inputs.conflicting_file);
            let base = trees.base.join(file);
            let left = trees.left.join(file);
            let right = trees.right.join(file);
            let out = inputs.output_dir.join(file);
            if let Some(parent) = out.parent() {
                setup.push(SetupStep::CreateDir(parent.to_path_buf()));
            }

            if kind == MergerKind::KDiff3 {
                CommandSpec::new(&inputs.tool)
                    .args([base, left, right])
                    .arg("-o")
                    .arg(out)
                    .arg("--auto")
            } else {
                setup.extend([&base, &left, &right].map(|p| SetupStep::RequireFile(p.clone())));
                CommandSpec::new(&inputs.tool)
                    .arg("--merge")
                    .args([base, left, right])
                    .arg("--output")
                    .arg(out)
            }
        }
        MergerKind::Summer => {
            let mut files: Vec<OsString> = vec![inputs.conflicting_file.clone().into()];
            if inputs.merged_file != inputs.conflicting_file {
                files.push(inputs.merged_file.clone().into());
            }
            CommandSpec::new(&inputs.tool)
                .arg("merge")
                .arg("-C")
                .arg(&inputs.repo_dir)
                .arg("-l")
                .arg(&inputs.left_commit)
                .arg("-r")
                .arg(&inputs.right_commit)
                .arg("-b")
                .arg(&inputs.base_commit)
                .arg("--worktree")
                .arg(&inputs.output_dir)
                .args(["--keep", "--"])
                .args(files)
        }
    };

    Ok(ToolInvocation {
        kind,
        command,
        options,
        setup,
        output_dir: inputs.output_dir.clone(),
    })
}
