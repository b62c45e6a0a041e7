// src/harness/merge.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::config::ConfigFile;
use crate::dataset::{resolve_merged_file, Scenario};
use crate::errors::{MergeBenchError, Result};
use crate::exec::ProcessBackend;
use crate::harness::layout::{WorkspaceLayout, WorktreeProvider};
use crate::tools::{build_invocation, MergeInputs, MergerKind, ToolInvocation, Worktrees};
use crate::types::EvaluationRange;

/// Suffix of files some tools write next to their real output.
const NORMALIZED_SUFFIX: &str = "-normalized.java";

/// What running a tool on one scenario amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
    /// A file in the output directory was written during this run.
    Generated { file: PathBuf },
    /// Output exists, but it predates this run.
    Stale { file: PathBuf, modified: String },
    /// The tool finished without writing anything.
    NoOutput,
    /// Non-zero exit, timeout, watchdog kill or spawn failure.
    ToolFailed { reason: String },
    /// The scenario cannot be run with this tool (missing inputs).
    Skipped { reason: String },
}

impl ScenarioOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, ScenarioOutcome::Generated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioResult {
    /// Position in the dataset.
    pub index: usize,
    pub repo: String,
    pub conflicting_file: String,
    pub outcome: ScenarioOutcome,
}

/// Per-scenario outcomes of one batch, in dataset order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub merger: MergerKind,
    pub results: Vec<ScenarioResult>,
}

impl MergeReport {
    pub fn count(&self, pred: impl Fn(&ScenarioOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} scenarios, {} generated, {} stale, {} without output, {} failed, {} skipped",
            self.merger,
            self.results.len(),
            self.count(|o| matches!(o, ScenarioOutcome::Generated { .. })),
            self.count(|o| matches!(o, ScenarioOutcome::Stale { .. })),
            self.count(|o| matches!(o, ScenarioOutcome::NoOutput)),
            self.count(|o| matches!(o, ScenarioOutcome::ToolFailed { .. })),
            self.count(|o| matches!(o, ScenarioOutcome::Skipped { .. })),
        )
    }
}

/// One entry of a dry run.
#[derive(Debug, Clone)]
pub struct PlannedRun {
    pub index: usize,
    pub repo: String,
    pub invocation: ToolInvocation,
}

/// Runs one merge tool over a range of scenarios, one at a time.
pub struct MergeExperiment<B: ProcessBackend, W: WorktreeProvider> {
    backend: B,
    worktrees: W,
    config: ConfigFile,
    layout: WorkspaceLayout,
    kind: MergerKind,
    tool: PathBuf,
}

impl<B: ProcessBackend, W: WorktreeProvider> fmt::Debug for MergeExperiment<B, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeExperiment")
            .field("kind", &self.kind)
            .field("tool", &self.tool)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend, W: WorktreeProvider> MergeExperiment<B, W> {
    /// The tool kind is recognised from `tool`'s path.
    pub fn new(
        backend: B,
        worktrees: W,
        config: ConfigFile,
        layout: WorkspaceLayout,
        tool: impl Into<PathBuf>,
    ) -> Result<Self> {
        let tool = tool.into();
        let kind = MergerKind::detect(&tool)
            .ok_or_else(|| MergeBenchError::UnknownMerger(tool.display().to_string()))?;
        Ok(Self {
            backend,
            worktrees,
            config,
            layout,
            kind,
            tool,
        })
    }

    pub fn kind(&self) -> MergerKind {
        self.kind
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Run every scenario in `range`.
    ///
    /// Tool failures are recorded per scenario. Only an abort signature
    /// ([`MergeBenchError::ToolMisconfigured`]) or a harness I/O error stops
    /// the batch.
    pub async fn run(&self, scenarios: &[Scenario], range: &EvaluationRange) -> Result<MergeReport> {
        let span = range.resolve(scenarios.len());
        info!(merger = %self.kind, from = span.start, to = span.end, "starting merge experiment");

        if self.kind == MergerKind::FstMerge {
            remove_fstmerge_tmp(self.layout.workspace());
        }

        let mut results = Vec::with_capacity(span.len());
        for index in span {
            let scenario = &scenarios[index];
            let outcome = self.run_one(index, scenario).await?;
            results.push(ScenarioResult {
                index,
                repo: scenario.repo_name.clone(),
                conflicting_file: scenario.conflicting_file.clone(),
                outcome,
            });
        }

        let report = MergeReport {
            merger: self.kind,
            results,
        };
        info!("{report}");
        Ok(report)
    }

    /// Run the tool on a single scenario.
    pub async fn run_one(&self, index: usize, scenario: &Scenario) -> Result<ScenarioOutcome> {
        info!(
            index,
            repo = %scenario.repo_name,
            file = scenario.conflicting_file_name(),
            "{} starts merging", self.kind
        );

        fs::create_dir_all(self.layout.tool_result_dir(self.kind.name()))?;

        let worktrees = if self.kind.needs_worktrees() {
            match self.worktrees.worktrees(&self.layout, scenario, self.kind) {
                Ok(trees) => Some(trees),
                Err(MergeBenchError::MissingInput { what, path }) => {
                    let reason = format!("missing {what} at {}", path.display());
                    warn!(repo = %scenario.repo_name, "{reason}");
                    return Ok(ScenarioOutcome::Skipped { reason });
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        let merged_file = if self.kind == MergerKind::Summer {
            let repo_dir = self.layout.repo_dir(&scenario.repo_name);
            resolve_merged_file(&self.backend, scenario, &repo_dir, self.config.timeouts.git)
                .await
                .to_string()
        } else {
            scenario.conflicting_file.clone()
        };

        let inputs = self.inputs(scenario, worktrees, merged_file);
        let invocation = build_invocation(self.kind, &inputs, &self.config)?;
        match invocation.prepare() {
            Ok(()) => {}
            Err(MergeBenchError::UnsupportedScenario { message, .. }) => {
                warn!(repo = %scenario.repo_name, "{message}");
                return Ok(ScenarioOutcome::Skipped { reason: message });
            }
            Err(e) => return Err(e),
        }

        let started = SystemTime::now();
        let result = self.backend.run(&invocation.command, &invocation.options).await;

        let stderr = match &result {
            Ok(captured) => captured.stderr.as_str(),
            Err(e) => e.as_failure().map(|f| f.stderr.as_str()).unwrap_or_default(),
        };
        if let Some(hint) = invocation.abort_reason(stderr) {
            error!(merger = %self.kind, "{hint}");
            return Err(MergeBenchError::ToolMisconfigured {
                tool: self.kind.name().to_string(),
                hint: hint.to_string(),
            });
        }

        match result {
            Ok(captured) => {
                debug!(
                    repo = %scenario.repo_name,
                    elapsed_ms = captured.elapsed.as_millis() as u64,
                    stdout = %captured.stdout.to_text(),
                    "tool finished"
                );
            }
            Err(e) => {
                error!(repo = %scenario.repo_name, "{e}");
                return Ok(ScenarioOutcome::ToolFailed {
                    reason: e.to_string(),
                });
            }
        }

        let outcome = inspect_output(&invocation.output_dir, started, self.config.harness.stale_after)?;
        match &outcome {
            ScenarioOutcome::Generated { .. } => info!("{} solution generated", self.kind),
            ScenarioOutcome::Stale { file, modified } => warn!(
                "File {} is lastly modified on {modified}. You may want to clean up {}.",
                file.display(),
                self.layout.tool_result_dir(self.kind.name()).display()
            ),
            ScenarioOutcome::NoOutput => info!("{} fails to write any files.", self.kind),
            _ => {}
        }
        Ok(outcome)
    }

    /// Describe the invocations `run` would perform, without running or
    /// writing anything.
    pub fn plan(&self, scenarios: &[Scenario], range: &EvaluationRange) -> Result<Vec<PlannedRun>> {
        range
            .resolve(scenarios.len())
            .map(|index| {
                let scenario = &scenarios[index];
                let worktrees = self
                    .kind
                    .needs_worktrees()
                    .then(|| self.layout.worktrees(&scenario.repo_name));
                let merged_file = scenario
                    .merged_file()
                    .unwrap_or(&scenario.conflicting_file)
                    .to_string();
                let inputs = self.inputs(scenario, worktrees, merged_file);
                Ok(PlannedRun {
                    index,
                    repo: scenario.repo_name.clone(),
                    invocation: build_invocation(self.kind, &inputs, &self.config)?,
                })
            })
            .collect()
    }

    fn inputs(&self, scenario: &Scenario, worktrees: Option<Worktrees>, merged_file: String) -> MergeInputs {
        let repo = &scenario.repo_name;
        MergeInputs {
            tool: self.tool.clone(),
            java: self.config.harness.java.clone(),
            workspace: self.layout.workspace().to_path_buf(),
            repo_name: repo.clone(),
            repo_dir: self.layout.repo_dir(repo),
            worktrees,
            tool_result_dir: self.layout.tool_result_dir(self.kind.name()),
            output_dir: self.layout.output_dir(self.kind.name(), repo),
            conflicting_file: scenario.conflicting_file.clone(),
            merged_file,
            base_commit: scenario.base_commit.clone(),
            left_commit: scenario.left_commit.clone(),
            right_commit: scenario.right_commit.clone(),
        }
    }
}

/// Classify what the tool left in `dir`.
///
/// The newest regular file decides: modified within `stale_after` of
/// `started` (or later) means this run produced it.
pub fn inspect_output(dir: &Path, started: SystemTime, stale_after: Duration) -> Result<ScenarioOutcome> {
    let mut newest: Option<(PathBuf, SystemTime)> = None;
    if dir.is_dir() {
        collect_newest(dir, &mut newest)?;
    }

    let Some((file, modified)) = newest else {
        return Ok(ScenarioOutcome::NoOutput);
    };

    let age = started.duration_since(modified).unwrap_or(Duration::ZERO);
    if age <= stale_after {
        Ok(ScenarioOutcome::Generated { file })
    } else {
        let modified = DateTime::<Local>::from(modified)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        Ok(ScenarioOutcome::Stale { file, modified })
    }
}

fn collect_newest(dir: &Path, newest: &mut Option<(PathBuf, SystemTime)>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let meta = entry.metadata()?;
        if meta.is_dir() {
            collect_newest(&path, newest)?;
            continue;
        }
        if path.to_string_lossy().ends_with(NORMALIZED_SUFFIX) {
            continue;
        }
        let modified = meta.modified()?;
        if newest.as_ref().is_none_or(|(_, t)| modified > *t) {
            *newest = Some((path, modified));
        }
    }
    Ok(())
}

/// Remove the temp directories FSTMerge leaves in `workspace` when it fails.
///
/// Failures are logged and otherwise ignored.
fn remove_fstmerge_tmp(workspace: &Path) {
    let entries = match fs::read_dir(workspace) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %workspace.display(), error = %e, "cannot list workspace");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !entry.file_name().to_string_lossy().contains("fstmerge_tmp") || !path.is_dir() {
            continue;
        }
        debug!(dir = %path.display(), "removing FSTMerge temp dir");
        if let Err(e) = fs::remove_dir_all(&path) {
            warn!(dir = %path.display(), error = %e, "failed to delete FSTMerge temp dir");
        }
    }
}
