// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::tools::MergerKind;

/// Configuration as read from `MergeBench.toml`, before validation.
///
/// ```toml
/// [harness]
/// workspace = "Resource/workspace"
/// total_list = "Data/total_list.txt"
/// java = "java"
/// stale_after = "10s"
///
/// [timeouts]
/// resolve = "3m"
/// diff = "5m"
/// git = "1m"
///
/// [tool.IntelliMerge]
/// timeout = "5m"
/// fatal_signatures = ["concurrent.ExecutionException"]
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub harness: HarnessSection,

    #[serde(default)]
    pub timeouts: TimeoutSection,

    /// Per-tool overrides from `[tool.<Name>]`, keyed by merger name.
    #[serde(default)]
    pub tool: BTreeMap<String, ToolSection>,
}

/// `[harness]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessSection {
    /// Workspace holding repositories, worktrees and `result/`, relative to
    /// the path prefix unless absolute.
    #[serde(default = "default_workspace")]
    pub workspace: String,

    /// Tab-separated scenario list, relative to the path prefix unless
    /// absolute.
    #[serde(default = "default_total_list")]
    pub total_list: String,

    /// Java launcher used for the jar-based tools.
    #[serde(default = "default_java")]
    pub java: String,

    /// Output files older than this when a run finishes are reported as
    /// left over from an earlier run.
    #[serde(default = "default_stale_after")]
    pub stale_after: String,
}

fn default_workspace() -> String {
    "Resource/workspace".to_string()
}

fn default_total_list() -> String {
    "Data/total_list.txt".to_string()
}

fn default_java() -> String {
    "java".to_string()
}

fn default_stale_after() -> String {
    "10s".to_string()
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            total_list: default_total_list(),
            java: default_java(),
            stale_after: default_stale_after(),
        }
    }
}

/// `[timeouts]` section: one budget per class of operation.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutSection {
    /// Resolving one merge scenario with a merge tool.
    #[serde(default = "default_resolve")]
    pub resolve: String,

    /// Diffing a tool result against the expected merge.
    #[serde(default = "default_diff")]
    pub diff: String,

    /// Short `git` queries such as rename detection.
    #[serde(default = "default_git")]
    pub git: String,
}

fn default_resolve() -> String {
    "3m".to_string()
}

fn default_diff() -> String {
    "5m".to_string()
}

fn default_git() -> String {
    "1m".to_string()
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            resolve: default_resolve(),
            diff: default_diff(),
            git: default_git(),
        }
    }
}

/// `[tool.<Name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ToolSection {
    /// Overrides the `resolve` budget for this tool.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Replaces the built-in fatal signatures for this tool.
    #[serde(default)]
    pub fatal_signatures: Option<Vec<String>>,

    /// `"linebased,structured"` or `"structured"`; JDime only.
    #[serde(default)]
    pub jdime_mode: Option<String>,
}

/// JDime merge strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JDimeMode {
    #[default]
    LinebasedStructured,
    Structured,
}

impl JDimeMode {
    pub fn as_arg(self) -> &'static str {
        match self {
            JDimeMode::LinebasedStructured => "linebased,structured",
            JDimeMode::Structured => "structured",
        }
    }
}

impl FromStr for JDimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "").as_str() {
            "linebased,structured" => Ok(JDimeMode::LinebasedStructured),
            "structured" => Ok(JDimeMode::Structured),
            other => Err(format!(
                "invalid jdime_mode: {other} (expected \"linebased,structured\" or \"structured\")"
            )),
        }
    }
}

/// Timeout budgets after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBudgets {
    pub resolve: Duration,
    pub diff: Duration,
    pub git: Duration,
}

impl Default for TimeoutBudgets {
    fn default() -> Self {
        Self {
            resolve: Duration::from_secs(3 * 60),
            diff: Duration::from_secs(5 * 60),
            git: Duration::from_secs(60),
        }
    }
}

/// Harness settings after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessSettings {
    pub workspace: PathBuf,
    pub total_list: PathBuf,
    pub java: String,
    pub stale_after: Duration,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from(default_workspace()),
            total_list: PathBuf::from(default_total_list()),
            java: default_java(),
            stale_after: Duration::from_secs(10),
        }
    }
}

/// Validated per-tool overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOverrides {
    pub timeout: Option<Duration>,
    pub fatal_signatures: Option<Vec<String>>,
    pub jdime_mode: Option<JDimeMode>,
}

/// Validated configuration used by the rest of the crate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigFile {
    pub harness: HarnessSettings,
    pub timeouts: TimeoutBudgets,
    pub tools: BTreeMap<MergerKind, ToolOverrides>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        harness: HarnessSettings,
        timeouts: TimeoutBudgets,
        tools: BTreeMap<MergerKind, ToolOverrides>,
    ) -> Self {
        Self {
            harness,
            timeouts,
            tools,
        }
    }

    pub fn overrides_for(&self, kind: MergerKind) -> Option<&ToolOverrides> {
        self.tools.get(&kind)
    }

    /// Deadline for one run of `kind`.
    pub fn resolve_timeout(&self, kind: MergerKind) -> Duration {
        self.overrides_for(kind)
            .and_then(|o| o.timeout)
            .unwrap_or(self.timeouts.resolve)
    }

    /// Fatal stderr signatures for `kind`: the configured list, or the
    /// built-in one.
    pub fn fatal_signatures(&self, kind: MergerKind) -> Vec<String> {
        match self.overrides_for(kind).and_then(|o| o.fatal_signatures.clone()) {
            Some(list) => list,
            None => kind
                .default_fatal_signatures()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn jdime_mode(&self) -> JDimeMode {
        self.overrides_for(MergerKind::JDime)
            .and_then(|o| o.jdime_mode)
            .unwrap_or_default()
    }
}
