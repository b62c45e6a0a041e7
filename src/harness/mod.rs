// src/harness/mod.rs

//! Experiment orchestration.
//!
//! - [`layout`]: where repositories, worktrees and results live.
//! - [`merge`]: run one merge tool over a range of scenarios.
//! - [`compare`]: diff each tool result against the real merge.
//! - [`report`]: CSV output and the summary tables.
//!
//! Everything runs strictly one scenario at a time; external programs go
//! through a [`ProcessBackend`](crate::exec::ProcessBackend).

pub mod compare;
pub mod layout;
pub mod merge;
pub mod report;

pub use compare::{CompareRow, Comparator, DiffSize};
pub use layout::{PrebuiltWorktrees, WorkspaceLayout, WorktreeProvider};
pub use merge::{inspect_output, MergeExperiment, MergeReport, PlannedRun, ScenarioOutcome, ScenarioResult};
pub use report::{parse_csv, write_csv, write_csv_file, Summary, CSV_HEADER};
