// src/exec/mod.rs

//! Process execution layer.
//!
//! Every external program this crate starts (merge tools, `git`) goes
//! through here, using `tokio::process::Command`.
//!
//! - [`command`] describes what to run (`CommandSpec`).
//! - [`runner`] owns [`run_bounded`]: deadline enforcement, concurrent
//!   draining of stdout/stderr, and guaranteed termination.
//! - [`watchdog`] detects fatal signatures in stderr and ends a run early.
//! - [`outcome`] holds run options and results; [`error`] the failure
//!   taxonomy and the stderr excerpt rule.
//! - [`backend`] provides the `ProcessBackend` seam and the real backend.

pub mod backend;
pub mod command;
pub mod error;
pub mod outcome;
pub mod runner;
pub mod watchdog;

pub use backend::{ProcessBackend, RealProcessBackend, RunFuture};
pub use command::{CommandSpec, Program};
pub use error::{decode_diagnostic, error_excerpt, ProcessError, ProcessFailure, MAX_EXCERPT_CHARS};
pub use outcome::{Captured, ExecutionOutcome, OutputMode, RunOptions, Stdout};
pub use runner::run_bounded;
pub use watchdog::{match_signature, FatalSignal};
