// src/tools/mod.rs

//! Merge tool adapters.
//!
//! [`MergerKind`] names the supported tools and is detected from the path
//! the user passes on the command line. [`build_invocation`] turns a kind
//! plus the scenario's inputs into a [`ToolInvocation`]: the command to run,
//! its deadline and watchdog signatures, the filesystem setup it needs, and
//! the stderr signatures that make the whole batch pointless.

pub mod invocation;
pub mod kind;

pub use invocation::{build_invocation, MergeInputs, SetupStep, ToolInvocation, Worktrees};
pub use kind::MergerKind;
