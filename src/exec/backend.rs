// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The harness talks to a `ProcessBackend` instead of calling
//! [`run_bounded`] directly. Production code uses [`RealProcessBackend`];
//! tests can provide a backend that records the commands it was asked to
//! run and returns scripted results without spawning anything.

use std::future::Future;
use std::pin::Pin;

use super::command::CommandSpec;
use super::error::ProcessError;
use super::outcome::{Captured, RunOptions};
use super::runner::run_bounded;

/// Boxed future returned by [`ProcessBackend::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<Captured, ProcessError>> + Send + 'a>>;

/// Trait abstracting how a single external command is executed.
pub trait ProcessBackend: Send + Sync {
    /// Run the command to completion or to its deadline.
    fn run<'a>(&'a self, spec: &'a CommandSpec, options: &'a RunOptions) -> RunFuture<'a>;
}

/// Backend that spawns real OS processes through [`run_bounded`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RealProcessBackend;

impl ProcessBackend for RealProcessBackend {
    fn run<'a>(&'a self, spec: &'a CommandSpec, options: &'a RunOptions) -> RunFuture<'a> {
        Box::pin(run_bounded(spec, options))
    }
}
