// src/exec/outcome.rs

//! Inputs and results of a bounded process run.

use std::time::Duration;

use super::error::ProcessError;

/// Whether stdout is handed back as raw bytes or decoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Bytes,
    /// Lossy UTF-8 decoding.
    Text,
}

/// Per-invocation options for [`run_bounded`](super::run_bounded).
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Hard deadline. Must be non-zero.
    pub timeout: Duration,
    pub output: OutputMode,
    /// Substrings that, when seen in any stderr line, mean the process is
    /// in an unrecoverable state and must be killed. Empty disables the
    /// watchdog.
    pub fatal_signatures: Vec<String>,
}

impl RunOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            output: OutputMode::Bytes,
            fatal_signatures: Vec::new(),
        }
    }

    pub fn text(mut self) -> Self {
        self.output = OutputMode::Text;
        self
    }

    pub fn with_fatal_signatures<I, S>(mut self, signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fatal_signatures
            .extend(signatures.into_iter().map(Into::into));
        self
    }
}

/// Captured standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stdout {
    Bytes(Vec<u8>),
    Text(String),
}

impl Stdout {
    pub(crate) fn from_bytes(bytes: Vec<u8>, mode: OutputMode) -> Self {
        match mode {
            OutputMode::Bytes => Stdout::Bytes(bytes),
            OutputMode::Text => Stdout::Text(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Stdout::Bytes(b) => b,
            Stdout::Text(s) => s.as_bytes(),
        }
    }

    /// Decoded view, lossy for `Bytes`.
    pub fn to_text(&self) -> String {
        match self {
            Stdout::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Stdout::Text(s) => s.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct Captured {
    pub stdout: Stdout,
    /// Decoded error stream. Tools often log progress here even on success.
    pub stderr: String,
    pub elapsed: Duration,
}

/// Tagged view of one invocation, for callers that prefer matching over
/// `Result` plumbing.
#[derive(Debug)]
pub enum ExecutionOutcome {
    Success {
        stdout: Stdout,
    },
    Failure {
        exit_code: Option<i32>,
        stderr_excerpt: String,
    },
    Timeout {
        elapsed_bound: Duration,
    },
    /// The command never started, or supervising it failed.
    Error {
        reason: String,
    },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }
}

impl From<Result<Captured, ProcessError>> for ExecutionOutcome {
    fn from(result: Result<Captured, ProcessError>) -> Self {
        match result {
            Ok(captured) => ExecutionOutcome::Success {
                stdout: captured.stdout,
            },
            Err(ProcessError::Failure(f)) => ExecutionOutcome::Failure {
                exit_code: f.exit_code,
                stderr_excerpt: f.excerpt,
            },
            Err(ProcessError::Timeout { timeout, .. }) => ExecutionOutcome::Timeout {
                elapsed_bound: timeout,
            },
            Err(other) => ExecutionOutcome::Error {
                reason: other.to_string(),
            },
        }
    }
}
