// src/exec/error.rs

//! Classified failures of a single process invocation.

use std::time::Duration;

use thiserror::Error;

/// Diagnostics longer than this are replaced by a character count.
pub const MAX_EXCERPT_CHARS: usize = 500;

/// Bound a captured error stream for logging.
///
/// Text up to [`MAX_EXCERPT_CHARS`] characters is returned as-is; anything
/// longer becomes `Error message has N characters.`
pub fn error_excerpt(stderr: &str) -> String {
    let count = stderr.chars().count();
    if count > MAX_EXCERPT_CHARS {
        format!("Error message has {count} characters.")
    } else {
        stderr.to_string()
    }
}

/// Decode a captured stream for [`error_excerpt`], dropping invalid UTF-8
/// bytes instead of replacing them.
pub fn decode_diagnostic(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Details of a process that ran but did not succeed.
#[derive(Debug, Clone)]
pub struct ProcessFailure {
    /// Command line as shown by [`CommandSpec::display`](super::CommandSpec::display).
    pub command: String,
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Bounded diagnostic, see [`error_excerpt`].
    pub excerpt: String,
    /// Full decoded error stream. Not part of the `Display` output.
    pub stderr: String,
    /// Raw standard output captured before the process ended.
    pub stdout: Vec<u8>,
    /// Set when the watchdog matched a fatal signature.
    pub fatal_signature: Option<String>,
}

impl std::fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fail to run '{}'", self.command)?;
        if let Some(sig) = &self.fatal_signature {
            write!(f, " (killed after fatal output '{sig}')")?;
        }
        write!(f, ": {}", self.excerpt)
    }
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("timeout for '{command}' must be strictly positive")]
    InvalidTimeout { command: String },

    #[error("cannot start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Failure(Box<ProcessFailure>),

    #[error("'{command}' did not finish in {}s", timeout.as_secs_f64())]
    Timeout { command: String, timeout: Duration },

    #[error("I/O error while supervising '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProcessError {
    /// The failure details when the process ran and exited unsuccessfully.
    pub fn as_failure(&self) -> Option<&ProcessFailure> {
        match self {
            ProcessError::Failure(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProcessError::Timeout { .. })
    }

    pub fn is_spawn(&self) -> bool {
        matches!(self, ProcessError::Spawn { .. })
    }
}
