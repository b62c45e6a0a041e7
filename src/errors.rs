// src/errors.rs

//! Crate-wide error type.
//!
//! Process-level failures have their own taxonomy in
//! [`crate::exec::ProcessError`]; this enum wraps it together with the
//! harness-level failures (config, dataset, command line, I/O).

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::ProcessError;

#[derive(Error, Debug)]
pub enum MergeBenchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("The list of example files is not at {}", .0.display())]
    DatasetMissing(PathBuf),

    #[error("{}:{line}: {message}", path.display())]
    DatasetError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Can't recognize the merger from {0}. Name a folder or the file after a supported merger.")]
    UnknownMerger(String),

    #[error("{0}")]
    InvalidRange(String),

    #[error("{tool} cannot run on this machine: {hint}")]
    ToolMisconfigured { tool: String, hint: String },

    #[error("{tool}: {message}")]
    UnsupportedScenario { tool: String, message: String },

    #[error("missing {what} at {}", path.display())]
    MissingInput { what: String, path: PathBuf },

    #[error("Invalid report: {0}")]
    ReportError(String),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MergeBenchError {
    /// Process exit code for the binary.
    ///
    /// 10 marks a merge tool that cannot work in this environment at all,
    /// everything else is a usage or setup problem.
    pub fn exit_code(&self) -> i32 {
        match self {
            MergeBenchError::ToolMisconfigured { .. } => 10,
            _ => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MergeBenchError>;
