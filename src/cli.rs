// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::EvaluationRange;

/// Command-line arguments for `mergebench`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mergebench",
    version,
    about = "Run merge tools over a benchmark of merge conflicts and measure their results.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `MergeBench.toml` in the current working directory, if it
    /// exists.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MERGEBENCH_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Also write log lines to this file.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Directory the workspace and dataset paths are relative to.
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub path_prefix: PathBuf,

    /// Scenario list, overriding `harness.total_list`.
    #[arg(long, global = true, value_name = "PATH")]
    pub total_list: Option<PathBuf>,

    /// Scenarios to evaluate, `n1..n2` (half-open, either side optional).
    #[arg(long, global = true, value_name = "n1..n2")]
    pub range: Option<EvaluationRange>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a merge tool on every scenario in the range.
    Merge {
        /// Executable or jar of the tool; its kind is recognised from the path.
        #[arg(long, value_name = "PATH")]
        merger: PathBuf,

        /// `java` launcher for jar-based tools.
        #[arg(long, value_name = "PATH")]
        java: Option<String>,
    },

    /// Diff each tool result against the merge commit.
    Compare {
        /// Name of the merger (the result directory), not its path.
        #[arg(long, value_name = "NAME")]
        merger: String,

        /// Write the CSV report here instead of stdout.
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// Print the table summary of a CSV report.
    Summary {
        #[arg(value_name = "CSV")]
        csv: PathBuf,
    },

    /// Print the commands `merge` would run, without running them.
    DryRun {
        #[arg(long, value_name = "PATH")]
        merger: PathBuf,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::try_parse()`.
pub fn try_parse() -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse()
}
