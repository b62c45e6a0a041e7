// src/lib.rs

pub mod cli;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod exec;
pub mod harness;
pub mod logging;
pub mod tools;
pub mod types;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{load_or_default, ConfigFile};
use crate::dataset::load_dataset;
use crate::exec::RealProcessBackend;
use crate::harness::{
    write_csv, write_csv_file, Comparator, MergeExperiment, PrebuiltWorktrees, Summary,
    WorkspaceLayout,
};

/// High-level entry point used by `main.rs`.
///
/// Loads the config, applies command-line overrides and dispatches to the
/// subcommand.
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_or_default(args.config.as_deref())?;
    let range = args.range.unwrap_or_default();
    let layout = WorkspaceLayout::new(&args.path_prefix, &cfg.harness.workspace);
    let dataset_path = args
        .total_list
        .clone()
        .unwrap_or_else(|| args.path_prefix.join(&cfg.harness.total_list));

    match args.command {
        Command::Merge { merger, java } => {
            if let Some(java) = java {
                cfg.harness.java = java;
            }
            let scenarios = load_dataset(&dataset_path)?;
            let experiment =
                MergeExperiment::new(RealProcessBackend, PrebuiltWorktrees, cfg, layout, merger)?;
            let report = experiment.run(&scenarios, &range).await?;
            println!("{report}");
        }
        Command::Compare { merger, csv } => {
            let scenarios = load_dataset(&dataset_path)?;
            let comparator = Comparator::new(
                RealProcessBackend,
                layout,
                merger,
                cfg.timeouts.diff,
                cfg.timeouts.git,
            );
            let rows = comparator.compare(&scenarios, &range).await;
            match csv {
                Some(path) => {
                    write_csv_file(&path, &rows)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    info!(path = %path.display(), rows = rows.len(), "CSV report written");
                }
                None => write_csv(std::io::stdout().lock(), &rows)?,
            }
        }
        Command::Summary { csv } => {
            let summary = Summary::from_csv_file(&csv)?;
            print!("{summary}");
        }
        Command::DryRun { merger } => {
            let scenarios = load_dataset(&dataset_path)?;
            print_dry_run(&cfg, layout, merger, &scenarios, &range)?;
        }
    }

    Ok(())
}

/// Print every invocation `merge` would perform.
fn print_dry_run(
    cfg: &ConfigFile,
    layout: WorkspaceLayout,
    merger: PathBuf,
    scenarios: &[dataset::Scenario],
    range: &types::EvaluationRange,
) -> Result<()> {
    let experiment = MergeExperiment::new(
        RealProcessBackend,
        PrebuiltWorktrees,
        cfg.clone(),
        layout,
        merger,
    )?;
    let plan = experiment.plan(scenarios, range)?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "mergebench dry-run")?;
    writeln!(out, "  merger = {}", experiment.kind())?;
    writeln!(out, "  workspace = {}", experiment.layout().workspace().display())?;
    writeln!(out)?;

    for run in &plan {
        writeln!(out, "[{}] {}", run.index, run.repo)?;
        writeln!(out, "      cmd: {}", run.invocation.command)?;
        if let Some(dir) = run.invocation.command.working_dir() {
            writeln!(out, "      cwd: {}", dir.display())?;
        }
        writeln!(
            out,
            "      timeout: {}s",
            run.invocation.options.timeout.as_secs_f64()
        )?;
        if !run.invocation.options.fatal_signatures.is_empty() {
            writeln!(
                out,
                "      fatal_signatures: {:?}",
                run.invocation.options.fatal_signatures
            )?;
        }
        for step in &run.invocation.setup {
            writeln!(out, "      setup: {step:?}")?;
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
