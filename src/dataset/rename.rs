// src/dataset/rename.rs

use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::dataset::Scenario;
use crate::exec::{CommandSpec, ProcessBackend, RunOptions};

/// Path of the scenario's file in the merge commit.
///
/// Runs `git diff --name-status --find-renames <base> <merge>` in
/// `repo_dir` and follows a rename of the conflicting file if there is
/// one. Any failure (missing repository, unknown commit, timeout) falls back
/// to the conflicting file. The answer is cached on the scenario.
pub async fn resolve_merged_file<'s>(
    backend: &dyn ProcessBackend,
    scenario: &'s Scenario,
    repo_dir: &Path,
    timeout: Duration,
) -> &'s str {
    if let Some(cached) = scenario.merged_file() {
        return cached;
    }

    let spec = CommandSpec::new("git")
        .args(["diff", "--name-status", "--find-renames"])
        .arg(&scenario.base_commit)
        .arg(&scenario.merge_commit)
        .cwd(repo_dir);
    let options = RunOptions::new(timeout).text();

    let resolved = match backend.run(&spec, &options).await {
        Ok(captured) => {
            let listing = captured.stdout.to_text();
            parse_renames(&listing)
                .into_iter()
                .find(|(old, _)| *old == scenario.conflicting_file)
                .map(|(_, new)| new.to_string())
        }
        Err(e) => {
            warn!(
                repo = %scenario.repo_name,
                error = %e,
                "cannot detect renames; assuming the merged file keeps its name"
            );
            None
        }
    };

    if let Some(new) = &resolved {
        debug!(repo = %scenario.repo_name, from = %scenario.conflicting_file, to = %new, "conflicting file was renamed");
    }
    scenario.cache_merged_file(resolved.unwrap_or_else(|| scenario.conflicting_file.clone()))
}

/// `(old, new)` pairs from `git diff --name-status` output.
///
/// Rename lines look like `R100<TAB>old/path<TAB>new/path`.
pub fn parse_renames(listing: &str) -> Vec<(&str, &str)> {
    listing
        .lines()
        .filter_map(|line| {
            let mut parts = line.trim().split('\t');
            let status = parts.next()?;
            let old = parts.next()?;
            let new = parts.next()?;
            if status.starts_with('R') && parts.next().is_none() {
                Some((old, new))
            } else {
                None
            }
        })
        .collect()
}
