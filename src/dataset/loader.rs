// src/dataset/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::dataset::Scenario;
use crate::errors::{MergeBenchError, Result};

const COLUMNS: usize = 7;

/// Read and parse the scenario list at `path`.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<Scenario>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(MergeBenchError::DatasetMissing(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)?;
    let scenarios = parse_dataset(path, &contents)?;
    debug!(path = %path.display(), count = scenarios.len(), "loaded dataset");
    Ok(scenarios)
}

/// Parse the tab-separated scenario list.
///
/// Blank lines are skipped. Every other line needs the seven columns; extra
/// columns are ignored. `path` is only used in error messages.
pub fn parse_dataset(path: &Path, contents: &str) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < COLUMNS {
            return Err(MergeBenchError::DatasetError {
                path: path.to_path_buf(),
                line: idx + 1,
                message: format!(
                    "expected {COLUMNS} tab-separated columns, found {}",
                    parts.len()
                ),
            });
        }

        let conflicting_file = parts[6].trim();
        if conflicting_file.is_empty() {
            return Err(MergeBenchError::DatasetError {
                path: path.to_path_buf(),
                line: idx + 1,
                message: "conflicting file is empty".to_string(),
            });
        }

        scenarios.push(Scenario::new(
            parts[0].trim(),
            parts[1].trim(),
            parts[2].trim(),
            parts[3].trim(),
            parts[4].trim(),
            parts[5].trim(),
            conflicting_file,
        ));
    }

    Ok(scenarios)
}
