// src/config/validate.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::config::model::{
    ConfigFile, HarnessSettings, JDimeMode, RawConfigFile, TimeoutBudgets, ToolOverrides,
};
use crate::errors::{MergeBenchError, Result};
use crate::tools::MergerKind;
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = MergeBenchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let harness = validate_harness(&raw)?;
        let timeouts = validate_timeouts(&raw)?;
        let tools = validate_tools(&raw)?;
        Ok(ConfigFile::new_unchecked(harness, timeouts, tools))
    }
}

/// Parse a duration and reject zero, which would make every run time out.
fn positive_duration(field: &str, value: &str) -> Result<Duration> {
    let dur = parse_duration(value)
        .map_err(|e| MergeBenchError::ConfigError(format!("{field}: {e}")))?;
    if dur.is_zero() {
        return Err(MergeBenchError::ConfigError(format!(
            "{field} must be strictly positive (got \"{value}\")"
        )));
    }
    Ok(dur)
}

fn validate_harness(cfg: &RawConfigFile) -> Result<HarnessSettings> {
    let h = &cfg.harness;
    if h.java.trim().is_empty() {
        return Err(MergeBenchError::ConfigError(
            "[harness].java must not be empty".to_string(),
        ));
    }
    Ok(HarnessSettings {
        workspace: PathBuf::from(&h.workspace),
        total_list: PathBuf::from(&h.total_list),
        java: h.java.clone(),
        stale_after: positive_duration("[harness].stale_after", &h.stale_after)?,
    })
}

fn validate_timeouts(cfg: &RawConfigFile) -> Result<TimeoutBudgets> {
    let t = &cfg.timeouts;
    Ok(TimeoutBudgets {
        resolve: positive_duration("[timeouts].resolve", &t.resolve)?,
        diff: positive_duration("[timeouts].diff", &t.diff)?,
        git: positive_duration("[timeouts].git", &t.git)?,
    })
}

fn validate_tools(cfg: &RawConfigFile) -> Result<BTreeMap<MergerKind, ToolOverrides>> {
    let mut tools = BTreeMap::new();

    for (name, section) in cfg.tool.iter() {
        let kind = MergerKind::from_str(name)
            .map_err(|e| MergeBenchError::ConfigError(format!("[tool.{name}]: {e}")))?;

        let timeout = section
            .timeout
            .as_deref()
            .map(|t| positive_duration(&format!("[tool.{name}].timeout"), t))
            .transpose()?;

        if let Some(signatures) = &section.fatal_signatures {
            if signatures.iter().any(|s| s.is_empty()) {
                return Err(MergeBenchError::ConfigError(format!(
                    "[tool.{name}].fatal_signatures must not contain empty strings"
                )));
            }
        }

        let jdime_mode = match section.jdime_mode.as_deref() {
            None => None,
            Some(_) if kind != MergerKind::JDime => {
                return Err(MergeBenchError::ConfigError(format!(
                    "[tool.{name}].jdime_mode is only valid for JDime"
                )));
            }
            Some(mode) => Some(JDimeMode::from_str(mode).map_err(|e| {
                MergeBenchError::ConfigError(format!("[tool.{name}].jdime_mode: {e}"))
            })?),
        };

        if tools.contains_key(&kind) {
            return Err(MergeBenchError::ConfigError(format!(
                "[tool.{name}] duplicates the section for {kind}"
            )));
        }

        tools.insert(
            kind,
            ToolOverrides {
                timeout,
                fatal_signatures: section.fatal_signatures.clone(),
                jdime_mode,
            },
        );
    }

    Ok(tools)
}
