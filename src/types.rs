// src/types.rs

use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d*)\.\.(\d*)$").expect("range pattern is valid")
});

/// Which dataset entries to evaluate, as given by `--range n1..n2`.
///
/// Half-open like a Rust range. Either side may be omitted (`..10`, `5..`,
/// `..`); a missing `--range` option means every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvaluationRange {
    pub from: Option<usize>,
    pub to: Option<usize>,
}

impl EvaluationRange {
    pub fn all() -> Self {
        Self::default()
    }

    /// Concrete index range for a dataset of `len` entries, clamped so it
    /// can always be used to slice the dataset.
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let end = self.to.unwrap_or(len).min(len);
        let start = self.from.unwrap_or(0).min(end);
        start..end
    }
}

impl FromStr for EvaluationRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.contains("..") {
            return Err(format!(
                "{s} is not a valid value for option --range. \"..\" must be present."
            ));
        }
        let caps = RANGE_RE
            .captures(s)
            .ok_or_else(|| format!("{s} is not a valid value for option --range. Expected n1..n2."))?;

        let bound = |m: Option<regex::Match<'_>>| -> Result<Option<usize>, String> {
            match m.map(|m| m.as_str()).filter(|t| !t.is_empty()) {
                None => Ok(None),
                Some(t) => t
                    .parse::<usize>()
                    .map(Some)
                    .map_err(|e| format!("invalid bound '{t}' in --range: {e}")),
            }
        };

        Ok(Self {
            from: bound(caps.get(1))?,
            to: bound(caps.get(2))?,
        })
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"3m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
