// src/harness/report.rs

//! CSV report of diff sizes and the summary printed for the paper tables.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::errors::{MergeBenchError, Result};
use crate::harness::compare::CompareRow;

pub const CSV_HEADER: [&str; 3] = ["repo", "conflicting file", "diff size"];

/// Write `rows` as CSV with a header line.
pub fn write_csv<W: Write>(mut out: W, rows: &[CompareRow]) -> Result<()> {
    write_record(&mut out, &CSV_HEADER)?;
    for row in rows {
        let diff = row.diff.to_string();
        write_record(&mut out, &[row.repo.as_str(), row.conflicting_file.as_str(), diff.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, rows: &[CompareRow]) -> Result<()> {
    let file = fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), rows)
}

fn write_record<W: Write>(out: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
    write!(out, "{}\r\n", line.join(","))
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split CSV text into records, honouring quoted fields.
///
/// A quote only opens a quoted field at the start of a field; elsewhere it
/// is literal text. Outside quotes a carriage return is dropped only as part
/// of a CRLF line break.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut started = false;
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if !started => {
                in_quotes = true;
                started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                started = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                started = false;
            }
            _ => {
                field.push(c);
                started = true;
            }
        }
    }
    if started || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// Numbers behind the LaTeX tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub java_identical: usize,
    /// Non-zero diff sizes, smallest first.
    pub java: Vec<(String, usize)>,
    pub other_identical: usize,
    pub other: Vec<(String, usize)>,
}

impl Summary {
    pub const JAVA_SHOWN: usize = 5;
    pub const OTHER_SHOWN: usize = 3;

    /// Build from CSV text with a `repo,conflicting file,diff size` header.
    ///
    /// Rows whose diff size is not a number are ignored.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut records = parse_csv(text).into_iter();
        let header = records
            .next()
            .ok_or_else(|| MergeBenchError::ReportError("CSV report is empty".to_string()))?;
        let columns: Vec<Option<usize>> = CSV_HEADER
            .iter()
            .map(|name| header.iter().position(|h| h.trim() == *name))
            .collect();
        let &[Some(repo_col), Some(file_col), Some(size_col)] = columns.as_slice() else {
            let missing: Vec<String> = CSV_HEADER
                .iter()
                .zip(&columns)
                .filter(|(_, col)| col.is_none())
                .map(|(name, _)| format!("'{name}'"))
                .collect();
            return Err(MergeBenchError::ReportError(format!(
                "CSV report is missing column(s) {}",
                missing.join(", ")
            )));
        };

        let mut summary = Summary::default();
        for record in records {
            let field = |i: usize| record.get(i).map(|s| s.trim()).unwrap_or_default();
            let Ok(size) = field(size_col).parse::<usize>() else {
                continue;
            };
            let repo = field(repo_col).to_string();
            let (identical, list) = if field(file_col).ends_with(".java") {
                (&mut summary.java_identical, &mut summary.java)
            } else {
                (&mut summary.other_identical, &mut summary.other)
            };
            if size == 0 {
                *identical += 1;
            } else {
                list.push((repo, size));
            }
        }

        // Stable: ties keep file order.
        summary.java.sort_by_key(|(_, size)| *size);
        summary.other.sort_by_key(|(_, size)| *size);
        Ok(summary)
    }

    pub fn from_csv_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(MergeBenchError::MissingInput {
                what: "CSV report".to_string(),
                path: path.to_path_buf(),
            });
        }
        Self::from_csv(&fs::read_to_string(path)?)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Java Files (Top {} by diff size)", Self::JAVA_SHOWN)?;
        writeln!(f, "{} are identical", self.java_identical)?;
        for (repo, size) in self.java.iter().take(Self::JAVA_SHOWN) {
            writeln!(f, "\\ShowDiffSize{{{repo}}}{{{size}}}")?;
        }
        writeln!(f)?;
        writeln!(f, "Non-Java Files (Top {} by diff size)", Self::OTHER_SHOWN)?;
        writeln!(f, "{} are identical", self.other_identical)?;
        for (repo, size) in self.other.iter().take(Self::OTHER_SHOWN) {
            writeln!(f, "\\ShowDiffSize{{{repo}}}{{{size}}}")?;
        }
        Ok(())
    }
}
