// tests/dataset_loading.rs

mod common;
use crate::common::builders::ScenarioBuilder;
use crate::common::fake_backend::{FakeProcessBackend, FakeResponse};
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use mergebench::dataset::{load_dataset, parse_dataset, parse_renames, resolve_merged_file};
use mergebench::errors::MergeBenchError;
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn test_parse_skips_blank_lines_and_strips_fields() -> TestResult {
    let text = format!(
        "{}\r\n\n  \n{}\n",
        ScenarioBuilder::new("alpha").tsv_line(),
        ScenarioBuilder::new("beta").file("docs/README.md ").tsv_line()
    );

    let scenarios = parse_dataset(Path::new("total_list.txt"), &text)?;

    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[0], ScenarioBuilder::new("alpha").build());
    assert_eq!(scenarios[1].repo_name, "beta");
    assert_eq!(scenarios[1].conflicting_file, "docs/README.md");
    assert!(scenarios[0].is_java());
    assert!(!scenarios[1].is_java());
    assert_eq!(scenarios[0].conflicting_file_name(), "Main.java");
    Ok(())
}

#[test]
fn test_short_line_reports_line_number() {
    let text = format!(
        "{}\nhttps://example.org/x.git\tx\tm\tl\n",
        ScenarioBuilder::new("alpha").tsv_line()
    );

    match parse_dataset(Path::new("total_list.txt"), &text) {
        Err(MergeBenchError::DatasetError { line, message, .. }) => {
            assert_eq!(line, 2);
            assert!(message.contains("found 4"), "{message}");
        }
        other => panic!("Expected DatasetError, got: {other:?}"),
    }
}

#[test]
fn test_load_from_file() -> TestResult {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", ScenarioBuilder::new("alpha").tsv_line())?;

    let scenarios = load_dataset(file.path())?;
    assert_eq!(scenarios.len(), 1);
    Ok(())
}

#[test]
fn test_missing_dataset_file() {
    let err = load_dataset("/definitely/missing/total_list.txt").unwrap_err();
    assert!(matches!(err, MergeBenchError::DatasetMissing(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_parse_renames_only_keeps_rename_lines() {
    let listing = "M\tsrc/A.java\nR095\tsrc/Old.java\tsrc/New.java\nA\tsrc/B.java\nR100\tx\ty\n";

    assert_eq!(
        parse_renames(listing),
        vec![("src/Old.java", "src/New.java"), ("x", "y")]
    );
}

#[tokio::test]
async fn test_renamed_file_is_followed_and_cached() -> TestResult {
    init_tracing();
    let backend = FakeProcessBackend::new().respond_to(
        "git diff --name-status",
        FakeResponse::success().stdout("R097\tsrc/Old.java\tsrc/New.java\n"),
    );
    let scenario = ScenarioBuilder::new("alpha")
        .file("src/Old.java")
        .commits("m1", "l1", "r1", "b1")
        .build();

    let merged = resolve_merged_file(&backend, &scenario, Path::new("/ws/alpha"), Duration::from_secs(60)).await;
    assert_eq!(merged, "src/New.java");
    assert_eq!(scenario.merged_file(), Some("src/New.java"));

    resolve_merged_file(&backend, &scenario, Path::new("/ws/alpha"), Duration::from_secs(60)).await;

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].command(),
        "(quoting skipped) git diff --name-status --find-renames b1 m1"
    );
    assert_eq!(calls[0].spec.working_dir(), Some(Path::new("/ws/alpha")));
    assert_eq!(calls[0].options.timeout, Duration::from_secs(60));
    Ok(())
}

#[tokio::test]
async fn test_git_failure_falls_back_to_conflicting_file() -> TestResult {
    init_tracing();
    let backend = FakeProcessBackend::new().otherwise(FakeResponse::exit(128).stderr("fatal: bad revision"));
    let scenario = ScenarioBuilder::new("alpha").build();

    let merged = resolve_merged_file(&backend, &scenario, Path::new("/ws/alpha"), Duration::from_secs(1)).await;

    assert_eq!(merged, "src/Main.java");
    Ok(())
}
