// tests/config_validation.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use mergebench::config::{load_and_validate, load_or_default, JDimeMode, ToolSection};
use mergebench::errors::MergeBenchError;
use mergebench::tools::MergerKind;
use tempfile::NamedTempFile;

#[test]
fn test_defaults_match_historic_budgets() {
    let cfg = ConfigFileBuilder::new().build();

    assert_eq!(cfg.timeouts.resolve, Duration::from_secs(180));
    assert_eq!(cfg.timeouts.diff, Duration::from_secs(300));
    assert_eq!(cfg.timeouts.git, Duration::from_secs(60));
    assert_eq!(cfg.harness.stale_after, Duration::from_secs(10));
    assert_eq!(cfg.harness.java, "java");
    assert_eq!(cfg.harness.workspace, PathBuf::from("Resource/workspace"));
    assert_eq!(cfg.harness.total_list, PathBuf::from("Data/total_list.txt"));
    assert_eq!(cfg.jdime_mode(), JDimeMode::LinebasedStructured);
}

#[test]
fn test_default_config_equals_empty_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "").unwrap();

    let loaded = load_and_validate(file.path()).unwrap();
    let built = ConfigFileBuilder::new().build();
    assert_eq!(loaded, built);
}

#[test]
fn test_full_file_is_parsed() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[harness]
workspace = "ws"
java = "/usr/lib/jvm/bin/java"
stale_after = "30s"

[timeouts]
resolve = "90s"

[tool.IntelliMerge]
timeout = "5m"
fatal_signatures = ["OutOfMemoryError"]

[tool.JDime]
jdime_mode = "structured"
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.harness.workspace, PathBuf::from("ws"));
    assert_eq!(cfg.harness.java, "/usr/lib/jvm/bin/java");
    assert_eq!(cfg.harness.stale_after, Duration::from_secs(30));
    assert_eq!(cfg.resolve_timeout(MergerKind::IntelliMerge), Duration::from_secs(300));
    assert_eq!(cfg.resolve_timeout(MergerKind::AutoMerge), Duration::from_secs(90));
    assert_eq!(
        cfg.fatal_signatures(MergerKind::IntelliMerge),
        vec!["OutOfMemoryError".to_string()]
    );
    assert_eq!(cfg.jdime_mode(), JDimeMode::Structured);
}

#[test]
fn test_builtin_signatures_apply_without_override() {
    let cfg = ConfigFileBuilder::new().build();

    assert_eq!(cfg.fatal_signatures(MergerKind::IntelliMerge).len(), 2);
    assert!(cfg.fatal_signatures(MergerKind::JDime).is_empty());
}

#[test]
fn test_zero_timeout_is_config_error() {
    let result = ConfigFileBuilder::new().with_resolve_timeout("0s").try_build();

    match result {
        Err(MergeBenchError::ConfigError(msg)) => {
            assert!(msg.contains("[timeouts].resolve"), "{msg}");
            assert!(msg.contains("strictly positive"), "{msg}");
        }
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn test_bad_duration_is_config_error() {
    let result = ConfigFileBuilder::new()
        .with_tool_timeout("KDiff3", "soon")
        .try_build();

    assert!(matches!(result, Err(MergeBenchError::ConfigError(msg)) if msg.contains("[tool.KDiff3].timeout")));
}

#[test]
fn test_unknown_tool_is_config_error() {
    let result = ConfigFileBuilder::new()
        .with_tool_timeout("Meld", "1m")
        .try_build();

    assert!(matches!(result, Err(MergeBenchError::ConfigError(msg)) if msg.contains("unknown merger 'Meld'")));
}

#[test]
fn test_tool_names_are_case_insensitive_but_unique() {
    let cfg = ConfigFileBuilder::new()
        .with_tool_timeout("intellimerge", "1m")
        .build();
    assert_eq!(cfg.resolve_timeout(MergerKind::IntelliMerge), Duration::from_secs(60));

    let result = ConfigFileBuilder::new()
        .with_tool_timeout("IntelliMerge", "1m")
        .with_tool_timeout("intellimerge", "2m")
        .try_build();
    assert!(matches!(result, Err(MergeBenchError::ConfigError(msg)) if msg.contains("duplicates")));
}

#[test]
fn test_jdime_mode_only_for_jdime() {
    let result = ConfigFileBuilder::new()
        .with_tool(
            "IntelliMerge",
            ToolSection {
                jdime_mode: Some("structured".to_string()),
                ..ToolSection::default()
            },
        )
        .try_build();

    assert!(matches!(result, Err(MergeBenchError::ConfigError(msg)) if msg.contains("only valid for JDime")));
}

#[test]
fn test_empty_signature_is_rejected() {
    let result = ConfigFileBuilder::new()
        .with_tool(
            "IntelliMerge",
            ToolSection {
                fatal_signatures: Some(vec![String::new()]),
                ..ToolSection::default()
            },
        )
        .try_build();

    assert!(matches!(result, Err(MergeBenchError::ConfigError(_))));
}

#[test]
fn test_invalid_toml_is_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[harness\njava = ").unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(MergeBenchError::TomlError(_))
    ));
}

#[test]
fn test_explicit_missing_config_is_io_error() {
    let result = load_or_default(Some(std::path::Path::new("/definitely/missing/MergeBench.toml")));
    assert!(matches!(result, Err(MergeBenchError::IoError(_))));
}
