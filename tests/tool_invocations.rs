// tests/tool_invocations.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use mergebench::config::ToolSection;
use mergebench::errors::MergeBenchError;
use mergebench::tools::{build_invocation, MergeInputs, MergerKind, SetupStep, Worktrees};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn inputs(kind: MergerKind, tool: &str, workspace: &Path) -> MergeInputs {
    let trees = Worktrees {
        base: workspace.join("demo-base"),
        left: workspace.join("demo-left"),
        right: workspace.join("demo-right"),
        child: workspace.join("demo-child"),
    };
    let tool_result_dir = workspace.join("result").join(kind.name());
    MergeInputs {
        tool: PathBuf::from(tool),
        java: "java".to_string(),
        workspace: workspace.to_path_buf(),
        repo_name: "demo".to_string(),
        repo_dir: workspace.join("demo"),
        worktrees: kind.needs_worktrees().then_some(trees),
        output_dir: tool_result_dir.join("demo"),
        tool_result_dir,
        conflicting_file: "src/Main.java".to_string(),
        merged_file: "src/Main.java".to_string(),
        base_commit: "b1".to_string(),
        left_commit: "l1".to_string(),
        right_commit: "r1".to_string(),
    }
}

#[test]
fn test_detect_merger_from_path() {
    let cases = [
        ("/opt/IntelliMerge/IntelliMerge-1.0.9-all.jar", Some(MergerKind::IntelliMerge)),
        ("MergeTools/JDime/bin/JDime", Some(MergerKind::JDime)),
        ("/opt/featurehouse/FSTMerge.jar", Some(MergerKind::FstMerge)),
        ("/opt/AutoMerge/automerge.jar", Some(MergerKind::AutoMerge)),
        ("C:/Program Files/KDiff3/kdiff3.exe", Some(MergerKind::KDiff3)),
        ("/usr/bin/wiggle", Some(MergerKind::Wiggle)),
        ("/home/me/summer/target/release/summer", Some(MergerKind::Summer)),
        // summer is checked first
        ("/tools/summer/intellimerge-wrapper", Some(MergerKind::Summer)),
        ("/usr/bin/meld", None),
    ];

    for (path, expected) in cases {
        assert_eq!(MergerKind::detect(Path::new(path)), expected, "{path}");
    }
}

#[test]
fn test_merger_names_round_trip() {
    for kind in MergerKind::ALL {
        assert_eq!(MergerKind::from_str(kind.name()), Ok(kind));
    }
    assert_eq!(MergerKind::from_str("fstmerge"), Ok(MergerKind::FstMerge));
    assert!(MergerKind::from_str("meld").is_err());
}

#[test]
fn test_jdime_command_line() -> TestResult {
    let ws = Path::new("/ws");
    let cfg = ConfigFileBuilder::new().build();

    let inv = build_invocation(MergerKind::JDime, &inputs(MergerKind::JDime, "/opt/JDime/bin/JDime", ws), &cfg)?;

    assert_eq!(
        inv.command.display(),
        "(quoting skipped) /opt/JDime/bin/JDime -f --mode linebased,structured \
         --output /ws/result/JDime/demo /ws/demo-left /ws/demo-base /ws/demo-right"
    );
    assert_eq!(inv.options.timeout, Duration::from_secs(180));
    assert!(inv.options.fatal_signatures.is_empty());
    Ok(())
}

#[test]
fn test_jdime_structured_mode() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_tool(
            "JDime",
            ToolSection {
                jdime_mode: Some("structured".to_string()),
                ..ToolSection::default()
            },
        )
        .build();

    let inv = build_invocation(MergerKind::JDime, &inputs(MergerKind::JDime, "JDime", Path::new("/ws")), &cfg)?;

    assert!(inv.command.display().contains(" --mode structured --output "));
    Ok(())
}

#[test]
fn test_intellimerge_has_watchdog_and_custom_timeout() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_java("/jdk/bin/java")
        .with_tool_timeout("IntelliMerge", "5m")
        .build();
    let mut input = inputs(MergerKind::IntelliMerge, "/opt/im.jar", Path::new("/ws"));
    input.java = cfg.harness.java.clone();

    let inv = build_invocation(MergerKind::IntelliMerge, &input, &cfg)?;

    assert_eq!(
        inv.command.display(),
        "(quoting skipped) /jdk/bin/java -jar /opt/im.jar -d /ws/demo-left /ws/demo-base \
         /ws/demo-right -o /ws/result/IntelliMerge/demo"
    );
    assert_eq!(inv.options.timeout, Duration::from_secs(300));
    assert_eq!(
        inv.options.fatal_signatures,
        vec![
            "concurrent.ExecutionException".to_string(),
            "at edu.pku.intellimerge.client.IntelliMerge.main(IntelliMerge.java".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_automerge_runs_next_to_its_jar() -> TestResult {
    let cfg = ConfigFileBuilder::new().build();

    let inv = build_invocation(
        MergerKind::AutoMerge,
        &inputs(MergerKind::AutoMerge, "/opt/automerge/AutoMerge.jar", Path::new("/ws")),
        &cfg,
    )?;

    assert_eq!(
        inv.command.display(),
        "(quoting skipped) java -jar /opt/automerge/AutoMerge.jar -o /ws/result/AutoMerge/demo \
         -m structured -log info -f -S /ws/demo-left /ws/demo-base /ws/demo-right"
    );
    assert_eq!(inv.command.working_dir(), Some(Path::new("/opt/automerge")));
    Ok(())
}

#[test]
fn test_file_level_tools_use_conflicting_file() -> TestResult {
    let cfg = ConfigFileBuilder::new().build();
    let ws = Path::new("/ws");

    let kdiff = build_invocation(MergerKind::KDiff3, &inputs(MergerKind::KDiff3, "kdiff3", ws), &cfg)?;
    assert_eq!(
        kdiff.command.display(),
        "(quoting skipped) kdiff3 /ws/demo-base/src/Main.java /ws/demo-left/src/Main.java \
         /ws/demo-right/src/Main.java -o /ws/result/KDiff3/demo/src/Main.java --auto"
    );

    let wiggle = build_invocation(MergerKind::Wiggle, &inputs(MergerKind::Wiggle, "wiggle", ws), &cfg)?;
    assert_eq!(
        wiggle.command.display(),
        "(quoting skipped) wiggle --merge /ws/demo-base/src/Main.java /ws/demo-left/src/Main.java \
         /ws/demo-right/src/Main.java --output /ws/result/Wiggle/demo/src/Main.java"
    );
    assert!(wiggle
        .setup
        .contains(&SetupStep::RequireFile(PathBuf::from("/ws/demo-left/src/Main.java"))));
    Ok(())
}

#[test]
fn test_summer_passes_commits_and_both_file_names() -> TestResult {
    let cfg = ConfigFileBuilder::new().build();
    let mut input = inputs(MergerKind::Summer, "/opt/summer/summer", Path::new("/ws"));

    let inv = build_invocation(MergerKind::Summer, &input, &cfg)?;
    assert_eq!(
        inv.command.display(),
        "(quoting skipped) /opt/summer/summer merge -C /ws/demo -l l1 -r r1 -b b1 \
         --worktree /ws/result/summer/demo --keep -- src/Main.java"
    );

    input.merged_file = "src/Renamed.java".to_string();
    let inv = build_invocation(MergerKind::Summer, &input, &cfg)?;
    assert!(inv.command.display().ends_with("--keep -- src/Main.java src/Renamed.java"));
    Ok(())
}

#[test]
fn test_missing_worktrees_is_missing_input() {
    let cfg = ConfigFileBuilder::new().build();
    let mut input = inputs(MergerKind::JDime, "JDime", Path::new("/ws"));
    input.worktrees = None;

    let err = build_invocation(MergerKind::JDime, &input, &cfg).unwrap_err();
    assert!(matches!(err, MergeBenchError::MissingInput { .. }));
}

#[test]
fn test_fstmerge_prepare_writes_expression_once() -> TestResult {
    let dir = tempdir()?;
    let cfg = ConfigFileBuilder::new().build();
    let input = inputs(MergerKind::FstMerge, "/opt/FSTMerge.jar", dir.path());

    let inv = build_invocation(MergerKind::FstMerge, &input, &cfg)?;
    let expression = dir.path().join("result/FSTMerge/demo.config");
    assert_eq!(
        inv.command.display(),
        format!(
            "(quoting skipped) java -cp /opt/FSTMerge.jar merger.FSTGenMerger --expression {} \
             --output-directory {} --base-directory {}",
            expression.display(),
            dir.path().join("result/FSTMerge").display(),
            dir.path().display()
        )
    );
    assert_eq!(inv.command.working_dir(), Some(dir.path().join("result/FSTMerge").as_path()));

    inv.prepare()?;
    assert_eq!(
        std::fs::read_to_string(&expression)?,
        "demo-left\ndemo-base\ndemo-right"
    );

    std::fs::write(&expression, "custom")?;
    inv.prepare()?;
    assert_eq!(std::fs::read_to_string(&expression)?, "custom");
    Ok(())
}

#[test]
fn test_wiggle_refuses_missing_input_files() -> TestResult {
    let dir = tempdir()?;
    let cfg = ConfigFileBuilder::new().build();
    let input = inputs(MergerKind::Wiggle, "wiggle", dir.path());

    let inv = build_invocation(MergerKind::Wiggle, &input, &cfg)?;
    match inv.prepare() {
        Err(MergeBenchError::UnsupportedScenario { tool, message }) => {
            assert_eq!(tool, "Wiggle");
            assert!(message.contains("wiggle can't deal with file renaming."), "{message}");
        }
        other => panic!("Expected UnsupportedScenario, got: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_fstmerge_abort_signatures() -> TestResult {
    let cfg = ConfigFileBuilder::new().build();
    let fst = build_invocation(MergerKind::FstMerge, &inputs(MergerKind::FstMerge, "FSTMerge.jar", Path::new("/ws")), &cfg)?;
    let jdime = build_invocation(MergerKind::JDime, &inputs(MergerKind::JDime, "JDime", Path::new("/ws")), &cfg)?;

    let stderr = "error: unknown option: --merge-file\nusage: git merge-file";
    let hint = fst.abort_reason(stderr).expect("abort signature should match");
    assert!(hint.contains("featurehouse_20220107.jar"));

    assert!(fst
        .abort_reason(r#"java.io.IOException: Cannot run program "C:\Programme\cygwin\bin\git.exe""#)
        .is_some());
    assert!(fst.abort_reason("ordinary failure").is_none());
    assert!(jdime.abort_reason(stderr).is_none());
    Ok(())
}
