// tests/report_summary.rs

use std::error::Error;

use mergebench::errors::MergeBenchError;
use mergebench::harness::{parse_csv, write_csv, CompareRow, DiffSize, Summary};

type TestResult = Result<(), Box<dyn Error>>;

fn row(repo: &str, file: &str, diff: DiffSize) -> CompareRow {
    CompareRow {
        repo: repo.to_string(),
        conflicting_file: file.to_string(),
        diff,
    }
}

#[test]
fn test_csv_output_quotes_when_needed() -> TestResult {
    let rows = vec![
        row("alpha", "src/Main.java", DiffSize::Chars(0)),
        row("beta", "docs/a,b.md", DiffSize::Unavailable),
        row("gamma", "say \"hi\".txt", DiffSize::Chars(12)),
    ];
    let mut out = Vec::new();

    write_csv(&mut out, &rows)?;

    assert_eq!(
        String::from_utf8(out)?,
        "repo,conflicting file,diff size\r\n\
         alpha,src/Main.java,0\r\n\
         beta,\"docs/a,b.md\",-\r\n\
         gamma,\"say \"\"hi\"\".txt\",12\r\n"
    );
    Ok(())
}

#[test]
fn test_parse_csv_reads_quoted_fields() {
    let records = parse_csv("a,\"b,c\",\"d\"\"e\"\r\nx,,z\n");

    assert_eq!(
        records,
        vec![
            vec!["a".to_string(), "b,c".to_string(), "d\"e".to_string()],
            vec!["x".to_string(), String::new(), "z".to_string()],
        ]
    );
}

#[test]
fn test_parse_csv_keeps_inner_quotes_and_lone_carriage_returns() {
    let records = parse_csv("say \"hi\",x\r\n\"a\rb\",c\rd\r\n\"\"");

    assert_eq!(
        records,
        vec![
            vec!["say \"hi\"".to_string(), "x".to_string()],
            vec!["a\rb".to_string(), "c\rd".to_string()],
            vec![String::new()],
        ]
    );
}

#[test]
fn test_summary_splits_java_and_other_files() -> TestResult {
    let mut csv = String::from("repo,conflicting file,diff size\n");
    for (i, size) in [0, 40, 7, 0, 13, 99, 5, 21, 300].iter().enumerate() {
        csv.push_str(&format!("j{i},src/F{i}.java,{size}\n"));
    }
    csv.push_str("n1,README.md,0\nn2,pom.xml,8\nn3,a.txt,-\nn4,b.gradle,3\nn5,c.yml,50\nn6,d.json,9\n");

    let summary = Summary::from_csv(&csv)?;

    assert_eq!(summary.java_identical, 2);
    assert_eq!(summary.other_identical, 1);
    assert_eq!(
        summary.to_string(),
        "Java Files (Top 5 by diff size)\n\
         2 are identical\n\
         \\ShowDiffSize{j6}{5}\n\
         \\ShowDiffSize{j2}{7}\n\
         \\ShowDiffSize{j4}{13}\n\
         \\ShowDiffSize{j7}{21}\n\
         \\ShowDiffSize{j1}{40}\n\
         \n\
         Non-Java Files (Top 3 by diff size)\n\
         1 are identical\n\
         \\ShowDiffSize{n4}{3}\n\
         \\ShowDiffSize{n2}{8}\n\
         \\ShowDiffSize{n6}{9}\n"
    );
    Ok(())
}

#[test]
fn test_summary_of_written_report() -> TestResult {
    let rows = vec![
        row("alpha", "src/Main.java", DiffSize::Chars(0)),
        row("beta", "src/B.java", DiffSize::Chars(4)),
        row("gamma", "x.md", DiffSize::Unavailable),
    ];
    let mut out = Vec::new();
    write_csv(&mut out, &rows)?;

    let summary = Summary::from_csv(&String::from_utf8(out)?)?;

    assert_eq!(summary.java_identical, 1);
    assert_eq!(summary.java, vec![("beta".to_string(), 4)]);
    assert!(summary.other.is_empty());
    assert_eq!(summary.other_identical, 0);
    Ok(())
}

#[test]
fn test_summary_requires_header_columns() {
    assert!(matches!(
        Summary::from_csv("repo,file\nalpha,x\n"),
        Err(MergeBenchError::ReportError(msg))
            if msg.contains("'conflicting file'") && msg.contains("'diff size'") && !msg.contains("'repo'")
    ));
    assert!(matches!(
        Summary::from_csv("repo,conflicting file\nalpha,x\n"),
        Err(MergeBenchError::ReportError(msg)) if msg.contains("'diff size'")
    ));
    assert!(matches!(Summary::from_csv(""), Err(MergeBenchError::ReportError(_))));
}
