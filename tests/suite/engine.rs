//! End-to-end engine tests against the fake analysis tool.

#![cfg(unix)]

use std::sync::Arc;

use lintrun_lint::{
    BatchState, BufferedOutput, CancellationToken, ClassifierSettings, LintError, Linter, Progress,
};
use lintrun_types::Severity;

use crate::common::{Project, issue_tag};

fn settings() -> ClassifierSettings {
    ClassifierSettings {
        system_header_markers: vec!["/toolchain/include/".to_string()],
        ..ClassifierSettings::default()
    }
}

fn linter() -> (Linter, Arc<BufferedOutput>) {
    let output = Arc::new(BufferedOutput::new());
    (Linter::new(settings(), output.clone()), output)
}

#[tokio::test]
async fn single_file_routes_source_header_and_system_issues() {
    let project = Project::new();
    let main = project.source_with_report(
        "src/main.c",
        &[
            issue_tag("src/main.c", 12, "613", "Possible use of null pointer"),
            issue_tag("include/util.h", 3, "750", "warning: macro not referenced"),
            issue_tag("/opt/toolchain/include/stdio.h", 40, "7", "fatal error"),
        ],
    );
    let config = project.config();
    let (mut linter, _) = linter();

    let outcome = linter.lint_one(&main, &config).await.unwrap();
    assert_eq!(outcome.counts.source, 1);
    assert_eq!(outcome.counts.header, 1);
    assert_eq!(outcome.counts.system, 1);
    assert!(!outcome.summary_synthesized);
    assert_eq!(outcome.exit_code, Some(0));

    let own = linter.diagnostics(&main, project.root());
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].range().start_line, 11);
    assert_eq!(own[0].severity(), Severity::Information);

    let header = linter.diagnostics(&project.path("include/util.h"), project.root());
    assert_eq!(header.len(), 1);
    assert_eq!(header[0].severity(), Severity::Warning);

    let snapshot = linter.snapshot();
    assert_eq!(snapshot.total_count(), 2);
    assert!(
        snapshot
            .files()
            .iter()
            .all(|(path, _)| !path.to_string_lossy().contains("toolchain"))
    );
}

#[tokio::test]
async fn header_only_issues_put_a_summary_on_the_source() {
    let project = Project::new();
    let main = project.source_with_report(
        "main.c",
        &[
            issue_tag("util.h", 2, "1", "first"),
            issue_tag("util.h", 5, "1", "second"),
        ],
    );
    let (mut linter, _) = linter();

    let outcome = linter.lint_one(&main, &project.config()).await.unwrap();
    assert!(outcome.summary_synthesized);

    let own = linter.diagnostics(&main, project.root());
    assert_eq!(own.len(), 1);
    assert!(own[0].message().contains('2'));
    assert!(own[0].message().contains("headers"));
    assert_eq!(
        linter
            .diagnostics(&project.path("util.h"), project.root())
            .len(),
        2
    );
}

#[tokio::test]
async fn non_zero_exit_still_parses_output() {
    let project = Project::new();
    let main = project.source_with_report(
        "main.c",
        &[issue_tag("main.c", 1, "10", "syntax error")],
    );
    project.exit_status("main.c", 2);
    let (mut linter, _) = linter();

    let outcome = linter.lint_one(&main, &project.config()).await.unwrap();
    assert_eq!(outcome.exit_code, Some(2));
    assert_eq!(outcome.counts.source, 1);
    assert_eq!(linter.snapshot().error_count(), 1);
}

#[tokio::test]
async fn stderr_is_part_of_the_report() {
    let project = Project::new();
    let main = project.write("main.c", "");
    project.stderr_for(
        "main.c",
        &(issue_tag("main.c", 4, "530", "warning: uninitialized") + "\n"),
    );
    let (mut linter, output) = linter();

    let outcome = linter.lint_one(&main, &project.config()).await.unwrap();
    assert_eq!(outcome.counts.source, 1);
    assert!(output.tool_lines().iter().any(|l| l.contains("<issue")));
}

#[tokio::test]
async fn option_file_carries_includes_and_definitions() {
    let project = Project::new();
    project.write("include/.keep", "");
    project.write("lint/std.lnt", "");
    let main = project.source_with_report("main.c", &[]);
    let mut config = project.config();
    config.config_files = vec!["std.lnt".to_string(), "absent.lnt".to_string()];
    config.include_paths = vec!["include".to_string(), "missing".to_string()];
    config.definitions = vec!["DEBUG".to_string()];
    let (mut linter, output) = linter();

    linter.lint_one(&main, &config).await.unwrap();
    let options = project.options_seen();
    assert!(options.starts_with("+xml(doc)"));
    assert!(options.contains(&format!("-i\"{}\"", project.path("include").display())));
    assert!(!options.contains("missing"));
    assert!(options.contains("-dDEBUG"));
    assert!(output.contains("absent.lnt"));
}

#[tokio::test]
async fn project_properties_add_include_paths() {
    let project = Project::new();
    project.write("vendor/.keep", "");
    project.write(
        ".vscode/c_cpp_properties.json",
        r#"{"configurations": [{"name": "Linux", "includePath": ["${workspaceFolder}/vendor/**"]}]}"#,
    );
    let main = project.source_with_report("main.c", &[]);
    let mut config = project.config();
    config.harvest_project_includes = true;
    let (mut linter, _) = linter();

    linter.lint_one(&main, &config).await.unwrap();
    assert!(
        project
            .options_seen()
            .contains(&format!("-i\"{}\"", project.path("vendor").display()))
    );
}

#[tokio::test]
async fn batch_accumulates_and_skips_repeated_header_issues() {
    let project = Project::new();
    let shared = issue_tag("common.h", 7, "9", "macro redefined");
    let a = project.source_with_report("a.c", &[issue_tag("a.c", 1, "1", "a"), shared.clone()]);
    let b = project.source_with_report("b.c", &[issue_tag("b.c", 1, "1", "b"), shared]);
    let c = project.source_with_report("c.c", &[]);
    let (mut linter, _) = linter();

    let summary = linter
        .lint_many(&[a.clone(), b.clone(), c], &project.config(), None, None)
        .await
        .unwrap();
    assert_eq!(summary.files_processed, 3);
    assert_eq!(summary.files_with_issues, 2);
    assert_eq!(summary.total_issues, 3);
    assert_eq!(summary.duplicates_skipped, 1);
    assert_eq!(linter.batch_state(), BatchState::Completed);

    let store = linter.store();
    assert_eq!(store.get(&a).len(), 1);
    assert_eq!(store.get(&b).len(), 1);
    assert_eq!(store.get(&project.path("common.h")).len(), 1);
}

#[tokio::test]
async fn batch_cancelled_midway_keeps_earlier_results() {
    let project = Project::new();
    let files: Vec<_> = (0..4)
        .map(|i| {
            let name = format!("f{i}.c");
            project.source_with_report(&name, &[issue_tag(&name, 1, "1", "m")])
        })
        .collect();
    let token = CancellationToken::new();
    let trigger = token.clone();
    let mut on_progress = move |p: Progress| {
        if p.processed == 1 {
            trigger.cancel();
        }
    };
    let (mut linter, _) = linter();

    let err = linter
        .lint_many(&files, &project.config(), Some(&mut on_progress), Some(&token))
        .await
        .unwrap_err();
    assert!(matches!(err, LintError::Cancelled { processed: 1 }));
    assert_eq!(linter.batch_state(), BatchState::Cancelled);
    assert_eq!(linter.store().get(&files[0]).len(), 1);
    assert!(files[1..].iter().all(|f| linter.store().get(f).is_empty()));
}

#[tokio::test]
async fn missing_executable_fails_before_any_work() {
    let project = Project::new();
    let main = project.source_with_report("main.c", &[issue_tag("main.c", 1, "1", "m")]);
    let mut config = project.config();
    config.executable = project.path("bin/not-there");
    let (mut linter, _) = linter();

    let err = linter
        .lint_many(&[main], &config, None, None)
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(linter.batch_state(), BatchState::Failed);
    assert!(project.options_seen().is_empty());
}
