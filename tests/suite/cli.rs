//! The `lintrun` binary end to end.

#![cfg(unix)]

use std::path::Path;
use std::process::{Command, Output};

use lintrun_config::CONFIG_FILE_NAME;

use crate::common::{Project, issue_tag};

fn lintrun(project: &Project, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lintrun"))
        .args(args)
        .current_dir(project.root())
        .env_remove("LINTRUN_EXECUTABLE")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn write_config(project: &Project, exe: &Path) {
    project.write(
        CONFIG_FILE_NAME,
        &format!(
            "[tool]\nexecutable = \"{}\"\nrepository_root = \".\"\n",
            exe.display()
        ),
    );
}

#[test]
fn check_exits_one_on_errors() {
    let project = Project::new();
    write_config(&project, &project.fake_tool());
    project.source_with_report("main.c", &[issue_tag("main.c", 2, "10", "syntax error")]);

    let out = lintrun(&project, &["check", "main.c"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("main.c:2:1: error: [lint 10] syntax error"));
    assert!(stdout.contains("E:1 W:0 I:0"));
}

#[test]
fn check_exits_zero_without_errors() {
    let project = Project::new();
    write_config(&project, &project.fake_tool());
    project.source_with_report("main.c", &[issue_tag("main.c", 2, "530", "warning: x")]);

    let out = lintrun(&project, &["check", "main.c"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("E:0 W:1 I:0"));
}

#[test]
fn batch_json_reports_summary() {
    let project = Project::new();
    write_config(&project, &project.fake_tool());
    project.source_with_report("src/a.c", &[issue_tag("src/a.c", 1, "530", "warning: a")]);
    project.source_with_report("src/b.c", &[]);
    project.write("src/readme.md", "");

    let out = lintrun(&project, &["batch", "src", "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["summary"]["files_processed"], 2);
    assert_eq!(value["summary"]["files_with_issues"], 1);
    assert_eq!(value["warnings"], 1);
    assert_eq!(value["cancelled"], false);
}

#[test]
fn batch_glob_limits_files() {
    let project = Project::new();
    write_config(&project, &project.fake_tool());
    project.source_with_report("src/a.c", &[issue_tag("src/a.c", 1, "10", "syntax error")]);
    project.source_with_report("test/t.c", &[issue_tag("test/t.c", 1, "10", "syntax error")]);

    let out = lintrun(&project, &["batch", "--glob", "src/**/*.c", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["summary"]["files_total"], 1);
    assert_eq!(value["errors"], 1);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn missing_executable_is_a_failure() {
    let project = Project::new();
    write_config(&project, &project.path("bin/nothing"));
    project.source_with_report("main.c", &[]);

    let out = lintrun(&project, &["check", "main.c"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not found"));
}

#[test]
fn config_command_prints_effective_settings() {
    let project = Project::new();
    let exe = project.fake_tool();
    write_config(&project, &exe);

    let out = lintrun(&project, &["config", "--format", "json"]);
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["executable"], exe.display().to_string());
    assert_eq!(value["output_format"], "xml");
}
