//! Diagnostics rendering for the terminal and for machine consumers.

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use lintrun_lint::{BatchSummary, DiagnosticsSnapshot, InvocationConfig, LintOutcome};
use lintrun_types::DiagnosticEntry;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: &'a Path,
    diagnostics: &'a [DiagnosticEntry],
}

#[derive(Serialize)]
struct Report<'a> {
    files: Vec<FileReport<'a>>,
    errors: usize,
    warnings: usize,
    information: usize,
    cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a LintOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a BatchSummary>,
}

/// What a run produced besides the diagnostics themselves.
#[derive(Clone, Copy)]
pub enum RunResult<'a> {
    Single(&'a LintOutcome),
    Batch(&'a BatchSummary),
    Cancelled,
}

/// One `path:line:col: severity: [tag] message` line per entry, paths
/// shown relative to `cwd` where possible, then a status line.
pub fn text(snapshot: &DiagnosticsSnapshot, cwd: &Path) -> String {
    let mut out = String::new();
    for (path, entries) in snapshot.files() {
        let shown = path.strip_prefix(cwd).unwrap_or(path);
        for entry in entries {
            out.push_str(&entry.display_with_path(shown));
            out.push('\n');
        }
    }
    if snapshot.is_empty() {
        out.push_str("No issues found\n");
    } else {
        out.push_str(&snapshot.status_string());
        out.push('\n');
    }
    out
}

pub fn json(snapshot: &DiagnosticsSnapshot, result: RunResult<'_>) -> Result<String> {
    let (outcome, summary) = match result {
        RunResult::Single(outcome) => (Some(outcome), None),
        RunResult::Batch(summary) => (None, Some(summary)),
        RunResult::Cancelled => (None, None),
    };
    let report = Report {
        files: snapshot
            .files()
            .iter()
            .map(|(path, diagnostics)| FileReport { path, diagnostics })
            .collect(),
        errors: snapshot.error_count(),
        warnings: snapshot.warning_count(),
        information: snapshot.info_count(),
        cancelled: matches!(result, RunResult::Cancelled),
        outcome,
        summary,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn render(
    format: OutputFormat,
    snapshot: &DiagnosticsSnapshot,
    result: RunResult<'_>,
    cwd: &Path,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text(snapshot, cwd)),
        OutputFormat::Json => json(snapshot, result),
    }
}

/// The effective invocation settings, as `lintrun config` prints them.
pub fn config(
    format: OutputFormat,
    invocation: &InvocationConfig,
    source: Option<&Path>,
) -> Result<String> {
    let root = invocation
        .repository_root
        .as_ref()
        .map(|p| p.display().to_string());
    if format == OutputFormat::Json {
        let value = serde_json::json!({
            "source": source.map(|p| p.display().to_string()),
            "executable": invocation.executable.display().to_string(),
            "config_files": invocation.config_files,
            "include_paths": invocation.include_paths,
            "definitions": invocation.definitions,
            "extra_args": invocation.extra_args,
            "repository_root": root,
            "harvest_project_includes": invocation.harvest_project_includes,
            "output_format": invocation.output_format,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let source = source.map_or_else(|| "(defaults)".to_string(), |p| p.display().to_string());
    let lines = [
        format!("source = {source}"),
        format!("executable = {}", invocation.executable.display()),
        format!("config_files = {:?}", invocation.config_files),
        format!("include_paths = {:?}", invocation.include_paths),
        format!("definitions = {:?}", invocation.definitions),
        format!("extra_args = {:?}", invocation.extra_args),
        format!(
            "repository_root = {}",
            root.as_deref().unwrap_or("(current directory)")
        ),
        format!(
            "harvest_project_includes = {}",
            invocation.harvest_project_includes
        ),
        format!("output_format = {}", invocation.output_format),
    ];
    Ok(lines.join("\n") + "\n")
}
