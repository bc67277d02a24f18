//! Batch driver: lint many files one after another.
//!
//! The store is cleared once at the start and every invocation accumulates
//! into it. Cancellation is honored between files only. A file whose
//! invocation fails is logged and skipped; only configuration errors abort.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::slice;

use lintrun_types::{DiagnosticEntry, MergePolicy};
use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::classify::ClassifiedReport;
use crate::error::LintError;
use crate::invocation::Invoke;
use crate::linter::Linter;
use crate::types::{BatchSummary, InvocationConfig, Progress};

/// Progress is reported about this many times per run.
const PROGRESS_STEPS: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Files between progress notifications.
#[must_use]
pub fn progress_step(total: usize) -> usize {
    total.div_ceil(PROGRESS_STEPS).max(1)
}

type EntryKey = (PathBuf, u32, u32, String, String);

fn entry_key(file: &Path, entry: &DiagnosticEntry) -> EntryKey {
    let range = entry.range();
    (
        file.to_path_buf(),
        range.start_line,
        range.start_col,
        entry.code().to_string(),
        entry.message().to_string(),
    )
}

/// Entries already merged earlier in the run. Headers included by several
/// sources get reported once per source; only the first report is kept.
#[derive(Debug, Default)]
struct SeenEntries {
    keys: HashSet<EntryKey>,
}

impl SeenEntries {
    /// Drop entries merged by an earlier invocation. Returns how many.
    fn filter(&self, report: &mut ClassifiedReport) -> usize {
        let mut dropped = 0;
        for (file, entries) in &mut report.files {
            let before = entries.len();
            entries.retain(|e| !self.keys.contains(&entry_key(file, e)));
            dropped += before - entries.len();
        }
        dropped
    }

    fn record(&mut self, report: &ClassifiedReport) {
        for (file, entries) in &report.files {
            self.keys
                .extend(entries.iter().map(|e| entry_key(file, e)));
        }
    }
}

impl<I: Invoke> Linter<I> {
    /// Lint `files` in order, one invocation each.
    ///
    /// Returns [`LintError::Cancelled`] when `cancel` fires before the last
    /// file; diagnostics of files already processed stay in the store.
    pub async fn lint_many(
        &mut self,
        files: &[PathBuf],
        config: &InvocationConfig,
        mut on_progress: Option<&mut (dyn FnMut(Progress) + Send)>,
        cancel: Option<&CancellationToken>,
    ) -> Result<BatchSummary, LintError> {
        self.batch_state = BatchState::Running;
        let root = match self.prepare(config) {
            Ok(root) => root,
            Err(e) => {
                self.batch_state = BatchState::Failed;
                return Err(e);
            }
        };

        self.diagnostics.clear();
        let total = files.len();
        let step = progress_step(total);
        let mut summary = BatchSummary {
            files_total: total,
            ..BatchSummary::default()
        };
        let mut seen = SeenEntries::default();

        tracing::info!(total, "Starting batch lint");
        self.output.line(&format!("Linting {total} file(s)"));

        for file in files {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                self.batch_state = BatchState::Cancelled;
                let processed = summary.files_processed;
                tracing::info!(processed, total, "Batch lint cancelled");
                self.output
                    .line(&format!("Cancelled after {processed} of {total} file(s)"));
                return Err(LintError::Cancelled { processed });
            }

            tracing::debug!(path = %file.display(), "Linting");
            match self.invoker.invoke(slice::from_ref(file), config).await {
                Ok(raw) => {
                    let (mut report, outcome) = self.interpret(file, &root, &raw);
                    let dropped = seen.filter(&mut report);
                    seen.record(&report);
                    report.synthesize_summary(&self.settings.source_tag);
                    self.merge_report(report, MergePolicy::Accumulate);

                    let issues = outcome.issue_count().saturating_sub(dropped);
                    summary.duplicates_skipped += dropped;
                    summary.total_issues += issues;
                    if issues > 0 {
                        summary.files_with_issues += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %file.display(), "Lint failed, continuing: {e}");
                    self.output
                        .line(&format!("Lint failed for {}: {e}", file.display()));
                    summary.failed.push((file.clone(), e.to_string()));
                }
            }

            summary.files_processed += 1;
            let processed = summary.files_processed;
            if (processed % step == 0 || processed == total)
                && let Some(report_progress) = on_progress.as_deref_mut()
            {
                report_progress(Progress { processed, total });
            }
        }

        self.batch_state = BatchState::Completed;
        tracing::info!(
            processed = summary.files_processed,
            with_issues = summary.files_with_issues,
            issues = summary.total_issues,
            failed = summary.failed.len(),
            "Batch lint finished"
        );
        self.output.line(&format!(
            "Processed {} file(s): {} with issues, {} issue(s) total",
            summary.files_processed, summary.files_with_issues, summary.total_issues
        ));
        if !summary.failed.is_empty() {
            self.output
                .line(&format!("{} file(s) could not be linted", summary.failed.len()));
        }
        Ok(summary)
    }
}
