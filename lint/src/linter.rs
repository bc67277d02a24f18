//! `Linter` facade: the public API consumed by editor hosts and the CLI.
//!
//! Owns the diagnostics store and the output sink; both are injected at
//! construction. Each action runs one invocation at a time and touches the
//! store only from the calling task, so no locking is needed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintrun_types::{DiagnosticEntry, MergePolicy};

use crate::batch::BatchState;
use crate::classify::{ClassifiedReport, Classifier};
use crate::diagnostics::DiagnosticsStore;
use crate::error::LintError;
use crate::invocation::{Invoke, ProcessInvoker, RawOutput};
use crate::output::OutputSink;
use crate::paths;
use crate::report::{self, ParsedReport};
use crate::types::{
    ClassifierSettings, DiagnosticsSnapshot, InvocationConfig, LintOutcome, SaveTrigger,
};

pub struct Linter<I = ProcessInvoker> {
    pub(crate) invoker: I,
    pub(crate) diagnostics: DiagnosticsStore,
    pub(crate) output: Arc<dyn OutputSink>,
    pub(crate) settings: ClassifierSettings,
    pub(crate) batch_state: BatchState,
}

impl Linter<ProcessInvoker> {
    /// Linter that launches the real tool.
    #[must_use]
    pub fn new(settings: ClassifierSettings, output: Arc<dyn OutputSink>) -> Self {
        let invoker = ProcessInvoker::new(Arc::clone(&output));
        Self::with_invoker(invoker, settings, output)
    }
}

impl<I: Invoke> Linter<I> {
    #[must_use]
    pub fn with_invoker(invoker: I, settings: ClassifierSettings, output: Arc<dyn OutputSink>) -> Self {
        Self {
            invoker,
            diagnostics: DiagnosticsStore::new(),
            output,
            settings,
            batch_state: BatchState::Idle,
        }
    }

    /// Lint a single file.
    ///
    /// The file's previous diagnostics are replaced, as are those of every
    /// other file this invocation reported on. Other files are left alone.
    pub async fn lint_one(
        &mut self,
        path: &Path,
        config: &InvocationConfig,
    ) -> Result<LintOutcome, LintError> {
        let root = self.prepare(config)?;
        self.output.line(&format!("Linting {}", path.display()));

        let raw = match self.invoker.invoke(&[path.to_path_buf()], config).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(path = %path.display(), "Lint failed: {e}");
                self.output.line(&format!("Lint failed for {}: {e}", path.display()));
                return Err(e);
            }
        };

        let (mut report, mut outcome) = self.interpret(path, &root, &raw);
        outcome.summary_synthesized = report.synthesize_summary(&self.settings.source_tag);
        outcome.entries_merged = self.merge_report(report, MergePolicy::Replace);
        self.output.line(&outcome_line(&outcome));
        Ok(outcome)
    }

    /// Lint `path` if `trigger` says saved files of its kind should be.
    ///
    /// Returns `None` when the save is ignored.
    pub async fn on_file_saved(
        &mut self,
        path: &Path,
        config: &InvocationConfig,
        trigger: &SaveTrigger,
    ) -> Option<Result<LintOutcome, LintError>> {
        if !trigger.matches(path) {
            tracing::trace!(path = %path.display(), "Save does not trigger a lint");
            return None;
        }
        Some(self.lint_one(path, config).await)
    }

    /// Check `config` and resolve the root relative paths are judged against.
    pub(crate) fn prepare(&self, config: &InvocationConfig) -> Result<PathBuf, LintError> {
        if let Err(e) = config.validate() {
            tracing::error!("Invalid lint configuration: {e}");
            self.output.line(&format!("Configuration error: {e}"));
            return Err(e.into());
        }
        config.working_dir().map_err(|source| LintError::Io {
            action: "resolving the working directory",
            source,
        })
    }

    /// Parse and classify one invocation's output for `invoked`.
    ///
    /// No summary entry is added; callers synthesize it once the report
    /// holds exactly what will be merged.
    pub(crate) fn interpret(
        &self,
        invoked: &Path,
        root: &Path,
        raw: &RawOutput,
    ) -> (ClassifiedReport, LintOutcome) {
        let mut outcome = LintOutcome {
            file: paths::normalize(invoked, root),
            exit_code: raw.exit_code,
            ..LintOutcome::default()
        };

        let records = match report::parse(&raw.combined()) {
            ParsedReport::NoOutput => {
                outcome.no_output = true;
                self.output.line("The analysis tool produced no output");
                Vec::new()
            }
            ParsedReport::Structured(records) => records,
            ParsedReport::FreeText(lines) => {
                outcome.free_text_issues = lines.len();
                for line in &lines {
                    if let Some(file) = &line.file {
                        tracing::debug!(file = %file, "Unstructured issue line");
                    }
                    self.output.line(&line.text);
                }
                Vec::new()
            }
        };

        let classifier = Classifier::new(&self.settings, root);
        let report = classifier.classify_records(&records, invoked);
        outcome.counts = report.counts;

        if !raw.success() && outcome.issue_count() == 0 {
            tracing::warn!(
                path = %invoked.display(),
                exit_code = ?raw.exit_code,
                "Tool exited unsuccessfully without reporting issues"
            );
        }
        if report.counts.system > 0 {
            tracing::debug!(
                path = %invoked.display(),
                suppressed = report.counts.system,
                "Suppressed system header issues"
            );
        }

        (report, outcome)
    }

    /// Merge every file of `report` into the store. Returns entries merged.
    pub(crate) fn merge_report(&mut self, report: ClassifiedReport, policy: MergePolicy) -> usize {
        let mut merged = 0;
        for (file, entries) in report.files {
            merged += entries.len();
            self.diagnostics.merge(file, entries, policy);
        }
        merged
    }

    pub fn clear_all(&mut self) {
        self.diagnostics.clear();
        self.output.line("Cleared all lint diagnostics");
    }

    /// Current entries for `path`, resolved the way reported paths are.
    #[must_use]
    pub fn diagnostics(&self, path: &Path, root: &Path) -> &[DiagnosticEntry] {
        self.diagnostics.get(&paths::normalize(path, root))
    }

    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    #[must_use]
    pub fn store(&self) -> &DiagnosticsStore {
        &self.diagnostics
    }

    #[must_use]
    pub fn batch_state(&self) -> BatchState {
        self.batch_state
    }
}

fn outcome_line(outcome: &LintOutcome) -> String {
    let counts = outcome.counts;
    let mut line = format!(
        "{}: {} in file, {} in headers, {} in other files",
        outcome.file.display(),
        counts.source,
        counts.header,
        counts.other
    );
    if counts.system > 0 {
        line.push_str(&format!(", {} suppressed in system headers", counts.system));
    }
    if outcome.free_text_issues > 0 {
        line.push_str(&format!(", {} unstructured", outcome.free_text_issues));
    }
    line
}
