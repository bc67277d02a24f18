//! Issue classifier: severity, system-header filtering, file routing.
//!
//! Severity is a best-effort heuristic over English message text. The tool
//! does not report it structurally, so the rule below is the whole contract:
//!
//! 1. `Error` when the message contains `"error"` (case-sensitive) or the
//!    code is one of [`FATAL_CODES`];
//! 2. otherwise `Warning` when the message contains `"warning"`;
//! 3. otherwise `Information`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lintrun_types::{DiagnosticEntry, DiagnosticRange, FileRoute, IssueRecord, Severity};
use serde::Serialize;

use crate::paths;
use crate::types::ClassifierSettings;

/// Codes treated as errors regardless of message text.
pub const FATAL_CODES: [&str; 2] = ["7", "322"];

#[must_use]
pub fn severity_for(code: &str, message: &str) -> Severity {
    if message.contains("error") || FATAL_CODES.contains(&code) {
        Severity::Error
    } else if message.contains("warning") {
        Severity::Warning
    } else {
        Severity::Information
    }
}

/// One classified record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Normalized identity of the file the record is about.
    pub file: PathBuf,
    pub route: FileRoute,
    /// `None` exactly when `route` is [`FileRoute::SystemHeader`].
    pub entry: Option<DiagnosticEntry>,
}

/// Per-route counts for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteCounts {
    pub source: usize,
    pub header: usize,
    pub other: usize,
    pub system: usize,
}

impl RouteCounts {
    fn record(&mut self, route: FileRoute) {
        match route {
            FileRoute::SourceFile => self.source += 1,
            FileRoute::HeaderFile => self.header += 1,
            FileRoute::OtherFile => self.other += 1,
            FileRoute::SystemHeader => self.system += 1,
        }
    }

    /// Entries that reach the store, excluding any synthesized summary.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.source + self.header + self.other
    }
}

/// Everything one invocation contributes to the store.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedReport {
    /// Invoked file first (always present, possibly empty), then other
    /// files in first-seen order. Entries keep document order.
    pub files: Vec<(PathBuf, Vec<DiagnosticEntry>)>,
    pub counts: RouteCounts,
    /// Whether an informational summary was placed first for the invoked file.
    pub summary_synthesized: bool,
}

impl ClassifiedReport {
    #[must_use]
    pub fn entries_for(&self, path: &Path) -> &[DiagnosticEntry] {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map_or(&[], |(_, items)| items.as_slice())
    }

    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files.iter().map(|(_, items)| items.len()).sum()
    }

    /// When nothing landed on the invoked file but headers or other files
    /// hold entries, place an informational summary first on the invoked
    /// file. Counts are taken from the entries present now.
    pub fn synthesize_summary(&mut self, source_tag: &str) -> bool {
        let Some(((_, own), rest)) = self.files.split_first() else {
            return false;
        };
        if !own.is_empty() {
            return false;
        }
        let (mut header, mut other) = (0, 0);
        for (path, entries) in rest {
            if paths::is_header(path) {
                header += entries.len();
            } else {
                other += entries.len();
            }
        }
        if header + other == 0 {
            return false;
        }

        let summary = DiagnosticEntry::new(
            DiagnosticRange::at(0, 0),
            summary_message(header, other),
            Severity::Information,
            String::new(),
            source_tag.to_string(),
        );
        self.files[0].1.insert(0, summary);
        self.summary_synthesized = true;
        true
    }
}

pub struct Classifier<'a> {
    settings: &'a ClassifierSettings,
    root: &'a Path,
}

impl<'a> Classifier<'a> {
    /// `root` resolves relative reported paths; it should be absolute.
    #[must_use]
    pub fn new(settings: &'a ClassifierSettings, root: &'a Path) -> Self {
        Self { settings, root }
    }

    fn is_system_header(&self, reported: &str) -> bool {
        self.settings
            .system_header_markers
            .iter()
            .any(|marker| !marker.is_empty() && reported.contains(marker.as_str()))
    }

    /// Route a record relative to the (normalized) invoked file.
    #[must_use]
    pub fn route(&self, record: &IssueRecord, invoked: &Path) -> (PathBuf, FileRoute) {
        let file = paths::normalize_reported(record.file_path(), self.root);
        let route = if self.is_system_header(record.file_path()) {
            FileRoute::SystemHeader
        } else if file == invoked {
            FileRoute::SourceFile
        } else if paths::is_header(&file) {
            FileRoute::HeaderFile
        } else {
            FileRoute::OtherFile
        };
        (file, route)
    }

    #[must_use]
    pub fn classify(&self, record: &IssueRecord, invoked: &Path) -> Classified {
        let (file, route) = self.route(record, invoked);
        let entry = route.is_emitted().then(|| {
            DiagnosticEntry::new(
                DiagnosticRange::from_span(record.span()),
                record.message().to_string(),
                severity_for(record.code(), record.message()),
                record.code().to_string(),
                self.settings.source_tag.clone(),
            )
        });
        Classified { file, route, entry }
    }

    /// Classify all records of one invocation of `invoked`, including the
    /// summary entry described at [`ClassifiedReport::synthesize_summary`].
    #[must_use]
    pub fn classify_invocation(&self, records: &[IssueRecord], invoked: &Path) -> ClassifiedReport {
        let mut report = self.classify_records(records, invoked);
        report.synthesize_summary(&self.settings.source_tag);
        report
    }

    /// Classify all records of one invocation without adding a summary.
    #[must_use]
    pub fn classify_records(&self, records: &[IssueRecord], invoked: &Path) -> ClassifiedReport {
        let invoked = paths::normalize(invoked, self.root);
        let mut report = ClassifiedReport {
            files: vec![(invoked.clone(), Vec::new())],
            ..ClassifiedReport::default()
        };
        let mut index: HashMap<PathBuf, usize> = HashMap::from([(invoked.clone(), 0)]);

        for record in records {
            let classified = self.classify(record, &invoked);
            report.counts.record(classified.route);
            let Some(entry) = classified.entry else {
                tracing::trace!(
                    file = record.file_path(),
                    code = record.code(),
                    "Suppressed system header issue"
                );
                continue;
            };
            let slot = *index.entry(classified.file.clone()).or_insert_with(|| {
                report.files.push((classified.file, Vec::new()));
                report.files.len() - 1
            });
            report.files[slot].1.push(entry);
        }
        report
    }
}

fn summary_message(header: usize, other: usize) -> String {
    format!(
        "No issues in this file itself; {} in included headers, {} in other files",
        plural(header, "issue"),
        plural(other, "issue"),
    )
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
