//! Editor-facing diagnostic entries.

use std::path::Path;

use serde::Serialize;

use crate::{LineSpan, Severity};

/// Highlight width used when the tool reports no end column.
pub const HIGHLIGHT_WIDTH: u32 = 20;

/// A 0-indexed range in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DiagnosticRange {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl DiagnosticRange {
    /// Single-line range starting at `(line, col)` spanning [`HIGHLIGHT_WIDTH`] columns.
    #[must_use]
    pub fn at(line: u32, col: u32) -> Self {
        Self {
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col.saturating_add(HIGHLIGHT_WIDTH),
        }
    }

    /// Range for a 1-based reported span.
    #[must_use]
    pub fn from_span(span: LineSpan) -> Self {
        Self::at(span.line.saturating_sub(1), span.column)
    }
}

/// The externally visible unit of the diagnostic store.
///
/// Fields are private; external consumers read via accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEntry {
    range: DiagnosticRange,
    message: String,
    severity: Severity,
    code: String,
    /// Tag naming the producer, e.g. "lint".
    source: String,
}

impl DiagnosticEntry {
    #[must_use]
    pub fn new(
        range: DiagnosticRange,
        message: String,
        severity: Severity,
        code: String,
        source: String,
    ) -> Self {
        Self {
            range,
            message,
            severity,
            code,
            source,
        }
    }

    #[must_use]
    pub fn range(&self) -> DiagnosticRange {
        self.range
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Format as `path:line:col: severity: [source code] message` (1-indexed for display).
    #[must_use]
    pub fn display_with_path(&self, path: &Path) -> String {
        let tag = if self.code.is_empty() {
            self.source.clone()
        } else {
            format!("{} {}", self.source, self.code)
        };
        format!(
            "{}:{}:{}: {}: [{}] {}",
            path.display(),
            self.range.start_line + 1,
            self.range.start_col + 1,
            self.severity.label(),
            tag,
            self.message,
        )
    }
}
