//! Core domain types for lintrun.
//!
//! This crate contains pure domain types with no IO and no async. The lint
//! engine produces them; editor-facing collaborators (the CLI, an editor
//! host) only read them.

mod diagnostic;
mod issue;

pub use diagnostic::{DiagnosticEntry, DiagnosticRange, HIGHLIGHT_WIDTH};
pub use issue::{IssueRecord, LineSpan};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Severity
// ============================================================================

/// Severity level of a diagnostic.
///
/// Derived from free text by the classifier; the external tool never
/// reports it structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl Severity {
    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Routing and merge policy
// ============================================================================

/// Where a reported issue belongs relative to the file that was linted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRoute {
    /// The issue is in the file this invocation was run for.
    SourceFile,
    /// The issue is in a `.h`/`.hpp` file pulled in by the source file.
    HeaderFile,
    /// The issue is in some other file.
    OtherFile,
    /// The issue is in a toolchain-bundled header and is never emitted.
    SystemHeader,
}

impl FileRoute {
    /// Whether entries with this route reach the diagnostic store.
    #[must_use]
    pub fn is_emitted(self) -> bool {
        self != Self::SystemHeader
    }
}

/// How a fresh set of entries combines with what the store already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// New entries fully supersede the previous set for the same file.
    Replace,
    /// New entries are appended after the previous set for the same file.
    Accumulate,
}

// ============================================================================
// Report format
// ============================================================================

/// Report shape requested from the external tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    #[default]
    Xml,
}

impl ReportFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Xml => "xml",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown report format '{0}' (expected 'text' or 'xml')")]
pub struct UnknownReportFormat(String);

impl FromStr for ReportFormat {
    type Err = UnknownReportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "xml" => Ok(Self::Xml),
            _ => Err(UnknownReportFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
