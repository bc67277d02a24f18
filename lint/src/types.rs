//! Public types consumed by editor hosts and the CLI.
//!
//! Hosts construct an [`InvocationConfig`] and [`ClassifierSettings`], call
//! into the [`Linter`](crate::Linter), and read back [`LintOutcome`],
//! [`BatchSummary`] and [`DiagnosticsSnapshot`] values.

use std::path::{self, Path, PathBuf};
use std::{env, io};

use lintrun_types::{DiagnosticEntry, ReportFormat, Severity};
use serde::Serialize;

use crate::classify::RouteCounts;
use crate::error::ConfigError;
use crate::paths;

/// Default source tag attached to every diagnostic.
pub const DEFAULT_SOURCE_TAG: &str = "lint";

/// Default substrings identifying toolchain-bundled headers.
pub const DEFAULT_SYSTEM_HEADER_MARKERS: [&str; 2] = ["/usr/include/", "/usr/lib/gcc/"];

/// Snapshot of everything needed to invoke the external tool once.
///
/// Shared read-only across all invocations of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationConfig {
    /// Path to the analysis executable. A bare name is looked up in `PATH`.
    pub executable: PathBuf,
    /// Tool configuration files, passed first on the command line.
    pub config_files: Vec<String>,
    /// Include directories written to the option file.
    pub include_paths: Vec<String>,
    /// Preprocessor symbols (`NAME` or `NAME=VALUE`).
    pub definitions: Vec<String>,
    /// Raw arguments passed after the option file.
    pub extra_args: Vec<String>,
    /// Working directory for the tool and base for relative paths.
    pub repository_root: Option<PathBuf>,
    /// Also read include paths from the editor's project-properties file.
    pub harvest_project_includes: bool,
    pub output_format: ReportFormat,
}

impl InvocationConfig {
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            ..Self::default()
        }
    }

    /// Check the config and return the absolute executable to launch.
    ///
    /// A relative executable resolves against the working directory the
    /// tool is launched in, not the current process directory.
    pub fn validate(&self) -> Result<PathBuf, ConfigError> {
        if self.executable.as_os_str().is_empty() {
            return Err(ConfigError::MissingExecutable);
        }
        if let Some(root) = &self.repository_root
            && !root.is_dir()
        {
            return Err(ConfigError::RepositoryRootNotFound(root.clone()));
        }
        let root = self.working_dir().map_err(ConfigError::WorkingDirectory)?;
        resolve_executable(&self.executable, &root)
    }

    /// Repository root, or the current process directory when unset.
    pub fn working_dir(&self) -> io::Result<PathBuf> {
        match &self.repository_root {
            Some(root) => path::absolute(root),
            None => env::current_dir(),
        }
    }
}

/// Bare names are looked up in `PATH` first, everything else under `root`.
fn resolve_executable(executable: &Path, root: &Path) -> Result<PathBuf, ConfigError> {
    let bare = executable.components().count() == 1 && !executable.is_absolute();
    if bare && let Ok(found) = which::which(executable) {
        return Ok(found);
    }
    let candidate = paths::normalize(executable, root);
    if candidate.is_file() {
        return Ok(candidate);
    }
    Err(ConfigError::ExecutableNotFound(executable.to_path_buf()))
}

/// Settings for the issue classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSettings {
    /// Tag attached to every diagnostic entry.
    pub source_tag: String,
    /// A reported path containing any of these is a system header.
    pub system_header_markers: Vec<String>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
            system_header_markers: DEFAULT_SYSTEM_HEADER_MARKERS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// When a saved file should be linted automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveTrigger {
    pub enabled: bool,
    /// Extensions (without the dot) that qualify, compared case-insensitively.
    pub file_extensions: Vec<String>,
}

impl SaveTrigger {
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.file_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }
}

/// Result of linting one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintOutcome {
    /// Normalized identity of the linted file.
    pub file: PathBuf,
    pub counts: RouteCounts,
    pub summary_synthesized: bool,
    /// Issue-looking lines when the tool produced free text.
    pub free_text_issues: usize,
    /// The tool printed nothing at all.
    pub no_output: bool,
    pub exit_code: Option<i32>,
    /// Entries merged into the store, summary included.
    pub entries_merged: usize,
}

impl LintOutcome {
    /// Issues the tool reported that reached the store.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.counts.emitted() + self.free_text_issues
    }
}

/// Coarse batch progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.processed * 100) / self.total).min(100) as u8
    }
}

/// Totals reported once a batch run completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files_total: usize,
    pub files_processed: usize,
    pub files_with_issues: usize,
    pub total_issues: usize,
    /// Entries dropped because an earlier invocation already reported them.
    pub duplicates_skipped: usize,
    /// Files whose invocation failed, with the error text.
    pub failed: Vec<(PathBuf, String)>,
}

/// Immutable snapshot of all diagnostics, suitable for rendering.
///
/// Counts are computed from `files`, never cached.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSnapshot {
    /// Per-file diagnostics, files with errors first, then by path.
    files: Vec<(PathBuf, Vec<DiagnosticEntry>)>,
}

impl DiagnosticsSnapshot {
    pub(crate) fn new(files: Vec<(PathBuf, Vec<DiagnosticEntry>)>) -> Self {
        Self { files }
    }

    #[must_use]
    pub fn files(&self) -> &[(PathBuf, Vec<DiagnosticEntry>)] {
        &self.files
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn count_by_severity(&self, severity: Severity) -> usize {
        self.files
            .iter()
            .flat_map(|(_, items)| items)
            .filter(|d| d.severity() == severity)
            .count()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count_by_severity(Severity::Error)
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count_by_severity(Severity::Warning)
    }

    #[must_use]
    pub fn info_count(&self) -> usize {
        self.count_by_severity(Severity::Information)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.files.iter().map(|(_, items)| items.len()).sum()
    }

    /// Compact status string like "E:3 W:5 I:1".
    #[must_use]
    pub fn status_string(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!(
            "E:{} W:{} I:{}",
            self.error_count(),
            self.warning_count(),
            self.info_count()
        )
    }
}
