//! Command-line material for one invocation.
//!
//! Configuration-file references are resolved through three fallbacks.
//! Include paths and preprocessor symbols go into an ephemeral option file
//! so the command line stays short no matter how many there are.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use lintrun_types::ReportFormat;
use tempfile::NamedTempFile;

use crate::error::LintError;
use crate::output::OutputSink;
use crate::paths;
use crate::types::InvocationConfig;

/// Conventional subdirectory searched for config files by basename.
pub const CONFIG_SUBDIR: &str = "lint";

const OPTION_FILE_PREFIX: &str = "lintrun-";
const OPTION_FILE_SUFFIX: &str = ".lnt";

/// Directives that make the tool emit `<issue .../>` records with
/// markup-escaped descriptions on single lines.
const XML_DIRECTIVES: [&str; 4] = [
    "+xml(doc)",
    "-width(0)",
    "-hFs1",
    r#"-"format=<issue file = \q%f\q line = \q%l\q number = \q%n\q desc = \q%m\q/>""#,
];

/// Resolve one reference: literal path, then relative to `root`, then its
/// basename under [`CONFIG_SUBDIR`]. First existing match wins.
#[must_use]
pub fn resolve_config_file(reference: &str, root: &Path) -> Option<PathBuf> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    let literal = PathBuf::from(reference);
    let mut candidates = vec![literal.clone(), root.join(&literal)];
    if let Some(name) = literal.file_name() {
        candidates.push(root.join(CONFIG_SUBDIR).join(name));
    }
    candidates.into_iter().find(|c| c.is_file())
}

/// Resolve all references in order. Unresolved ones are narrated and skipped.
pub fn resolve_config_files(
    references: &[String],
    root: &Path,
    output: &dyn OutputSink,
) -> Vec<PathBuf> {
    references
        .iter()
        .filter_map(|reference| {
            let resolved = resolve_config_file(reference, root);
            if resolved.is_none() {
                tracing::warn!(reference = %reference, "Config file not found, skipping");
                output.line(&format!("Config file not found, skipping: {reference}"));
            }
            resolved
        })
        .collect()
}

/// Contents of the option file plus what was left out of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionFile {
    lines: Vec<String>,
    /// Include directories written to the file.
    pub includes: Vec<PathBuf>,
    /// Configured include directories that do not exist.
    pub missing_includes: Vec<PathBuf>,
    /// Harvested directories skipped as duplicates of explicit ones.
    pub duplicate_includes: usize,
}

impl OptionFile {
    /// Build the option file text for `config`.
    ///
    /// Explicit include paths come first, then harvested ones not already
    /// present by normalized path, then one definition line per symbol.
    #[must_use]
    pub fn build(config: &InvocationConfig, root: &Path, harvested: &[String]) -> Self {
        let mut file = Self::default();
        if config.output_format == ReportFormat::Xml {
            file.lines.extend(XML_DIRECTIVES.iter().map(ToString::to_string));
        }

        let mut seen: HashSet<PathBuf> = HashSet::new();
        for raw in &config.include_paths {
            file.add_include(raw, root, &mut seen);
        }
        for raw in harvested {
            let normalized = paths::normalize_reported(raw.trim(), root);
            if seen.contains(&normalized) {
                file.duplicate_includes += 1;
                continue;
            }
            file.add_include(raw, root, &mut seen);
        }

        for symbol in &config.definitions {
            let symbol = symbol.trim();
            if !symbol.is_empty() {
                file.lines.push(format!("-d{symbol}"));
            }
        }
        file
    }

    fn add_include(&mut self, raw: &str, root: &Path, seen: &mut HashSet<PathBuf>) {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }
        let normalized = paths::normalize_reported(raw, root);
        if !seen.insert(normalized.clone()) {
            return;
        }
        if normalized.is_dir() {
            self.lines.push(format!("-i\"{}\"", normalized.display()));
            self.includes.push(normalized);
        } else {
            self.missing_includes.push(normalized);
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Write to a fresh temp file in `dir`, or the system temp directory.
    /// The file is removed when the handle is closed or dropped.
    pub fn materialize(&self, dir: Option<&Path>) -> Result<NamedTempFile, LintError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(OPTION_FILE_PREFIX).suffix(OPTION_FILE_SUFFIX);
        let mut tmp = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(LintError::OptionFile)?;
        tmp.write_all(self.text().as_bytes())
            .map_err(LintError::OptionFile)?;
        tmp.flush().map_err(LintError::OptionFile)?;
        Ok(tmp)
    }
}
