//! Candidate files for a batch run.
//!
//! Explicit files are always taken. Directories are walked respecting
//! ignore files and filtered by glob, or by source extension when no glob
//! is given. The result is de-duplicated by absolute path and sorted.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use lintrun_lint::paths;

const SKIPPED_DIRS: [&str; 4] = [".git", "target", "build", "node_modules"];

pub struct FileFilter {
    globs: Option<GlobSet>,
    extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(patterns: &[String], extensions: &[String]) -> Result<Self> {
        Ok(Self {
            globs: build_globs(patterns)?,
            extensions: extensions.to_vec(),
        })
    }

    /// Globs match against the path relative to `root` when it is inside it.
    pub fn matches(&self, path: &Path, root: &Path) -> bool {
        if let Some(globs) = &self.globs {
            let relative = path.strip_prefix(root).unwrap_or(path);
            return globs.is_match(relative);
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|c| c.eq_ignore_ascii_case(ext)))
    }
}

fn build_globs(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            bail!("glob patterns must be non-empty");
        }
        let mut glob = GlobBuilder::new(trimmed);
        if cfg!(windows) {
            glob.case_insensitive(true);
        }
        let glob = glob
            .build()
            .with_context(|| format!("invalid glob '{trimmed}'"))?;
        builder.add(glob);
    }
    Ok(Some(builder.build().context("invalid glob set")?))
}

/// Resolve `inputs` (or `root` when empty) into an ordered file list.
pub fn discover(
    inputs: &[PathBuf],
    cwd: &Path,
    root: &Path,
    filter: &FileFilter,
) -> Vec<PathBuf> {
    let inputs = if inputs.is_empty() {
        vec![root.to_path_buf()]
    } else {
        inputs.to_vec()
    };

    let mut found = BTreeSet::new();
    for input in &inputs {
        let input = paths::normalize(input, cwd);
        if input.is_file() {
            found.insert(input);
            continue;
        }
        if !input.is_dir() {
            tracing::warn!(path = %input.display(), "Skipping path that does not exist");
            continue;
        }

        let walker = WalkBuilder::new(&input)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                !SKIPPED_DIRS.contains(&name.as_ref())
            })
            .build();

        for entry in walker.flatten() {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if filter.matches(entry.path(), root) {
                found.insert(paths::normalize(entry.path(), cwd));
            }
        }
    }

    tracing::debug!(count = found.len(), "Discovered candidate files");
    found.into_iter().collect()
}
