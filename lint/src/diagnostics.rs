//! Diagnostics store: per-file diagnostic entries keyed by normalized path.
//!
//! The store never drops or duplicates entries on its own. Filtering
//! happens upstream (classifier, batch de-duplication).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lintrun_types::{DiagnosticEntry, MergePolicy};

use crate::types::DiagnosticsSnapshot;

#[derive(Debug, Default)]
pub struct DiagnosticsStore {
    data: HashMap<PathBuf, Vec<DiagnosticEntry>>,
}

impl DiagnosticsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `entries` for `key` under `policy`.
    ///
    /// `Replace` with no entries removes the key; `get` still answers with
    /// an empty slice.
    pub fn merge(&mut self, key: PathBuf, entries: Vec<DiagnosticEntry>, policy: MergePolicy) {
        match policy {
            MergePolicy::Replace => {
                if entries.is_empty() {
                    self.data.remove(&key);
                } else {
                    self.data.insert(key, entries);
                }
            }
            MergePolicy::Accumulate => {
                if !entries.is_empty() {
                    self.data.entry(key).or_default().extend(entries);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Current entries for `key`; empty when the file has none.
    #[must_use]
    pub fn get(&self, key: &Path) -> &[DiagnosticEntry] {
        self.data.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let mut files: Vec<(PathBuf, Vec<DiagnosticEntry>)> = self
            .data
            .iter()
            .map(|(path, items)| (path.clone(), items.clone()))
            .collect();

        // Files with errors first, then alphabetically
        files.sort_by(|a, b| {
            let a_has_errors = a.1.iter().any(|d| d.severity().is_error());
            let b_has_errors = b.1.iter().any(|d| d.severity().is_error());
            b_has_errors.cmp(&a_has_errors).then_with(|| a.0.cmp(&b.0))
        });

        DiagnosticsSnapshot::new(files)
    }
}
