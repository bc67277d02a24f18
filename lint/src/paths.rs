//! Path identity for reported and invoked files.
//!
//! Reported paths may be relative and may use either separator. Both sides
//! of a comparison go through [`normalize_reported`] / [`normalize`] so that
//! equal files get equal keys. Normalization is idempotent.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Separator convention of the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorStyle {
    Slash,
    Backslash,
}

impl SeparatorStyle {
    #[must_use]
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::Backslash
        } else {
            Self::Slash
        }
    }
}

/// Rewrite forward slashes on back-slash platforms. No-op elsewhere.
#[must_use]
pub fn rewrite_separators(raw: &str, style: SeparatorStyle) -> Cow<'_, str> {
    match style {
        SeparatorStyle::Backslash if raw.contains('/') => Cow::Owned(raw.replace('/', "\\")),
        SeparatorStyle::Backslash | SeparatorStyle::Slash => Cow::Borrowed(raw),
    }
}

/// Normalize a path string exactly as the tool reported it.
#[must_use]
pub fn normalize_reported(raw: &str, root: &Path) -> PathBuf {
    let rewritten = rewrite_separators(raw, SeparatorStyle::native());
    normalize(Path::new(rewritten.as_ref()), root)
}

/// Resolve `path` against `root` when relative, then fold `.` and `..`.
#[must_use]
pub fn normalize(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        lexical_normalize(path)
    } else {
        lexical_normalize(&root.join(path))
    }
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root.
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Whether the path names a C/C++ header (`.h` / `.hpp`).
#[must_use]
pub fn is_header(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("h") || e.eq_ignore_ascii_case("hpp"))
}
