//! Include paths harvested from the editor's project-properties file.
//!
//! The file is `.vscode/c_cpp_properties.json` under the repository root.
//! It holds one configuration per platform; the first whose name matches
//! the current platform keyword wins, else the first configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const PROJECT_DIR: &str = ".vscode";
const PROJECT_FILE: &str = "c_cpp_properties.json";

const WORKSPACE_VARS: [&str; 2] = ["${workspaceFolder}", "${workspaceRoot}"];

/// Suffix the editor uses to mean "this directory, recursively".
const RECURSIVE_SUFFIX: &str = "/**";

#[derive(Debug, Default, Deserialize)]
struct ProjectProperties {
    #[serde(default)]
    configurations: Vec<ProjectConfiguration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectConfiguration {
    #[serde(default)]
    name: String,
    #[serde(default)]
    include_path: Vec<String>,
}

#[must_use]
pub fn project_file(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR).join(PROJECT_FILE)
}

/// Platform keyword used to pick a configuration by name.
#[must_use]
pub fn platform_keyword() -> &'static str {
    if cfg!(windows) {
        "Win32"
    } else if cfg!(target_os = "macos") {
        "Mac"
    } else {
        "Linux"
    }
}

/// Read include paths for the current platform. Missing or unreadable
/// files yield an empty list; this source is optional.
#[must_use]
pub fn harvest_include_paths(root: &Path) -> Vec<String> {
    let path = project_file(root);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No project properties file");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to read project properties: {e}");
            return Vec::new();
        }
    };
    match parse_include_paths(&content, platform_keyword(), root) {
        Some(paths) => {
            tracing::debug!(
                path = %path.display(),
                count = paths.len(),
                "Harvested include paths"
            );
            paths
        }
        None => {
            tracing::warn!(path = %path.display(), "Project properties file is not valid JSON");
            Vec::new()
        }
    }
}

/// Parse the project file and expand the selected configuration's paths.
///
/// Returns `None` when the content does not parse.
fn parse_include_paths(content: &str, keyword: &str, root: &Path) -> Option<Vec<String>> {
    let properties: ProjectProperties = serde_json::from_str(&strip_line_comments(content)).ok()?;
    let keyword = keyword.to_ascii_lowercase();
    let selected = properties
        .configurations
        .iter()
        .find(|c| c.name.to_ascii_lowercase().contains(&keyword))
        .or_else(|| properties.configurations.first());
    Some(
        selected
            .map(|c| {
                c.include_path
                    .iter()
                    .map(|raw| expand_include(raw, root))
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
    )
}

/// The file is JSON with comments; drop whole-line `//` comments.
fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn expand_include(raw: &str, root: &Path) -> String {
    let root = root.to_string_lossy();
    let mut expanded = raw.trim().to_string();
    for var in WORKSPACE_VARS {
        expanded = expanded.replace(var, &root);
    }
    if let Some(stripped) = expanded.strip_suffix(RECURSIVE_SUFFIX) {
        expanded = stripped.to_string();
    }
    expanded
}
