//! `lintrun.toml` loading.
//!
//! Search order: an explicit path, then `<root>/lintrun.toml`, then
//! `~/.lintrun/config.toml`. No file at all means defaults. `${VAR}`
//! references in path-like values are expanded from the environment.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use lintrun_lint::{ClassifierSettings, InvocationConfig, SaveTrigger, paths};
use lintrun_types::ReportFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "lintrun.toml";

/// Overrides `tool.executable` when set and non-empty.
pub const EXECUTABLE_ENV: &str = "LINTRUN_EXECUTABLE";

const DEFAULT_FILE_EXTENSIONS: [&str; 6] = ["c", "cc", "cpp", "cxx", "h", "hpp"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl LoadError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Read { path, .. } | LoadError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct LintrunConfig {
    pub tool: Option<ToolConfig>,
    pub diagnostics: Option<DiagnosticsConfig>,
    pub editor: Option<EditorConfig>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub executable: String,
    #[serde(default)]
    pub config_files: Vec<String>,
    #[serde(default)]
    pub include_paths: Vec<String>,
    #[serde(default)]
    pub definitions: Vec<String>,
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Relative values resolve against the config file's directory.
    pub repository_root: Option<String>,
    #[serde(default)]
    pub harvest_project_includes: bool,
    #[serde(default)]
    pub output_format: ReportFormat,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct DiagnosticsConfig {
    pub source_tag: Option<String>,
    pub system_header_markers: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub lint_on_save: bool,
    pub file_extensions: Option<Vec<String>>,
}

/// A parsed config and where it came from.
#[derive(Debug, Default, Clone)]
pub struct LoadedConfig {
    pub config: LintrunConfig,
    /// `None` when no file was found and defaults apply.
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory relative config values resolve against.
    #[must_use]
    pub fn base_dir(&self, fallback: &Path) -> PathBuf {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| fallback.to_path_buf(), Path::to_path_buf)
    }
}

impl LintrunConfig {
    /// Load from the first file found in the search order.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<LoadedConfig, LoadError> {
        if let Some(path) = explicit {
            let config = Self::from_path(path)?;
            return Ok(LoadedConfig {
                config,
                path: Some(path.to_path_buf()),
            });
        }
        for path in search_paths(root) {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "Loading config");
                let config = Self::from_path(&path)?;
                return Ok(LoadedConfig {
                    config,
                    path: Some(path),
                });
            }
        }
        tracing::debug!("No config file found, using defaults");
        Ok(LoadedConfig::default())
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {}: {err}", path.display());
                return Err(LoadError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };
        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {}: {err}", path.display());
                Err(LoadError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Invocation settings, with relative roots resolved against `base_dir`.
    #[must_use]
    pub fn invocation_config(&self, base_dir: &Path) -> InvocationConfig {
        let override_exe = env::var(EXECUTABLE_ENV).ok().filter(|v| !v.is_empty());
        self.invocation_config_with(base_dir, override_exe)
    }

    fn invocation_config_with(
        &self,
        base_dir: &Path,
        override_exe: Option<String>,
    ) -> InvocationConfig {
        let tool = self.tool.clone().unwrap_or_default();
        let executable = override_exe.unwrap_or_else(|| expand_env_vars(&tool.executable));
        let repository_root = tool
            .repository_root
            .as_deref()
            .map(expand_env_vars)
            .filter(|root| !root.is_empty())
            .map(|root| paths::normalize(Path::new(&root), base_dir));

        InvocationConfig {
            executable: PathBuf::from(executable),
            config_files: expand_all(&tool.config_files),
            include_paths: expand_all(&tool.include_paths),
            definitions: tool.definitions,
            extra_args: expand_all(&tool.extra_args),
            repository_root,
            harvest_project_includes: tool.harvest_project_includes,
            output_format: tool.output_format,
        }
    }

    #[must_use]
    pub fn classifier_settings(&self) -> ClassifierSettings {
        let mut settings = ClassifierSettings::default();
        if let Some(diagnostics) = &self.diagnostics {
            if let Some(tag) = &diagnostics.source_tag {
                settings.source_tag.clone_from(tag);
            }
            if let Some(markers) = &diagnostics.system_header_markers {
                settings.system_header_markers.clone_from(markers);
            }
        }
        settings
    }

    #[must_use]
    pub fn save_trigger(&self) -> SaveTrigger {
        let editor = self.editor.clone().unwrap_or_default();
        SaveTrigger {
            enabled: editor.lint_on_save,
            file_extensions: editor.file_extensions.unwrap_or_else(|| {
                DEFAULT_FILE_EXTENSIONS
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            }),
        }
    }
}

/// Implicit config locations, in search order.
#[must_use]
pub fn search_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![root.join(CONFIG_FILE_NAME)];
    paths.extend(user_config_path());
    paths
}

#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".lintrun").join("config.toml"))
}

fn expand_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| expand_env_vars(v)).collect()
}

/// Expand `${VAR}` from the environment. Unknown variables expand to
/// nothing; an unclosed `${` is kept as is.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + len];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + len + 1..];
    }
    out.push_str(rest);
    out
}
