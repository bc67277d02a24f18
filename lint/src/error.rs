//! Error taxonomy for lint actions.
//!
//! Configuration errors abort the current action before any process is
//! spawned. Spawn errors are per invocation; the batch driver catches and
//! logs them. Cancellation is a sentinel, not a failure. Report parsing
//! never errors: malformed fragments just yield fewer records.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The invocation config cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no analysis executable configured")]
    MissingExecutable,
    #[error("analysis executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),
    #[error("repository root does not exist: {}", .0.display())]
    RepositoryRootNotFound(PathBuf),
    #[error("cannot resolve the working directory: {0}")]
    WorkingDirectory(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum LintError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to launch {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write option file: {0}")]
    OptionFile(#[source] io::Error),

    #[error("i/o error while {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("lint run cancelled after {processed} file(s)")]
    Cancelled { processed: usize },
}

impl LintError {
    /// Cancellation is a normal termination, not something to toast.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether this error must abort the whole action.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_not_fatal() {
        let err = LintError::Cancelled { processed: 3 };
        assert!(err.is_cancelled());
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "lint run cancelled after 3 file(s)");
    }

    #[test]
    fn config_errors_are_fatal() {
        let err = LintError::from(ConfigError::MissingExecutable);
        assert!(err.is_fatal());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn spawn_error_names_program() {
        let err = LintError::Spawn {
            program: PathBuf::from("/opt/lint/bin/lint"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/opt/lint/bin/lint"));
        assert!(!err.is_fatal());
    }
}
