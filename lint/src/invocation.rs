//! Invocation coordinator: validate, materialize options, spawn, capture.
//!
//! One invocation launches the external tool once over one or more target
//! files. The ephemeral option file is removed on every exit path; the
//! tool's exit status is reported but never treated as a failure.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::error::LintError;
use crate::options::{self, OptionFile};
use crate::output::OutputSink;
use crate::project;
use crate::report::STREAM_SEPARATOR;
use crate::types::InvocationConfig;

/// Everything the tool printed, plus its exit code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl RawOutput {
    /// Standard output followed by standard error.
    #[must_use]
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            return self.stdout.clone();
        }
        if self.stdout.is_empty() {
            return self.stderr.clone();
        }
        let mut combined = self.stdout.clone();
        if !combined.ends_with(STREAM_SEPARATOR) {
            combined.push_str(STREAM_SEPARATOR);
        }
        combined.push_str(&self.stderr);
        combined
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Seam between the engine and process spawning.
pub trait Invoke: Send + Sync {
    /// Run the tool once over `targets`.
    fn invoke(
        &self,
        targets: &[PathBuf],
        config: &InvocationConfig,
    ) -> impl Future<Output = Result<RawOutput, LintError>> + Send;
}

/// Launches the real tool as a child process.
#[derive(Clone)]
pub struct ProcessInvoker {
    output: Arc<dyn OutputSink>,
    /// Where option files are written; the system temp directory when unset.
    option_dir: Option<PathBuf>,
}

impl ProcessInvoker {
    #[must_use]
    pub fn new(output: Arc<dyn OutputSink>) -> Self {
        Self {
            output,
            option_dir: None,
        }
    }

    pub fn with_option_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.option_dir = Some(dir.into());
        self
    }

    pub async fn run(
        &self,
        targets: &[PathBuf],
        config: &InvocationConfig,
    ) -> Result<RawOutput, LintError> {
        let program = config.validate()?;
        let root = config.working_dir().map_err(|source| LintError::Io {
            action: "resolving the working directory",
            source,
        })?;

        let config_files =
            options::resolve_config_files(&config.config_files, &root, self.output.as_ref());
        let harvested = if config.harvest_project_includes {
            project::harvest_include_paths(&root)
        } else {
            Vec::new()
        };

        let option_file = OptionFile::build(config, &root, &harvested);
        for missing in &option_file.missing_includes {
            tracing::warn!(path = %missing.display(), "Include directory does not exist, omitted");
            self.output.line(&format!(
                "Include directory does not exist, omitted: {}",
                missing.display()
            ));
        }
        if option_file.duplicate_includes > 0 {
            tracing::debug!(
                skipped = option_file.duplicate_includes,
                "Skipped harvested include paths already configured"
            );
        }

        let tmp = option_file.materialize(self.option_dir.as_deref())?;
        let result = self
            .spawn_and_capture(&program, &root, &config_files, tmp.path(), config, targets)
            .await;
        if let Err(e) = tmp.close() {
            tracing::warn!("Failed to remove option file: {e}");
        }
        result
    }

    async fn spawn_and_capture(
        &self,
        program: &Path,
        root: &Path,
        config_files: &[PathBuf],
        option_file: &Path,
        config: &InvocationConfig,
        targets: &[PathBuf],
    ) -> Result<RawOutput, LintError> {
        let mut cmd = Command::new(program);
        cmd.args(config_files)
            .arg(option_file)
            .args(&config.extra_args)
            .args(targets)
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = %program.display(),
            cwd = %root.display(),
            targets = targets.len(),
            config_files = config_files.len(),
            "Launching analysis tool"
        );

        let mut child = cmd.spawn().map_err(|source| LintError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or_else(|| LintError::Io {
            action: "capturing tool output",
            source: io::Error::other("stdout was not piped"),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| LintError::Io {
            action: "capturing tool output",
            source: io::Error::other("stderr was not piped"),
        })?;

        let sink = self.output.as_ref();
        let (stdout, stderr, status) =
            tokio::join!(capture(stdout, sink), capture(stderr, sink), child.wait());

        let status = status.map_err(|source| LintError::Io {
            action: "waiting for the tool",
            source,
        })?;
        let stdout = stdout.map_err(|source| LintError::Io {
            action: "reading tool stdout",
            source,
        })?;
        let stderr = stderr.map_err(|source| LintError::Io {
            action: "reading tool stderr",
            source,
        })?;

        tracing::debug!(
            exit_code = ?status.code(),
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "Analysis tool exited"
        );

        Ok(RawOutput {
            stdout,
            stderr,
            exit_code: status.code(),
        })
    }
}

impl Invoke for ProcessInvoker {
    fn invoke(
        &self,
        targets: &[PathBuf],
        config: &InvocationConfig,
    ) -> impl Future<Output = Result<RawOutput, LintError>> + Send {
        self.run(targets, config)
    }
}

/// Read a stream to the end, forwarding each line as it arrives.
async fn capture<R: AsyncRead + Unpin>(reader: R, sink: &dyn OutputSink) -> io::Result<String> {
    let mut reader = BufReader::new(reader);
    let mut captured = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        sink.tool_output(line.trim_end_matches(['\r', '\n']));
        captured.push_str(&line);
    }
    Ok(captured)
}
