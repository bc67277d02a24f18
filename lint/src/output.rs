//! Output sink: the user-facing narration channel.
//!
//! Editors show this text in an output panel. It is injected into the
//! [`Linter`](crate::Linter) rather than being a process-wide singleton so the
//! engine can run without a live editor host.

use std::sync::Mutex;

/// Receives user-facing narration lines.
pub trait OutputSink: Send + Sync {
    /// Append one line of narration.
    fn line(&self, text: &str);

    /// Captured raw tool output. Defaults to dropping it.
    fn tool_output(&self, text: &str) {
        let _ = text;
    }
}

/// Forwards narration to `tracing` under the `lintrun::output` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingOutput;

impl OutputSink for TracingOutput {
    fn line(&self, text: &str) {
        tracing::info!(target: "lintrun::output", "{text}");
    }

    fn tool_output(&self, text: &str) {
        tracing::trace!(target: "lintrun::output", "{text}");
    }
}

/// Keeps every line in memory. Used by hosts that render the panel later.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    lines: Mutex<Vec<String>>,
    tool_lines: Mutex<Vec<String>>,
}

impl BufferedOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn tool_lines(&self) -> Vec<String> {
        self.tool_lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Whether any narration line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl OutputSink for BufferedOutput {
    fn line(&self, text: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(text.to_string());
        }
    }

    fn tool_output(&self, text: &str) {
        if let Ok(mut lines) = self.tool_lines.lock() {
            lines.push(text.to_string());
        }
    }
}
