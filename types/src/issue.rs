//! Issue records as reported by the external analysis tool.

use serde::Serialize;

/// Line/column position of an issue.
///
/// `line` is 1-based as reported. `column` is 0 when the report carries none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct LineSpan {
    pub line: u32,
    pub column: u32,
}

impl LineSpan {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// One defect instance from one invocation's output.
///
/// Immutable after construction; severity is not stored here because the
/// tool does not report it (see the classifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    /// Path exactly as reported: possibly relative, either separator style.
    file_path: String,
    span: LineSpan,
    code: String,
    /// Message with markup entities already decoded.
    message: String,
}

impl IssueRecord {
    #[must_use]
    pub fn new(file_path: String, span: LineSpan, code: String, message: String) -> Self {
        Self {
            file_path,
            span,
            code,
            message,
        }
    }

    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    #[must_use]
    pub fn span(&self) -> LineSpan {
        self.span
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
