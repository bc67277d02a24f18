//! Report parser: extracts issue records from raw tool output.
//!
//! Two report shapes are recognized. The structured shape is a stream of
//! `<issue file=".." line=".." number=".." desc="..">` tags embedded in
//! otherwise arbitrary text. Anything else is free text, which only yields
//! a presence/count signal with best-effort file attribution.

use std::borrow::Cow;
use std::sync::LazyLock;

use lintrun_types::{IssueRecord, LineSpan};
use regex::{Captures, Regex};

/// Substring whose presence selects the structured path.
pub const STRUCTURED_MARKER: &str = "<issue";

/// Placed between captured stdout and stderr in combined output.
pub const STREAM_SEPARATOR: &str = "\n";

/// Attribute order is fixed: file, line, optional column, number, desc.
/// Each value is matched in double or single quotes; the value may contain
/// anything but the quote character used.
static ISSUE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<issue\s+file\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        r#"\s+line\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        r#"(?:\s+col(?:umn)?\s*=\s*(?:"([^"]*)"|'([^']*)'))?"#,
        r#"\s+number\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        r#"\s+desc\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
    ))
    .expect("issue tag pattern is valid")
});

const FILE_GROUP: usize = 1;
const LINE_GROUP: usize = 3;
const COLUMN_GROUP: usize = 5;
const NUMBER_GROUP: usize = 7;
const DESC_GROUP: usize = 9;

const ENTITIES: [(&str, char); 5] = [
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&amp;", '&'),
    ("&quot;", '"'),
    ("&apos;", '\''),
];

const FREE_TEXT_KEYWORDS: [&str; 3] = ["error", "warning", "note"];

/// One free-text line that looks like an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeTextLine {
    /// Leading `path:` prefix, when the line has one.
    pub file: Option<String>,
    pub text: String,
}

/// Result of parsing one invocation's combined output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReport {
    /// Output was empty or whitespace only. Not an error.
    NoOutput,
    /// The structured marker was present. Records are in document order.
    Structured(Vec<IssueRecord>),
    /// No structured marker; only issue-looking lines are reported.
    FreeText(Vec<FreeTextLine>),
}

impl ParsedReport {
    /// Structured records; empty for the other shapes.
    #[must_use]
    pub fn records(&self) -> &[IssueRecord] {
        match self {
            Self::Structured(records) => records,
            Self::NoOutput | Self::FreeText(_) => &[],
        }
    }

    #[must_use]
    pub fn into_records(self) -> Vec<IssueRecord> {
        match self {
            Self::Structured(records) => records,
            Self::NoOutput | Self::FreeText(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_no_output(&self) -> bool {
        matches!(self, Self::NoOutput)
    }

    /// Number of issues seen, whichever shape was parsed.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        match self {
            Self::NoOutput => 0,
            Self::Structured(records) => records.len(),
            Self::FreeText(lines) => lines.len(),
        }
    }
}

/// Parse combined stdout/stderr text.
#[must_use]
pub fn parse(raw: &str) -> ParsedReport {
    if raw.trim().is_empty() {
        return ParsedReport::NoOutput;
    }
    if raw.contains(STRUCTURED_MARKER) {
        return ParsedReport::Structured(parse_structured(raw));
    }
    ParsedReport::FreeText(parse_free_text(raw))
}

fn parse_structured(raw: &str) -> Vec<IssueRecord> {
    ISSUE_TAG
        .captures_iter(raw)
        .filter_map(|caps| record_from_captures(&caps))
        .collect()
}

fn attr<'h>(caps: &Captures<'h>, group: usize) -> Option<&'h str> {
    caps.get(group)
        .or_else(|| caps.get(group + 1))
        .map(|m| m.as_str())
}

fn record_from_captures(caps: &Captures<'_>) -> Option<IssueRecord> {
    let file = attr(caps, FILE_GROUP)?;
    let Some(line) = attr(caps, LINE_GROUP).and_then(parse_line) else {
        tracing::trace!(file, "Skipping issue record with unreadable line");
        return None;
    };
    let column = attr(caps, COLUMN_GROUP)
        .and_then(|c| c.trim().parse::<u32>().ok())
        .unwrap_or(0);
    let code = attr(caps, NUMBER_GROUP)?;
    let desc = attr(caps, DESC_GROUP)?;

    Some(IssueRecord::new(
        decode_entities(file).into_owned(),
        LineSpan::new(line, column),
        code.trim().to_string(),
        decode_entities(desc).into_owned(),
    ))
}

/// `"12"` and `"12-15"` both yield 12; only the start of a range is kept.
fn parse_line(value: &str) -> Option<u32> {
    let value = value.trim();
    let start = value.split_once('-').map_or(value, |(start, _)| start);
    start.trim().parse().ok()
}

fn parse_free_text(raw: &str) -> Vec<FreeTextLine> {
    raw.lines()
        .filter(|line| {
            let lower = line.to_ascii_lowercase();
            FREE_TEXT_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|line| FreeTextLine {
            file: leading_path(line).map(str::to_string),
            text: line.trim_end().to_string(),
        })
        .collect()
}

/// Best-effort `path:` prefix of a free-text line.
///
/// A drive prefix like `C:\` is skipped before looking for the colon. The
/// candidate must look like a path (contain a separator or a dot) so that
/// lines like `error: ...` are not attributed to a file named `error`.
fn leading_path(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let bytes = line.as_bytes();
    let skip = if bytes.len() > 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
    {
        2
    } else {
        0
    };
    let end = skip + line[skip..].find(':')?;
    let candidate = &line[..end];
    let looks_like_path = candidate.contains(['/', '\\', '.']);
    if candidate.is_empty() || candidate.trim() != candidate || !looks_like_path {
        return None;
    }
    Some(candidate)
}

/// Decode the five standard markup entities in a single pass.
///
/// A single pass means `&amp;lt;` decodes to `&lt;`, not `<`.
#[must_use]
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some((name, ch)) = ENTITIES.iter().find(|(name, _)| tail.starts_with(name)) {
            out.push(*ch);
            rest = &tail[name.len()..];
        } else {
            out.push('&');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
