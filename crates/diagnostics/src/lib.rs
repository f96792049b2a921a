//! Diagnostics for the URL template toolchain.
//!
//! Provides [`Diagnostic`], [`DiagnosticKind`], [`Severity`], [`Span`], and
//! [`LineIndex`] types used to report recoverable problems found while
//! parsing URL template lines. Diagnostic codes are defined in the [`codes`]
//! module.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from the diagnostic registry.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

// ── LineIndex ────────────────────────────────────────────────────────────

/// Maps byte offsets in a source string to line and column positions.
///
/// Lines and columns are **0-indexed**. Add 1 when displaying to users.
/// Built in O(n); each lookup is a binary search.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line. `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build a `LineIndex` from source text.
    pub fn new(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Build a `LineIndex` from raw bytes (which need not be valid UTF-8).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut line_starts = vec![0usize];
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 0-indexed `(line, column)` pair.
    ///
    /// If `offset` is past the end of the source, the last line is returned
    /// and the column is not clamped.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let col = offset.saturating_sub(self.line_starts[line]);
        (line, col)
    }

    /// Byte offset of the start of the given 0-indexed line.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Total number of lines (at least 1, even for empty input).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// The input could not be processed at all (e.g. malformed UTF-8).
    Error,
    /// Recoverable syntax problem; a best-effort tree was still produced.
    Warn,
    /// Informational note.
    Info,
}

/// Byte span in the source input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// The message kind of a diagnostic, one per registered code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// `{name` (or `{`) with no closing `}` before the end of the line.
    UnterminatedVariable,
    /// `{}`, a placeholder with no identifier.
    EmptyVariableName,
    /// A character the current component cannot contain.
    UnexpectedCharacter,
    /// A delimiter with nothing to delimit (`host:`, `?`, stray `&`).
    DanglingDelimiter,
    /// An empty path segment followed by another `/`.
    EmptySegment,
    /// Port digits above 65535.
    PortOutOfRange,
    /// A line that is not valid UTF-8.
    InvalidUtf8,
}

impl DiagnosticKind {
    /// The stable diagnostic code for this kind.
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::UnterminatedVariable => codes::UNTERMINATED_VARIABLE,
            DiagnosticKind::EmptyVariableName => codes::EMPTY_VARIABLE_NAME,
            DiagnosticKind::UnexpectedCharacter => codes::UNEXPECTED_CHARACTER,
            DiagnosticKind::DanglingDelimiter => codes::DANGLING_DELIMITER,
            DiagnosticKind::EmptySegment => codes::EMPTY_SEGMENT,
            DiagnosticKind::PortOutOfRange => codes::PORT_OUT_OF_RANGE,
            DiagnosticKind::InvalidUtf8 => codes::INVALID_UTF8,
        }
    }

    /// Look up the kind registered for a diagnostic code.
    pub fn from_code(id: &str) -> Option<DiagnosticKind> {
        include!(concat!(env!("OUT_DIR"), "/generated_kinds.rs"))
    }

    /// Severity registered for this kind.
    pub fn default_severity(self) -> Severity {
        default_severity(self.code()).unwrap_or(Severity::Warn)
    }
}

/// A diagnostic message produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"URLT1001"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Optional byte span in the source input that this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Create a diagnostic of a registered kind with its default severity.
    pub fn of_kind(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self::new(kind.code(), kind.default_severity(), message, Some(span))
    }

    /// Attach machine-readable context metadata (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// The registered kind for this diagnostic's code, if any.
    pub fn kind(&self) -> Option<DiagnosticKind> {
        DiagnosticKind::from_code(&self.id)
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the registered default severity for a diagnostic code, if known.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── LineIndex ────────────────────────────────────────────────────────

    #[test]
    fn line_index_two_lines() {
        let idx = LineIndex::new("/a\n?b");
        assert_eq!(idx.line_count(), 2);
        assert_eq!(idx.line_col(0), (0, 0));
        assert_eq!(idx.line_col(2), (0, 2)); // '\n'
        assert_eq!(idx.line_col(3), (1, 0)); // '?'
        assert_eq!(idx.line_col(4), (1, 1));
    }

    #[test]
    fn line_index_trailing_newline() {
        let idx = LineIndex::new("localhost\n");
        assert_eq!(idx.line_count(), 2);
        assert_eq!(idx.line_col(10), (1, 0));
    }

    #[test]
    fn line_index_empty_input() {
        let idx = LineIndex::new("");
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.line_col(0), (0, 0));
    }

    #[test]
    fn line_index_from_invalid_utf8_bytes() {
        let idx = LineIndex::from_bytes(b"/\xff\n/ok");
        assert_eq!(idx.line_count(), 2);
        assert_eq!(idx.line_start(1), Some(3));
        assert_eq!(idx.line_start(2), None);
    }

    #[test]
    fn line_index_offset_past_end() {
        let idx = LineIndex::new("hi");
        assert_eq!(idx.line_col(100), (0, 100));
    }

    // ── Span ────────────────────────────────────────────────────────────

    #[test]
    fn span_len_and_cover() {
        let s = Span::new(5, 10);
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
        assert!(Span::empty(7).is_empty());
        assert_eq!(s.cover(Span::new(2, 6)), Span::new(2, 10));
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    // ── Kinds and codes ─────────────────────────────────────────────────

    #[test]
    fn kinds_round_trip_through_codes() {
        let all = [
            DiagnosticKind::UnterminatedVariable,
            DiagnosticKind::EmptyVariableName,
            DiagnosticKind::UnexpectedCharacter,
            DiagnosticKind::DanglingDelimiter,
            DiagnosticKind::EmptySegment,
            DiagnosticKind::PortOutOfRange,
            DiagnosticKind::InvalidUtf8,
        ];
        for kind in all {
            assert_eq!(DiagnosticKind::from_code(kind.code()), Some(kind));
            assert!(
                explain(kind.code()).is_some(),
                "diagnostic code {} has no explain() entry",
                kind.code()
            );
        }
    }

    #[test]
    fn syntax_kinds_default_to_warnings() {
        assert_eq!(
            DiagnosticKind::UnterminatedVariable.default_severity(),
            Severity::Warn
        );
        assert_eq!(
            DiagnosticKind::DanglingDelimiter.default_severity(),
            Severity::Warn
        );
        assert_eq!(DiagnosticKind::InvalidUtf8.default_severity(), Severity::Error);
    }

    #[test]
    fn unknown_code_has_no_kind_or_explanation() {
        let d = Diagnostic::new("CUSTOM", Severity::Warn, "custom message", None);
        assert!(d.kind().is_none());
        assert!(d.explain().is_none());
        assert!(default_severity("CUSTOM").is_none());
    }

    // ── Diagnostic ──────────────────────────────────────────────────────

    #[test]
    fn diagnostic_of_kind_uses_registry() {
        let d = Diagnostic::of_kind(
            DiagnosticKind::EmptyVariableName,
            "empty variable name",
            Span::new(0, 2),
        );
        assert_eq!(d.id, "URLT1002");
        assert_eq!(d.severity, Severity::Warn);
        assert_eq!(d.kind(), Some(DiagnosticKind::EmptyVariableName));
        assert_eq!(d.span, Some(Span::new(0, 2)));
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::of_kind(
            DiagnosticKind::UnterminatedVariable,
            "unterminated variable",
            Span::new(0, 1),
        );
        assert_eq!(format!("{d}"), "warn[URLT1001]: unterminated variable");
    }

    #[test]
    fn diagnostic_serde_roundtrip() {
        let d = Diagnostic::of_kind(
            DiagnosticKind::UnexpectedCharacter,
            "unexpected `x`",
            Span::new(10, 11),
        )
        .with_context(BTreeMap::from([("found".into(), "x".into())]));
        let json = serde_json::to_string(&d).unwrap();
        let d2: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, d2);
    }

    #[test]
    fn diagnostic_serde_omits_none_fields() {
        let d = Diagnostic::new(codes::EMPTY_SEGMENT, Severity::Info, "note", None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("span"), "None span should be omitted: {json}");
        assert!(
            !json.contains("context"),
            "None context should be omitted: {json}"
        );
    }

    #[test]
    fn diagnostic_context_deterministic_order() {
        let d = Diagnostic::new(codes::UNEXPECTED_CHARACTER, Severity::Warn, "test", None)
            .with_context(BTreeMap::from([
                ("z_last".into(), "1".into()),
                ("a_first".into(), "2".into()),
            ]));
        let json = serde_json::to_string(&d).unwrap();
        let a_pos = json.find("a_first").unwrap();
        let z_pos = json.find("z_last").unwrap();
        assert!(a_pos < z_pos, "context should serialize sorted: {json}");
    }
}
