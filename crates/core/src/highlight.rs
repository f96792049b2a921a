//! Syntax highlighting: a capture name for every token of a parsed line.
//!
//! Capture names follow the usual editor highlight-query vocabulary, so a
//! host can map them onto its theme directly.

use serde::Serialize;
use url_template_diagnostics::Span;

use crate::grammar::ast::{LeafKind, SourceFile, UrlLine};

/// Highlight class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capture {
    /// Scheme keywords and `localhost`.
    #[serde(rename = "keyword")]
    Keyword,
    /// Domain labels and path segments.
    #[serde(rename = "string.special.url")]
    Url,
    /// Port digits.
    #[serde(rename = "number")]
    Number,
    /// Variable names.
    #[serde(rename = "variable")]
    Variable,
    /// Path parameter names.
    #[serde(rename = "variable.parameter")]
    Parameter,
    /// Query keys.
    #[serde(rename = "property")]
    Property,
    /// Query value text.
    #[serde(rename = "string")]
    String,
    /// `://`, `.`, `:`, `/`, `?`, `&`, `=`.
    #[serde(rename = "punctuation.delimiter")]
    Delimiter,
    /// Variable braces.
    #[serde(rename = "punctuation.bracket")]
    Bracket,
    /// Text kept verbatim after a recovered error.
    #[serde(rename = "error")]
    Error,
}

impl Capture {
    /// The capture name.
    pub fn name(self) -> &'static str {
        match self {
            Capture::Keyword => "keyword",
            Capture::Url => "string.special.url",
            Capture::Number => "number",
            Capture::Variable => "variable",
            Capture::Parameter => "variable.parameter",
            Capture::Property => "property",
            Capture::String => "string",
            Capture::Delimiter => "punctuation.delimiter",
            Capture::Bracket => "punctuation.bracket",
            Capture::Error => "error",
        }
    }

    fn of(kind: LeafKind) -> Option<Capture> {
        Some(match kind {
            LeafKind::Scheme | LeafKind::Hostname => Capture::Keyword,
            LeafKind::Label | LeafKind::Segment => Capture::Url,
            LeafKind::Port => Capture::Number,
            LeafKind::VariableName => Capture::Variable,
            LeafKind::ParamName => Capture::Parameter,
            LeafKind::Key => Capture::Property,
            LeafKind::ValueText => Capture::String,
            LeafKind::SchemeSeparator
            | LeafKind::Dot
            | LeafKind::PortColon
            | LeafKind::Slash
            | LeafKind::ParamColon
            | LeafKind::Question
            | LeafKind::Ampersand
            | LeafKind::Equals => Capture::Delimiter,
            LeafKind::VariableOpen | LeafKind::VariableClose => Capture::Bracket,
            LeafKind::Opaque => Capture::Error,
            LeafKind::Trivia | LeafKind::Newline => return None,
        })
    }
}

/// A highlighted source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    /// Source span of the token.
    pub span: Span,
    /// Highlight class.
    pub capture: Capture,
}

/// Highlight every non-whitespace token of `line`, in source order.
pub fn highlight_line(line: &UrlLine) -> Vec<HighlightSpan> {
    line.leaves()
        .into_iter()
        .filter_map(|leaf| {
            Capture::of(leaf.kind).map(|capture| HighlightSpan {
                span: leaf.span,
                capture,
            })
        })
        .collect()
}

/// Highlight every line of `file`.
pub fn highlight_file(file: &SourceFile) -> Vec<HighlightSpan> {
    file.lines.iter().flat_map(highlight_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;

    fn captures(input: &str) -> Vec<(&'static str, String)> {
        let res = parse_str(input);
        highlight_file(&res.file)
            .into_iter()
            .map(|h| (h.capture.name(), input[h.span.start..h.span.end].to_string()))
            .collect()
    }

    #[test]
    fn full_template() {
        let caps = captures("https://localhost:8080/users/:id?q={term}");
        let expected: Vec<(&str, String)> = [
            ("keyword", "https"),
            ("punctuation.delimiter", "://"),
            ("keyword", "localhost"),
            ("punctuation.delimiter", ":"),
            ("number", "8080"),
            ("punctuation.delimiter", "/"),
            ("string.special.url", "users"),
            ("punctuation.delimiter", "/"),
            ("punctuation.delimiter", ":"),
            ("variable.parameter", "id"),
            ("punctuation.delimiter", "?"),
            ("property", "q"),
            ("punctuation.delimiter", "="),
            ("punctuation.bracket", "{"),
            ("variable", "term"),
            ("punctuation.bracket", "}"),
        ]
        .into_iter()
        .map(|(c, t)| (c, t.to_string()))
        .collect();
        assert_eq!(caps, expected);
    }

    #[test]
    fn whitespace_is_not_highlighted() {
        let caps = captures("/a b \n");
        assert_eq!(
            caps,
            vec![
                ("punctuation.delimiter", "/".to_string()),
                ("string.special.url", "a b".to_string()),
            ]
        );
    }

    #[test]
    fn opaque_text_is_an_error() {
        let caps = captures("/{}");
        assert_eq!(caps[1], ("error", "{}".to_string()));
    }

    #[test]
    fn capture_names_serialize() {
        let json = serde_json::to_string(&Capture::Url).unwrap();
        assert_eq!(json, "\"string.special.url\"");
    }
}
