//! Shared test helpers for `url_template_core` integration tests.

#![allow(unreachable_pub)]

use url_template_core::grammar::ast::{
    KeyKind, LabelKind, PathComponentKind, QueryParam, UrlComponents, UrlLine, ValuePart,
    Variable,
};
use url_template_core::grammar::parser::ParseResult;
use url_template_diagnostics::Diagnostic;

// ─── Parse-result helpers ────────────────────────────────────────────────────

/// Components of line `idx`, panicking if the line is blank.
#[allow(dead_code)]
pub fn components(result: &ParseResult, idx: usize) -> &UrlComponents {
    result.file.lines[idx]
        .components
        .as_ref()
        .unwrap_or_else(|| panic!("line {idx} has no components"))
}

/// Collect diagnostic codes from parser diagnostics.
#[allow(dead_code)]
pub fn extract_diag_codes(result: &ParseResult) -> Vec<String> {
    result
        .diagnostics
        .iter()
        .map(|d| d.id.to_string())
        .collect()
}

/// Find first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(issues: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    issues
        .iter()
        .find(|d| d.id == code)
        .unwrap_or_else(|| panic!("expected diagnostic {code}, got: {issues:?}"))
}

// ─── Tree descriptions ───────────────────────────────────────────────────────
// Compact strings for asserting on tree shape:
// `text`, `{name}`, `{{name}}`, `:name`, `!opaque`, and `` for an empty item.

fn describe_variable(v: &Variable) -> String {
    format!("{}{}{}", v.style.open(), v.name.text, v.style.close())
}

/// Domain labels, dots omitted.
#[allow(dead_code)]
pub fn domain_labels(c: &UrlComponents) -> Vec<String> {
    c.domain_and_port
        .as_ref()
        .map(|dp| {
            dp.domain
                .labels
                .iter()
                .map(|l| match &l.kind {
                    LabelKind::Name(t) => t.text.clone(),
                    LabelKind::Variable(v) => describe_variable(v),
                    LabelKind::Opaque(t) => format!("!{}", t.text),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Path components, slashes omitted.
#[allow(dead_code)]
pub fn path_items(c: &UrlComponents) -> Vec<String> {
    c.path
        .as_ref()
        .map(|p| {
            p.components
                .iter()
                .map(|comp| match &comp.kind {
                    PathComponentKind::Segment(t) => t.text.clone(),
                    PathComponentKind::Param(p) => format!(":{}", p.name.text),
                    PathComponentKind::Variable(v) => describe_variable(v),
                    PathComponentKind::Opaque(t) => format!("!{}", t.text),
                    PathComponentKind::Empty => String::new(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `key`, `key=`, or `key=value` per query parameter.
#[allow(dead_code)]
pub fn query_pairs(params: &[QueryParam]) -> Vec<String> {
    params
        .iter()
        .map(|p| {
            let mut s = match &p.key.kind {
                KeyKind::Literal(t) => t.text.clone(),
                KeyKind::Variable(v) => describe_variable(v),
                KeyKind::Opaque(t) => format!("!{}", t.text),
            };
            if let Some(value) = &p.value {
                s.push('=');
                for part in &value.parts {
                    match part {
                        ValuePart::Text(t) => s.push_str(&t.text),
                        ValuePart::Variable(v) => s.push_str(&describe_variable(v)),
                        ValuePart::Opaque(t) => {
                            s.push('!');
                            s.push_str(&t.text);
                        }
                    }
                }
            }
            s
        })
        .collect()
}

// ─── Invariants ──────────────────────────────────────────────────────────────

/// Concatenated leaf text of a line.
#[allow(dead_code)]
pub fn leaf_text(line: &UrlLine) -> String {
    line.leaves().iter().map(|l| l.text).collect()
}

/// Assert lines partition the input and every line's leaves reproduce it
/// with no gaps or overlaps.
#[allow(dead_code)]
pub fn assert_round_trip(result: &ParseResult, input: &str) {
    let mut pos = 0usize;
    for (i, line) in result.file.lines.iter().enumerate() {
        assert_eq!(
            line.span.start, pos,
            "line {i} does not start where line {} ended in {input:?}",
            i.saturating_sub(1)
        );
        let mut cursor = line.span.start;
        for leaf in line.leaves() {
            assert_eq!(
                leaf.span.start, cursor,
                "gap or overlap before {leaf:?} in {input:?}"
            );
            assert_eq!(
                &input[leaf.span.start..leaf.span.end],
                leaf.text,
                "leaf text differs from source in {input:?}"
            );
            cursor = leaf.span.end;
        }
        assert_eq!(cursor, line.span.end, "line {i} not fully covered in {input:?}");
        pos = line.span.end;
    }
    assert_eq!(pos, input.len(), "lines do not cover {input:?}");
}
