//! Emitter: rebuilds template text from a parsed tree.
//!
//! Skipped whitespace is dropped; opaque spans are written back verbatim so a
//! line with diagnostics still emits everything it contained.

use crate::grammar::ast::{
    KeyKind, LabelKind, PathComponentKind, PathParam, SourceFile, UrlComponents, UrlLine,
    ValuePart, Variable,
};

/// A placeholder the emitter is about to write.
#[derive(Debug, Clone, Copy)]
pub enum Placeholder<'a> {
    /// A `{name}` variable.
    Variable(&'a Variable),
    /// A `:name` path parameter.
    PathParam(&'a PathParam),
}

// ── Public API ──────────────────────────────────────────────────────────

/// Emit one line without its whitespace trivia or newline.
///
/// An unparsed line emits as the empty string.
pub fn emit_line(line: &UrlLine) -> String {
    emit_line_with(line, |_| None)
}

/// Emit every line, each followed by `\n` when it had one.
pub fn emit_file(file: &SourceFile) -> String {
    let mut out = String::new();
    for line in &file.lines {
        out.push_str(&emit_line(line));
        if line.newline.is_some() {
            out.push('\n');
        }
    }
    out
}

/// Emit one line, asking `subst` for a replacement at every placeholder.
///
/// Returning `None` writes the placeholder as it was written in the source.
pub fn emit_line_with<F>(line: &UrlLine, mut subst: F) -> String
where
    F: FnMut(Placeholder<'_>) -> Option<String>,
{
    let mut out = String::new();
    if let Some(c) = &line.components {
        emit_components(&mut out, c, &mut subst);
    }
    out
}

// ── Components ──────────────────────────────────────────────────────────

fn emit_components<F>(out: &mut String, c: &UrlComponents, subst: &mut F)
where
    F: FnMut(Placeholder<'_>) -> Option<String>,
{
    if let Some(p) = &c.protocol {
        out.push_str(p.scheme.as_str());
        out.push_str("://");
    }

    if let Some(dp) = &c.domain_and_port {
        for label in &dp.domain.labels {
            if label.dot.is_some() {
                out.push('.');
            }
            match &label.kind {
                LabelKind::Name(t) | LabelKind::Opaque(t) => out.push_str(&t.text),
                LabelKind::Variable(v) => emit_variable(out, v, subst),
            }
        }
        if dp.domain.trailing_dot.is_some() {
            out.push('.');
        }
        if let Some(port) = &dp.port {
            out.push(':');
            out.push_str(&port.text);
        }
    }

    if let Some(path) = &c.path {
        for comp in &path.components {
            if comp.slash.is_some() {
                out.push('/');
            }
            match &comp.kind {
                PathComponentKind::Segment(t) | PathComponentKind::Opaque(t) => {
                    out.push_str(&t.text);
                }
                PathComponentKind::Param(p) => match subst(Placeholder::PathParam(p)) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push(':');
                        out.push_str(&p.name.text);
                    }
                },
                PathComponentKind::Variable(v) => emit_variable(out, v, subst),
                PathComponentKind::Empty => {}
            }
        }
    }

    if let Some(q) = &c.query {
        out.push('?');
        for param in &q.params {
            if param.separator.is_some() {
                out.push('&');
            }
            match &param.key.kind {
                KeyKind::Literal(t) | KeyKind::Opaque(t) => out.push_str(&t.text),
                KeyKind::Variable(v) => emit_variable(out, v, subst),
            }
            if let Some(value) = &param.value {
                out.push('=');
                for part in &value.parts {
                    match part {
                        ValuePart::Text(t) | ValuePart::Opaque(t) => out.push_str(&t.text),
                        ValuePart::Variable(v) => emit_variable(out, v, subst),
                    }
                }
            }
        }
        if q.trailing_separator.is_some() {
            out.push('&');
        }
    }
}

fn emit_variable<F>(out: &mut String, v: &Variable, subst: &mut F)
where
    F: FnMut(Placeholder<'_>) -> Option<String>,
{
    match subst(Placeholder::Variable(v)) {
        Some(value) => out.push_str(&value),
        None => {
            out.push_str(v.style.open());
            out.push_str(&v.name.text);
            out.push_str(v.style.close());
        }
    }
}
