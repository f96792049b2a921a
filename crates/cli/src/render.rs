//! Pretty diagnostic rendering using ariadne.
//!
//! Converts the toolchain's [`Diagnostic`] type into ariadne [`Report`]s for
//! coloured, source-annotated terminal output. Falls back to structured JSON
//! when the output is piped or when the user explicitly requests it.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, IndexType, Label, Report, ReportKind, Source};
use url_template_diagnostics::{Diagnostic, LineIndex, Severity};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or pick by whether stdout is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            // Default: pretty for interactive terminals, JSON for pipes
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warn => "warning",
        Severity::Info => "info",
        _ => "diagnostic",
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics with source context to stderr.
///
/// Spans are byte offsets into `source`. When the source is not valid UTF-8
/// the reports fall back to `file:line:col` headers without snippets.
pub(crate) fn render_diagnostics_pretty(source: &[u8], filename: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    match std::str::from_utf8(source) {
        Ok(text) => render_with_snippets(text, filename, diagnostics),
        Err(_) => render_plain(source, filename, diagnostics),
    }
}

fn render_with_snippets(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    let config = Config::default()
        .with_compact(false)
        .with_index_type(IndexType::Byte);

    // Build the Source once and reuse across all reports.
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let Some(span) = &diag.span else {
            eprintln!(
                "{}[{}]: {}",
                severity_label(diag.severity),
                diag.id,
                diag.message
            );
            continue;
        };
        // Clamp to the source so a stale span cannot panic the renderer.
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let mut builder = Report::build(report_kind(diag.severity), (filename, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config);

        builder = builder.with_label(
            Label::new((filename, start..end))
                .with_message(context_note(diag).unwrap_or_else(|| diag.message.clone()))
                .with_color(severity_color(diag.severity)),
        );

        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }

        builder.finish().eprint(&mut cache).ok();
    }
}

fn render_plain(source: &[u8], filename: &str, diagnostics: &[Diagnostic]) {
    let index = LineIndex::from_bytes(source);
    for diag in diagnostics {
        let location = match diag.span {
            Some(span) => {
                let (line, col) = index.line_col(span.start);
                format!("{filename}:{}:{}", line + 1, col + 1)
            }
            None => filename.to_string(),
        };
        eprintln!(
            "{location}: {}[{}]: {}",
            severity_label(diag.severity),
            diag.id,
            diag.message
        );
        if let Some(note) = context_note(diag) {
            eprintln!("  = note: {note}");
        }
        if let Some(explanation) = diag.explain() {
            eprintln!("  = help: {explanation}");
        }
    }
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured summary line showing error/warning/info counts.
///
/// Example: `2 errors, 1 warning`
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let (mut errors, mut warnings, mut infos) = (0usize, 0usize, 0usize);
    for d in diagnostics {
        match d.severity {
            Severity::Error => errors += 1,
            Severity::Info => infos += 1,
            _ => warnings += 1,
        }
    }

    if errors + warnings + infos == 0 {
        return;
    }

    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{errors} error{s}").fg(Color::Red)));
    }
    if warnings > 0 {
        let s = if warnings == 1 { "" } else { "s" };
        parts.push(format!(
            "{}",
            format!("{warnings} warning{s}").fg(Color::Yellow)
        ));
    }
    if infos > 0 {
        parts.push(format!("{}", format!("{infos} info").fg(Color::Blue)));
    }
    eprintln!("{}", parts.join(", "));
}
