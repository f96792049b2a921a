pub use url_template_diagnostics::{
    Diagnostic, DiagnosticKind, LineIndex, Severity, Span, codes, explain,
};

use std::collections::BTreeMap;

/// Accumulates diagnostics reported while parsing.
///
/// The parser reports into the collector and keeps going; nothing here can
/// stop a parse.
#[derive(Debug, Default)]
pub struct Collector {
    diags: Vec<Diagnostic>,
}

impl Collector {
    /// An empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic of `kind` at `span` with its registered severity.
    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>, span: Span) {
        self.push(Diagnostic::of_kind(kind, message, span));
    }

    /// Like [`report`](Self::report), with machine-readable context.
    pub fn report_with(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        span: Span,
        context: BTreeMap<String, String>,
    ) {
        self.push(Diagnostic::of_kind(kind, message, span).with_context(context));
    }

    /// Record an already built diagnostic.
    pub fn push(&mut self, diag: Diagnostic) {
        tracing::trace!(id = %diag.id, span = ?diag.span, "diagnostic");
        self.diags.push(diag);
    }

    /// Number of diagnostics recorded so far.
    pub fn len(&self) -> usize {
        self.diags.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    /// Diagnostics recorded so far, in report order.
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diags
    }

    /// Consume the collector.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diags
    }
}
