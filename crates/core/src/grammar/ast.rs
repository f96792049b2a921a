//! Syntax tree for parsed URL template lines.

use serde::{Deserialize, Serialize};
use url_template_diagnostics::Span;

use super::keywords::Scheme;

/// A parsed source text: one [`UrlLine`] per input line.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SourceFile {
    /// Lines in input order. Their spans are disjoint and cover the input.
    pub lines: Vec<UrlLine>,
}

/// Parse outcome of a single line.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    /// Parsed without diagnostics.
    #[default]
    Complete,
    /// Parsed with at least one recovered diagnostic.
    Partial,
    /// Not parsed at all (malformed UTF-8).
    Unparsed,
}

/// One input line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UrlLine {
    /// The URL template on this line, absent for a blank line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<UrlComponents>,
    /// Span of the terminating `\n`, absent on a final unterminated line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newline: Option<Span>,
    /// Whitespace skipped between tokens, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trivia: Vec<Trivia>,
    /// Span of the whole line including its newline.
    pub span: Span,
    /// Whether the line parsed cleanly.
    pub status: LineStatus,
}

/// Skipped whitespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trivia {
    /// The whitespace text.
    pub text: String,
    /// Source span of the whitespace.
    pub span: Span,
}

/// Literal text with its source span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Text {
    /// The source text.
    pub text: String,
    /// Source span of the text.
    pub span: Span,
}

/// The parts of a URL template, in their fixed relative order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UrlComponents {
    /// `scheme://`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    /// Host and optional port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_and_port: Option<DomainAndPort>,
    /// Path items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,
    /// `?key=value&...`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryString>,
    /// Span from the first to the last component token.
    pub span: Span,
}

/// A scheme keyword and the `://` that follows it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Protocol {
    /// The recognized scheme.
    pub scheme: Scheme,
    /// Span of the scheme keyword.
    pub scheme_span: Span,
    /// Span of `://`.
    pub separator: Span,
    /// Span of the whole protocol.
    pub span: Span,
}

/// A domain with an optional port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainAndPort {
    /// The host.
    pub domain: Domain,
    /// `:digits` after the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
    /// Span of the domain and port.
    pub span: Span,
}

/// A port number written as literal digits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Port {
    /// Span of the `:`.
    pub colon: Span,
    /// Span of the digits.
    pub digits: Span,
    /// The digits as written (leading zeros kept).
    pub text: String,
    /// Numeric value, absent when the digits exceed 65535.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u16>,
    /// Span of the colon and digits.
    pub span: Span,
}

/// How a domain was classified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    /// The `localhost` keyword.
    Hostname,
    /// Four numeric labels, each at most 255.
    Ipv4,
    /// Any other sequence of dot-joined labels.
    DotSeparated,
}

/// A host: labels joined by `.`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    /// Classification of the host.
    pub kind: DomainKind,
    /// Labels in source order.
    pub labels: Vec<DomainLabel>,
    /// A final `.` with no label after it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_dot: Option<Span>,
    /// Span of the whole domain.
    pub span: Span,
}

/// One domain label and the `.` before it, if any.
///
/// A label glued to the previous one (`api-{env}`) has no dot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainLabel {
    /// Span of the preceding `.`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot: Option<Span>,
    /// Label content.
    pub kind: LabelKind,
    /// Span of the dot and label.
    pub span: Span,
}

/// Content of a domain label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum LabelKind {
    /// A run of host-name characters.
    Name(Text),
    /// A `{name}` placeholder.
    Variable(Variable),
    /// Text kept verbatim after a recovered error.
    Opaque(Text),
}

/// Path components in source order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Path {
    /// The components. Each `/` starts a new component.
    pub components: Vec<PathComponent>,
    /// Span of the whole path.
    pub span: Span,
}

/// One path piece and the `/` before it, if any.
///
/// Pieces glued into one item (`/user-{id}.json`) follow the first piece
/// without a slash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathComponent {
    /// Span of the preceding `/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slash: Option<Span>,
    /// Component content.
    pub kind: PathComponentKind,
    /// Span of the slash and content.
    pub span: Span,
}

/// Content of a path component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PathComponentKind {
    /// A plain segment.
    Segment(Text),
    /// A `:name` capture.
    Param(PathParam),
    /// A `{name}` placeholder.
    Variable(Variable),
    /// Text kept verbatim after a recovered error.
    Opaque(Text),
    /// Nothing after the slash (`/`, `a//b`, `a/?q`).
    Empty,
}

/// A `:name` path parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathParam {
    /// Span of the `:`.
    pub colon: Span,
    /// The parameter name.
    pub name: Text,
    /// Span of the colon and name.
    pub span: Span,
}

/// Brace form of a variable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BraceStyle {
    /// `{name}`
    Single,
    /// `{{name}}`
    Double,
}

impl BraceStyle {
    /// Opening delimiter text.
    pub fn open(self) -> &'static str {
        match self {
            BraceStyle::Single => "{",
            BraceStyle::Double => "{{",
        }
    }

    /// Closing delimiter text.
    pub fn close(self) -> &'static str {
        match self {
            BraceStyle::Single => "}",
            BraceStyle::Double => "}}",
        }
    }
}

/// A `{name}` placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variable {
    /// Span of the opening delimiter.
    pub open: Span,
    /// The identifier between the braces.
    pub name: Text,
    /// Span of the closing delimiter.
    pub close: Span,
    /// Single or double braces.
    pub style: BraceStyle,
    /// Span of the whole placeholder.
    pub span: Span,
}

/// `?` and the parameters after it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryString {
    /// Span of the `?`.
    pub question: Span,
    /// Parameters in appearance order, duplicates kept.
    pub params: Vec<QueryParam>,
    /// Span of a final `&` with no parameter after it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_separator: Option<Span>,
    /// Span of the whole query string.
    pub span: Span,
}

/// One `key=value` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryParam {
    /// Span of the `&` before this parameter (absent for the first).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<Span>,
    /// The key.
    pub key: Key,
    /// Present only when `=` follows the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Span of the separator, key and value.
    pub span: Span,
}

/// A query key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Key {
    /// Key content.
    pub kind: KeyKind,
    /// Span of the key.
    pub span: Span,
}

impl Key {
    /// The literal key text, if the key is a literal.
    pub fn literal(&self) -> Option<&str> {
        match &self.kind {
            KeyKind::Literal(t) => Some(&t.text),
            _ => None,
        }
    }
}

/// Content of a query key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum KeyKind {
    /// Letters, digits, `-` and `_`. Empty after a dangling `&` or `?`.
    Literal(Text),
    /// A `{name}` placeholder.
    Variable(Variable),
    /// Text kept verbatim after a recovered error.
    Opaque(Text),
}

/// `=` and the value text after it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Value {
    /// Span of the `=`.
    pub equals: Span,
    /// Text runs and placeholders. Empty for `key=`.
    pub parts: Vec<ValuePart>,
    /// Span of the equals sign and parts.
    pub span: Span,
}

impl Value {
    /// Whether the value has no content (`key=`).
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The value as plain text, if it contains no placeholders.
    pub fn literal(&self) -> Option<String> {
        self.parts
            .iter()
            .map(|p| match p {
                ValuePart::Text(t) | ValuePart::Opaque(t) => Some(t.text.as_str()),
                ValuePart::Variable(_) => None,
            })
            .collect()
    }
}

/// A piece of a query value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ValuePart {
    /// Free text.
    Text(Text),
    /// A `{name}` placeholder.
    Variable(Variable),
    /// Text kept verbatim after a recovered error.
    Opaque(Text),
}

// ── Leaves ──────────────────────────────────────────────────────────────

/// Role of a leaf token in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// Scheme keyword.
    Scheme,
    /// `://`
    SchemeSeparator,
    /// The `localhost` keyword.
    Hostname,
    /// Domain label text.
    Label,
    /// `.` between labels.
    Dot,
    /// `:` before a port.
    PortColon,
    /// Port digits.
    Port,
    /// `/`
    Slash,
    /// Path segment text.
    Segment,
    /// `:` before a path parameter.
    ParamColon,
    /// Path parameter name.
    ParamName,
    /// `{` or `{{`
    VariableOpen,
    /// Variable identifier.
    VariableName,
    /// `}` or `}}`
    VariableClose,
    /// `?`
    Question,
    /// `&`
    Ampersand,
    /// Query key text.
    Key,
    /// `=`
    Equals,
    /// Query value text.
    ValueText,
    /// Text kept verbatim after a recovered error.
    Opaque,
    /// Skipped whitespace.
    Trivia,
    /// `\n`
    Newline,
}

/// A literal token of a parsed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf<'a> {
    /// What the token is.
    pub kind: LeafKind,
    /// The token text.
    pub text: &'a str,
    /// Source span of the token.
    pub span: Span,
}

struct LeafSink<'a> {
    out: Vec<Leaf<'a>>,
}

impl<'a> LeafSink<'a> {
    fn push(&mut self, kind: LeafKind, text: &'a str, span: Span) {
        if !span.is_empty() {
            self.out.push(Leaf { kind, text, span });
        }
    }

    fn text(&mut self, kind: LeafKind, t: &'a Text) {
        self.push(kind, &t.text, t.span);
    }

    fn variable(&mut self, v: &'a Variable) {
        self.push(LeafKind::VariableOpen, v.style.open(), v.open);
        self.text(LeafKind::VariableName, &v.name);
        self.push(LeafKind::VariableClose, v.style.close(), v.close);
    }

    fn components(&mut self, c: &'a UrlComponents) {
        if let Some(p) = &c.protocol {
            self.push(LeafKind::Scheme, p.scheme.as_str(), p.scheme_span);
            self.push(LeafKind::SchemeSeparator, "://", p.separator);
        }
        if let Some(dp) = &c.domain_and_port {
            let label_kind = if dp.domain.kind == DomainKind::Hostname {
                LeafKind::Hostname
            } else {
                LeafKind::Label
            };
            for label in &dp.domain.labels {
                if let Some(dot) = label.dot {
                    self.push(LeafKind::Dot, ".", dot);
                }
                match &label.kind {
                    LabelKind::Name(t) => self.text(label_kind, t),
                    LabelKind::Variable(v) => self.variable(v),
                    LabelKind::Opaque(t) => self.text(LeafKind::Opaque, t),
                }
            }
            if let Some(dot) = dp.domain.trailing_dot {
                self.push(LeafKind::Dot, ".", dot);
            }
            if let Some(port) = &dp.port {
                self.push(LeafKind::PortColon, ":", port.colon);
                self.push(LeafKind::Port, &port.text, port.digits);
            }
        }
        if let Some(path) = &c.path {
            for comp in &path.components {
                if let Some(slash) = comp.slash {
                    self.push(LeafKind::Slash, "/", slash);
                }
                match &comp.kind {
                    PathComponentKind::Segment(t) => self.text(LeafKind::Segment, t),
                    PathComponentKind::Param(p) => {
                        self.push(LeafKind::ParamColon, ":", p.colon);
                        self.text(LeafKind::ParamName, &p.name);
                    }
                    PathComponentKind::Variable(v) => self.variable(v),
                    PathComponentKind::Opaque(t) => self.text(LeafKind::Opaque, t),
                    PathComponentKind::Empty => {}
                }
            }
        }
        if let Some(q) = &c.query {
            self.push(LeafKind::Question, "?", q.question);
            for param in &q.params {
                if let Some(amp) = param.separator {
                    self.push(LeafKind::Ampersand, "&", amp);
                }
                match &param.key.kind {
                    KeyKind::Literal(t) => self.text(LeafKind::Key, t),
                    KeyKind::Variable(v) => self.variable(v),
                    KeyKind::Opaque(t) => self.text(LeafKind::Opaque, t),
                }
                if let Some(value) = &param.value {
                    self.push(LeafKind::Equals, "=", value.equals);
                    for part in &value.parts {
                        match part {
                            ValuePart::Text(t) => self.text(LeafKind::ValueText, t),
                            ValuePart::Variable(v) => self.variable(v),
                            ValuePart::Opaque(t) => self.text(LeafKind::Opaque, t),
                        }
                    }
                }
            }
            if let Some(amp) = q.trailing_separator {
                self.push(LeafKind::Ampersand, "&", amp);
            }
        }
    }
}

// ── Queries ─────────────────────────────────────────────────────────────

impl UrlLine {
    /// Every literal token of the line in source order, including skipped
    /// whitespace and the newline.
    ///
    /// Concatenating the `text` of the leaves reproduces the line exactly.
    /// An [`Unparsed`](LineStatus::Unparsed) line has no leaves.
    pub fn leaves(&self) -> Vec<Leaf<'_>> {
        let mut sink = LeafSink { out: Vec::new() };
        if let Some(c) = &self.components {
            sink.components(c);
        }
        for t in &self.trivia {
            sink.push(LeafKind::Trivia, &t.text, t.span);
        }
        if let Some(nl) = self.newline {
            sink.push(LeafKind::Newline, "\n", nl);
        }
        let mut leaves = sink.out;
        leaves.sort_by_key(|l| l.span.start);
        leaves
    }

    /// Every variable on the line in source order.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut out = Vec::new();
        let Some(c) = &self.components else {
            return out;
        };
        if let Some(dp) = &c.domain_and_port {
            for label in &dp.domain.labels {
                if let LabelKind::Variable(v) = &label.kind {
                    out.push(v);
                }
            }
        }
        if let Some(path) = &c.path {
            for comp in &path.components {
                if let PathComponentKind::Variable(v) = &comp.kind {
                    out.push(v);
                }
            }
        }
        for param in self.query_params() {
            if let KeyKind::Variable(v) = &param.key.kind {
                out.push(v);
            }
            for part in param.value.iter().flat_map(|v| &v.parts) {
                if let ValuePart::Variable(v) = part {
                    out.push(v);
                }
            }
        }
        out
    }

    /// Every `:name` path parameter on the line in source order.
    pub fn path_params(&self) -> Vec<&PathParam> {
        self.components
            .as_ref()
            .and_then(|c| c.path.as_ref())
            .map(|p| {
                p.components
                    .iter()
                    .filter_map(|comp| match &comp.kind {
                        PathComponentKind::Param(p) => Some(p),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Query parameters in appearance order (empty without a query).
    pub fn query_params(&self) -> &[QueryParam] {
        self.components
            .as_ref()
            .and_then(|c| c.query.as_ref())
            .map_or(&[], |q| q.params.as_slice())
    }
}
