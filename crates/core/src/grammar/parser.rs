//! Recursive-descent parser for URL template lines.
//!
//! Each line is parsed on its own. Problems are reported to the collector and
//! the offending text is kept as an opaque node, so every line yields a tree.

use super::{
    ast::{
        BraceStyle, Domain, DomainAndPort, DomainKind, DomainLabel, Key, KeyKind, LabelKind,
        LineStatus, Path, PathComponent, PathComponentKind, PathParam, Port, Protocol,
        QueryParam, QueryString, SourceFile, Text, Trivia, UrlComponents, UrlLine, Value,
        ValuePart, Variable,
    },
    classify::is_whitespace_to_skip,
    diag::{Collector, Diagnostic, DiagnosticKind, Span},
    keywords::KeywordTrie,
    lexer::{LexContext, Lexer, TokKind, Token},
};
use crate::options::ParseOptions;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Result of parsing a source text.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ParseResult {
    /// The parsed tree, one entry per input line.
    pub file: SourceFile,
    /// Diagnostics produced during parsing, in source order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of parsing a single line.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LineResult {
    /// The parsed line.
    pub line: UrlLine,
    /// Diagnostics for this line.
    pub diagnostics: Vec<Diagnostic>,
}

/// Stops for opaque runs inside a path.
const PATH_STOPS: &[char] = &['/', '?', '{'];
/// Stops for opaque query keys.
const KEY_STOPS: &[char] = &['&', '='];

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parse a source text with default options.
pub fn parse_str(input: &str) -> ParseResult {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse a source text line by line.
///
/// Lines are split on `\n`; a final line without a newline is still parsed.
/// Every line is parsed independently, so a malformed line never affects its
/// neighbours.
pub fn parse_with_options(input: &str, options: &ParseOptions) -> ParseResult {
    let keywords = options.keyword_trie();
    let mut diags = Collector::new();
    let mut lines = Vec::new();
    let mut start = 0usize;
    for text in input.split_inclusive('\n') {
        lines.push(LineParser::new(text, start, &keywords, options, &mut diags).parse());
        start += text.len();
    }
    tracing::debug!(
        lines = lines.len(),
        diagnostics = diags.len(),
        "parsed source"
    );
    ParseResult {
        file: SourceFile { lines },
        diagnostics: diags.into_vec(),
    }
}

/// Parse raw bytes line by line.
///
/// A line that is not valid UTF-8 is left [`Unparsed`](LineStatus::Unparsed)
/// with one `InvalidUtf8` error; the other lines parse normally.
pub fn parse_bytes(input: &[u8], options: &ParseOptions) -> ParseResult {
    let keywords = options.keyword_trie();
    let mut diags = Collector::new();
    let mut lines = Vec::new();
    let mut start = 0usize;
    for bytes in input.split_inclusive(|b| *b == b'\n') {
        let line = match std::str::from_utf8(bytes) {
            Ok(text) => LineParser::new(text, start, &keywords, options, &mut diags).parse(),
            Err(err) => {
                let bad_start = start + err.valid_up_to();
                let bad_len = err
                    .error_len()
                    .unwrap_or(bytes.len() - err.valid_up_to());
                diags.report_with(
                    DiagnosticKind::InvalidUtf8,
                    "line is not valid UTF-8",
                    Span::new(bad_start, bad_start + bad_len),
                    ctx!("valid_up_to" => err.valid_up_to().to_string()),
                );
                let end = start + bytes.len();
                UrlLine {
                    components: None,
                    newline: bytes.ends_with(b"\n").then(|| Span::new(end - 1, end)),
                    trivia: Vec::new(),
                    span: Span::new(start, end),
                    status: LineStatus::Unparsed,
                }
            }
        };
        lines.push(line);
        start += bytes.len();
    }
    tracing::debug!(
        lines = lines.len(),
        diagnostics = diags.len(),
        "parsed bytes"
    );
    ParseResult {
        file: SourceFile { lines },
        diagnostics: diags.into_vec(),
    }
}

/// Parse the first line of `text`. Anything after the first `\n` is ignored.
pub fn parse_line(text: &str, options: &ParseOptions) -> LineResult {
    let keywords = options.keyword_trie();
    let mut diags = Collector::new();
    let first = text.split_inclusive('\n').next().unwrap_or("");
    let line = LineParser::new(first, 0, &keywords, options, &mut diags).parse();
    LineResult {
        line,
        diagnostics: diags.into_vec(),
    }
}

// ─── Parser Implementation ─────────────────────────────────────────────────

struct LineParser<'a, 'c> {
    lex: Lexer<'a>,
    options: &'a ParseOptions,
    diags: &'c mut Collector,
    trivia: Vec<Trivia>,
    /// Absolute offset of the line start.
    start: usize,
    /// Absolute offset of the end of the line content, before any `\n`.
    content_end: usize,
    /// Absolute offset of the end of the line, after any `\n`.
    end: usize,
    /// Diagnostic count when this line started.
    mark: usize,
}

impl<'a, 'c> LineParser<'a, 'c> {
    fn new(
        text: &'a str,
        start: usize,
        keywords: &'a KeywordTrie,
        options: &'a ParseOptions,
        diags: &'c mut Collector,
    ) -> Self {
        let end = start + text.len();
        let content_end = if text.ends_with('\n') { end - 1 } else { end };
        let mark = diags.len();
        Self {
            lex: Lexer::with_base(text, start, keywords),
            options,
            diags,
            trivia: Vec::new(),
            start,
            content_end,
            end,
            mark,
        }
    }

    // ── Token navigation ────────────────────────────────────────────────

    fn peek(&self, ctx: LexContext) -> Token<'a> {
        self.lex.peek(ctx)
    }

    /// Record whitespace at the cursor as trivia.
    fn skip_trivia(&mut self) {
        if let Some(span) = self.lex.skip_whitespace() {
            self.trivia.push(Trivia {
                text: self.lex.slice(span.start, span.end).to_string(),
                span,
            });
        }
    }

    /// Consume the next token in `ctx`, recording any whitespace before it.
    fn bump(&mut self, ctx: LexContext) -> Token<'a> {
        self.skip_trivia();
        self.lex.next_token(ctx)
    }

    /// Consume `[start, end)` as one text node, whatever tokens it covers.
    ///
    /// `start` is either a token already consumed or the start of the next
    /// token; whitespace before it is recorded, whitespace inside it is not.
    fn take_text(&mut self, start: usize, end: usize) -> Text {
        if self.lex.offset() <= start {
            self.skip_trivia();
        } else {
            self.trivia.retain(|t| t.span.start < start);
        }
        self.lex.seek(end);
        Text {
            text: self.lex.slice(start, end).to_string(),
            span: Span::new(start, end),
        }
    }

    /// Opaque run from `start`: always through `min_end`, then on to the
    /// first of `stops` or the line end, without trailing whitespace.
    fn opaque(&mut self, start: usize, min_end: usize, stops: &[char]) -> Text {
        let tail = self.lex.slice(min_end, self.content_end);
        let run = tail.find(|c: char| stops.contains(&c)).unwrap_or(tail.len());
        let end = min_end + tail[..run].trim_end_matches(is_whitespace_to_skip).len();
        self.take_text(start, end)
    }

    fn text_of(tok: &Token<'_>) -> Text {
        Text {
            text: tok.text.to_string(),
            span: tok.span(),
        }
    }

    fn at_line_end(kind: &TokKind) -> bool {
        matches!(kind, TokKind::Newline | TokKind::Eof)
    }

    // ── Line ────────────────────────────────────────────────────────────

    fn parse(mut self) -> UrlLine {
        tracing::trace!(start = self.start, end = self.end, "line");
        let components = self.parse_components();
        self.skip_trivia();
        debug_assert_eq!(
            self.lex.offset(),
            self.content_end,
            "line content not fully consumed"
        );
        let newline =
            (self.content_end < self.end).then(|| Span::new(self.content_end, self.end));
        let status = if self.diags.len() > self.mark {
            LineStatus::Partial
        } else {
            LineStatus::Complete
        };
        UrlLine {
            components,
            newline,
            trivia: self.trivia,
            span: Span::new(self.start, self.end),
            status,
        }
    }

    fn parse_components(&mut self) -> Option<UrlComponents> {
        let protocol = self.parse_protocol();
        let (domain_and_port, leading) = self.parse_domain_and_port();
        let path = self.parse_path(leading);
        let query = self.parse_query();

        let spans = [
            protocol.as_ref().map(|p| p.span),
            domain_and_port.as_ref().map(|d| d.span),
            path.as_ref().map(|p| p.span),
            query.as_ref().map(|q| q.span),
        ];
        let span = spans.into_iter().flatten().reduce(Span::cover)?;
        Some(UrlComponents {
            protocol,
            domain_and_port,
            path,
            query,
            span,
        })
    }

    // ── Protocol ────────────────────────────────────────────────────────

    /// Two-token lookahead: a scheme keyword commits to a protocol only when
    /// `://` follows it directly.
    fn parse_protocol(&mut self) -> Option<Protocol> {
        let mut probe = self.lex.clone();
        let scheme_tok = probe.next_token(LexContext::LineStart);
        let TokKind::Scheme(scheme) = scheme_tok.kind else {
            return None;
        };
        let sep = probe.next_token(LexContext::AfterScheme);
        if sep.kind != TokKind::SchemeSep || sep.start != scheme_tok.end {
            return None;
        }

        let scheme_tok = self.bump(LexContext::LineStart);
        let sep = self.bump(LexContext::AfterScheme);
        Some(Protocol {
            scheme,
            scheme_span: scheme_tok.span(),
            separator: sep.span(),
            span: scheme_tok.span().cover(sep.span()),
        })
    }

    // ── Domain and port ─────────────────────────────────────────────────

    /// Returns the domain (if any) plus path components recovered from a
    /// malformed port.
    fn parse_domain_and_port(&mut self) -> (Option<DomainAndPort>, Vec<PathComponent>) {
        let first = self.peek(LexContext::Domain);
        if !matches!(
            first.kind,
            TokKind::Label | TokKind::Localhost | TokKind::LBrace
        ) {
            return (None, Vec::new());
        }
        let domain = self.parse_domain();
        let mut leading = Vec::new();
        let mut port = None;

        let tok = self.peek(LexContext::Domain);
        match tok.kind {
            TokKind::Colon => {
                let colon = self.bump(LexContext::Domain);
                let digits = self.peek(LexContext::Port);
                if digits.kind == TokKind::Digits {
                    let digits = self.bump(LexContext::Port);
                    port = Some(self.port(&colon, &digits));
                    let next = self.peek(LexContext::Path);
                    if next.start == digits.end
                        && !matches!(next.kind, TokKind::Slash | TokKind::Question)
                        && !Self::at_line_end(&next.kind)
                    {
                        let junk = self.opaque(next.start, next.end, PATH_STOPS);
                        self.diags.report_with(
                            DiagnosticKind::UnexpectedCharacter,
                            format!("unexpected `{}` after port", junk.text),
                            junk.span,
                            ctx!("found" => junk.text.clone(), "after" => "port"),
                        );
                        leading.push(opaque_component(junk));
                    }
                } else {
                    let junk = self.opaque(colon.start, colon.end, PATH_STOPS);
                    if junk.text == ":" {
                        self.diags.report_with(
                            DiagnosticKind::DanglingDelimiter,
                            "`:` after host is not followed by a port",
                            junk.span,
                            ctx!("expected" => "port digits"),
                        );
                    } else {
                        let found = junk.text[1..].trim_start().to_string();
                        self.diags.report_with(
                            DiagnosticKind::UnexpectedCharacter,
                            format!("expected port digits after `:`, found `{found}`"),
                            junk.span,
                            ctx!("found" => found, "expected" => "port digits"),
                        );
                    }
                    leading.push(opaque_component(junk));
                }
            }
            TokKind::SchemeSep => {
                let junk = self.opaque(tok.start, tok.end, PATH_STOPS);
                self.diags.report_with(
                    DiagnosticKind::UnexpectedCharacter,
                    "`://` after a host that is not a recognized scheme",
                    junk.span,
                    ctx!("found" => junk.text.clone()),
                );
                leading.push(opaque_component(junk));
            }
            _ => {}
        }

        let span = port
            .as_ref()
            .map_or(domain.span, |p: &Port| domain.span.cover(p.span));
        (
            Some(DomainAndPort {
                domain,
                port,
                span,
            }),
            leading,
        )
    }

    fn port(&mut self, colon: &Token<'a>, digits: &Token<'a>) -> Port {
        let value = digits.text.parse::<u16>().ok();
        if value.is_none() {
            self.diags.report_with(
                DiagnosticKind::PortOutOfRange,
                format!("port {} is out of range (0-65535)", digits.text),
                digits.span(),
                ctx!("port" => digits.text, "max" => "65535"),
            );
        }
        Port {
            colon: colon.span(),
            digits: digits.span(),
            text: digits.text.to_string(),
            value,
            span: colon.span().cover(digits.span()),
        }
    }

    fn parse_domain(&mut self) -> Domain {
        let mut labels: Vec<DomainLabel> = Vec::new();
        let mut trailing_dot = None;
        let mut only_keyword = false;
        let mut dot: Option<Span> = None;

        loop {
            let tok = self.peek(LexContext::Domain);
            let glued = labels.last().is_some_and(|l| l.span.end == tok.start);
            let expecting = labels.is_empty() || dot.is_some();
            if !expecting && !glued {
                if tok.kind == TokKind::Dot {
                    dot = Some(self.bump(LexContext::Domain).span());
                    continue;
                }
                break;
            }
            let kind = match tok.kind {
                TokKind::Label | TokKind::Localhost => {
                    only_keyword = labels.is_empty() && tok.kind == TokKind::Localhost;
                    let tok = self.bump(LexContext::Domain);
                    LabelKind::Name(Self::text_of(&tok))
                }
                TokKind::LBrace => match self.parse_variable() {
                    Ok(v) => LabelKind::Variable(v),
                    Err(t) => LabelKind::Opaque(t),
                },
                TokKind::Dot if glued && dot.is_none() => {
                    dot = Some(self.bump(LexContext::Domain).span());
                    continue;
                }
                _ => {
                    if let Some(d) = dot.take() {
                        self.diags.report_with(
                            DiagnosticKind::DanglingDelimiter,
                            "`.` is not followed by a domain label",
                            d,
                            ctx!("expected" => "domain label"),
                        );
                        trailing_dot = Some(d);
                    }
                    break;
                }
            };
            let end = label_kind_span(&kind);
            let label_dot = dot.take();
            labels.push(DomainLabel {
                span: label_dot.map_or(end, |d| d.cover(end)),
                dot: label_dot,
                kind,
            });
            if labels.len() > 1 {
                only_keyword = false;
            }
        }

        let mut span = labels
            .iter()
            .map(|l| l.span)
            .reduce(Span::cover)
            .unwrap_or_else(|| Span::empty(self.lex.offset()));
        if let Some(d) = trailing_dot {
            span = span.cover(d);
        }
        let kind = if only_keyword && labels.len() == 1 {
            DomainKind::Hostname
        } else if trailing_dot.is_none() && is_ipv4(&labels) {
            DomainKind::Ipv4
        } else {
            DomainKind::DotSeparated
        };
        Domain {
            kind,
            labels,
            trailing_dot,
            span,
        }
    }

    // ── Path ────────────────────────────────────────────────────────────

    fn parse_path(&mut self, mut components: Vec<PathComponent>) -> Option<Path> {
        loop {
            let tok = self.peek(LexContext::Path);
            match tok.kind {
                TokKind::Question | TokKind::Newline | TokKind::Eof => break,
                TokKind::Slash => {
                    let slash = self.bump(LexContext::Path).span();
                    let next = self.peek(LexContext::Path);
                    if matches!(next.kind, TokKind::Slash | TokKind::Question)
                        || Self::at_line_end(&next.kind)
                    {
                        if next.kind == TokKind::Slash {
                            self.diags.report(
                                DiagnosticKind::EmptySegment,
                                "empty path segment",
                                slash.cover(Span::empty(next.start)),
                            );
                        }
                        components.push(PathComponent {
                            slash: Some(slash),
                            kind: PathComponentKind::Empty,
                            span: slash,
                        });
                        continue;
                    }
                    let kind = self.parse_path_piece();
                    components.push(PathComponent {
                        slash: Some(slash),
                        span: slash.cover(path_kind_span(&kind, slash)),
                        kind,
                    });
                    // Pieces glued into the same item.
                    loop {
                        let next = self.peek(LexContext::Path);
                        if matches!(next.kind, TokKind::Slash | TokKind::Question)
                            || Self::at_line_end(&next.kind)
                        {
                            break;
                        }
                        let kind = self.parse_path_piece();
                        let span = path_kind_span(&kind, next.span());
                        components.push(PathComponent {
                            slash: None,
                            kind,
                            span,
                        });
                    }
                }
                _ => {
                    // Content not introduced by `/`.
                    let junk = self.opaque(tok.start, tok.end, PATH_STOPS);
                    if tok.kind == TokKind::Amp {
                        self.diags.report_with(
                            DiagnosticKind::DanglingDelimiter,
                            "`&` outside a query string",
                            junk.span,
                            ctx!("found" => "&"),
                        );
                    } else {
                        self.diags.report_with(
                            DiagnosticKind::UnexpectedCharacter,
                            format!("unexpected `{}`; path items start with `/`", junk.text),
                            junk.span,
                            ctx!("found" => junk.text.clone(), "expected" => "/"),
                        );
                    }
                    components.push(opaque_component(junk));
                }
            }
        }

        let span = components.iter().map(|c| c.span).reduce(Span::cover)?;
        Some(Path { components, span })
    }

    /// One piece of a path item. The caller guarantees the next token is not
    /// `/`, `?`, or the line end.
    fn parse_path_piece(&mut self) -> PathComponentKind {
        let tok = self.peek(LexContext::Path);
        match tok.kind {
            TokKind::Segment => {
                let tok = self.bump(LexContext::Path);
                PathComponentKind::Segment(Self::text_of(&tok))
            }
            TokKind::LBrace => match self.parse_variable() {
                Ok(v) => PathComponentKind::Variable(v),
                Err(t) => PathComponentKind::Opaque(t),
            },
            TokKind::Colon => {
                let colon = self.bump(LexContext::Path);
                let name = self.peek(LexContext::PathParam);
                if name.kind == TokKind::Ident {
                    let name = self.bump(LexContext::PathParam);
                    return PathComponentKind::Param(PathParam {
                        colon: colon.span(),
                        name: Self::text_of(&name),
                        span: colon.span().cover(name.span()),
                    });
                }
                let junk = self.opaque(colon.start, colon.end, PATH_STOPS);
                if junk.text == ":" {
                    self.diags.report_with(
                        DiagnosticKind::DanglingDelimiter,
                        "`:` is not followed by a parameter name",
                        junk.span,
                        ctx!("expected" => "identifier"),
                    );
                } else {
                    self.diags.report_with(
                        DiagnosticKind::UnexpectedCharacter,
                        format!("invalid path parameter `{}`", junk.text),
                        junk.span,
                        ctx!("found" => junk.text.clone(), "expected" => "identifier"),
                    );
                }
                PathComponentKind::Opaque(junk)
            }
            TokKind::Amp => {
                let junk = self.opaque(tok.start, tok.end, PATH_STOPS);
                self.diags.report_with(
                    DiagnosticKind::DanglingDelimiter,
                    "`&` outside a query string",
                    junk.span,
                    ctx!("found" => "&"),
                );
                PathComponentKind::Opaque(junk)
            }
            _ => {
                let junk = self.opaque(tok.start, tok.end, PATH_STOPS);
                self.diags.report_with(
                    DiagnosticKind::UnexpectedCharacter,
                    format!("unexpected `{}` in path", junk.text),
                    junk.span,
                    ctx!("found" => junk.text.clone()),
                );
                PathComponentKind::Opaque(junk)
            }
        }
    }

    // ── Query ───────────────────────────────────────────────────────────

    fn parse_query(&mut self) -> Option<QueryString> {
        if self.peek(LexContext::QueryKey).kind != TokKind::Question {
            return None;
        }
        let question = self.bump(LexContext::QueryKey).span();
        let mut params: Vec<QueryParam> = Vec::new();
        // The `?` or `&` still waiting for a parameter.
        let mut pending = Some(question);
        let mut separator = None;

        loop {
            let tok = self.peek(LexContext::QueryKey);
            let at_end = Self::at_line_end(&tok.kind);
            if (at_end || tok.kind == TokKind::Amp)
                && let Some(delim) = pending
            {
                let text = if delim == question { "?" } else { "&" };
                self.diags.report_with(
                    DiagnosticKind::DanglingDelimiter,
                    format!("`{text}` is not followed by a query parameter"),
                    delim,
                    ctx!("found" => text, "expected" => "query parameter"),
                );
            }
            if at_end {
                break;
            }
            let key = self.parse_key(&tok);
            pending = None;

            let value = if self.peek(LexContext::QueryKey).kind == TokKind::Equals {
                Some(self.parse_value())
            } else {
                None
            };
            let mut span = key.span;
            if let Some(s) = separator {
                span = span.cover(s);
            }
            if let Some(v) = &value {
                span = span.cover(v.span);
            }
            params.push(QueryParam {
                separator: separator.take(),
                key,
                value,
                span,
            });

            if self.peek(LexContext::QueryKey).kind == TokKind::Amp {
                let amp = self.bump(LexContext::QueryKey).span();
                pending = Some(amp);
                separator = Some(amp);
            }
        }

        let mut span = params
            .iter()
            .map(|p| p.span)
            .fold(question, Span::cover);
        if let Some(s) = separator {
            span = span.cover(s);
        }
        Some(QueryString {
            question,
            params,
            trailing_separator: separator,
            span,
        })
    }

    fn parse_key(&mut self, tok: &Token<'a>) -> Key {
        let kind = match tok.kind {
            TokKind::Amp | TokKind::Equals => {
                self.skip_trivia();
                let at = self.lex.offset();
                // A missing key before `&` was reported on the delimiter.
                if tok.kind == TokKind::Equals {
                    self.diags.report_with(
                        DiagnosticKind::DanglingDelimiter,
                        "query parameter has no key",
                        Span::new(at, tok.end),
                        ctx!("expected" => "query key"),
                    );
                }
                KeyKind::Literal(Text {
                    text: String::new(),
                    span: Span::empty(at),
                })
            }
            TokKind::Key => {
                let tok = self.bump(LexContext::QueryKey);
                KeyKind::Literal(Self::text_of(&tok))
            }
            TokKind::LBrace => match self.parse_variable() {
                Ok(v) => KeyKind::Variable(v),
                Err(t) => KeyKind::Opaque(t),
            },
            _ => {
                let junk = self.opaque(tok.start, tok.end, KEY_STOPS);
                self.diags.report_with(
                    DiagnosticKind::UnexpectedCharacter,
                    format!("invalid query key `{}`", junk.text),
                    junk.span,
                    ctx!("found" => junk.text.clone(), "expected" => "query key"),
                );
                KeyKind::Opaque(junk)
            }
        };
        let span = key_kind_span(&kind);

        // Junk glued after a key turns the whole key opaque. An already
        // opaque key was reported; only the glued run is reported here.
        let next = self.peek(LexContext::QueryKey);
        if !span.is_empty()
            && !matches!(next.kind, TokKind::Amp | TokKind::Equals)
            && !Self::at_line_end(&next.kind)
        {
            let was_opaque = matches!(kind, KeyKind::Opaque(_));
            let junk = self.opaque(span.start, next.end, KEY_STOPS);
            let reported = if was_opaque {
                Span::new(span.end, junk.span.end)
            } else {
                junk.span
            };
            self.diags.report_with(
                DiagnosticKind::UnexpectedCharacter,
                format!("invalid query key `{}`", junk.text),
                reported,
                ctx!("found" => next.text, "expected" => "query key"),
            );
            return Key {
                span: junk.span,
                kind: KeyKind::Opaque(junk),
            };
        }
        Key { kind, span }
    }

    fn parse_value(&mut self) -> Value {
        let equals = self.bump(LexContext::QueryKey).span();
        let mut parts = Vec::new();
        loop {
            let tok = self.peek(LexContext::QueryValue);
            match tok.kind {
                TokKind::ValueText => {
                    let tok = self.bump(LexContext::QueryValue);
                    parts.push(ValuePart::Text(Self::text_of(&tok)));
                }
                TokKind::LBrace => parts.push(match self.parse_variable() {
                    Ok(v) => ValuePart::Variable(v),
                    Err(t) => ValuePart::Opaque(t),
                }),
                _ => break,
            }
        }
        let span = parts
            .iter()
            .map(|p| match p {
                ValuePart::Text(t) | ValuePart::Opaque(t) => t.span,
                ValuePart::Variable(v) => v.span,
            })
            .fold(equals, Span::cover);
        Value {
            equals,
            parts,
            span,
        }
    }

    // ── Variables ───────────────────────────────────────────────────────

    /// `{name}` (or `{{name}}`). On failure the malformed run is consumed,
    /// reported, and returned as opaque text.
    fn parse_variable(&mut self) -> Result<Variable, Text> {
        let open_tok = self.bump(LexContext::Variable);
        debug_assert_eq!(open_tok.kind, TokKind::LBrace);
        let mut style = BraceStyle::Single;
        let mut open = open_tok.span();
        if self.options.double_brace_variables && self.lex.rest().starts_with('{') {
            self.lex.next_token(LexContext::Variable);
            style = BraceStyle::Double;
            open = Span::new(open.start, open.end + 1);
        }

        let name = self.bump(LexContext::Variable);
        if name.kind == TokKind::Ident {
            let close = self.bump(LexContext::Variable);
            let closes = close.kind == TokKind::RBrace
                && (style == BraceStyle::Single || self.lex.rest().starts_with('}'));
            if closes {
                let mut close = close.span();
                if style == BraceStyle::Double {
                    self.lex.next_token(LexContext::Variable);
                    close = Span::new(close.start, close.end + 1);
                }
                return Ok(Variable {
                    open,
                    name: Self::text_of(&name),
                    close,
                    style,
                    span: open.cover(close),
                });
            }
        }
        Err(self.recover_variable(open, style))
    }

    /// Consume a malformed variable: through the first matching close
    /// delimiter on the line, or to the line end if there is none.
    fn recover_variable(&mut self, open: Span, style: BraceStyle) -> Text {
        let delim = style.close();
        let tail = self.lex.slice(open.end, self.content_end);
        match tail.find(delim) {
            Some(idx) => {
                let inner = &tail[..idx];
                let text = self.take_text(open.start, open.end + idx + delim.len());
                if inner.trim_matches(is_whitespace_to_skip).is_empty() {
                    self.diags.report_with(
                        DiagnosticKind::EmptyVariableName,
                        format!("`{}` has no variable name", text.text),
                        text.span,
                        ctx!("expected" => "identifier"),
                    );
                } else {
                    self.diags.report_with(
                        DiagnosticKind::UnexpectedCharacter,
                        format!("invalid variable name `{}`", inner.trim()),
                        text.span,
                        ctx!("found" => inner.trim(), "expected" => "identifier"),
                    );
                }
                text
            }
            None => {
                let end = open.end + tail.trim_end_matches(is_whitespace_to_skip).len();
                let text = self.take_text(open.start, end);
                self.diags.report_with(
                    DiagnosticKind::UnterminatedVariable,
                    format!("unterminated variable: missing `{delim}`"),
                    text.span,
                    ctx!("expected" => delim),
                );
                text
            }
        }
    }
}

// ── Span helpers ────────────────────────────────────────────────────────

fn opaque_component(text: Text) -> PathComponent {
    PathComponent {
        slash: None,
        span: text.span,
        kind: PathComponentKind::Opaque(text),
    }
}

fn label_kind_span(kind: &LabelKind) -> Span {
    match kind {
        LabelKind::Name(t) | LabelKind::Opaque(t) => t.span,
        LabelKind::Variable(v) => v.span,
    }
}

fn path_kind_span(kind: &PathComponentKind, fallback: Span) -> Span {
    match kind {
        PathComponentKind::Segment(t) | PathComponentKind::Opaque(t) => t.span,
        PathComponentKind::Param(p) => p.span,
        PathComponentKind::Variable(v) => v.span,
        PathComponentKind::Empty => fallback,
    }
}

fn key_kind_span(kind: &KeyKind) -> Span {
    match kind {
        KeyKind::Literal(t) | KeyKind::Opaque(t) => t.span,
        KeyKind::Variable(v) => v.span,
    }
}

/// Four dot-joined labels of one to three digits, each at most 255.
fn is_ipv4(labels: &[DomainLabel]) -> bool {
    labels.len() == 4
        && labels.iter().enumerate().all(|(i, label)| {
            (i == 0) != label.dot.is_some()
                && matches!(&label.kind, LabelKind::Name(t)
                    if (1..=3).contains(&t.text.len())
                        && t.text.bytes().all(|b| b.is_ascii_digit())
                        && t.text.parse::<u16>().is_ok_and(|n| n <= 255))
        })
}
