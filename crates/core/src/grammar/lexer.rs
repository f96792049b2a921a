//! Context-sensitive lexer: the caller names the context, the lexer returns
//! the longest token valid there.

use super::classify::{
    is_digit, is_host_char, is_key_char, is_keyword_continuation, is_name_continue,
    is_name_start, is_path_char, is_whitespace_to_skip,
};
use super::keywords::{Keyword, KeywordTrie, Scheme};
use url_template_diagnostics::Span;

/// Grammar position the parser is scanning for. Selects which token classes
/// the lexer may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexContext {
    /// First token of a line: scheme keywords are recognized.
    LineStart,
    /// Directly after a scheme keyword, looking for `://`.
    AfterScheme,
    /// Inside a domain: labels, `.`, and `localhost`.
    Domain,
    /// After the `:` that follows a domain.
    Port,
    /// Inside a path item.
    Path,
    /// After the `:` of a path parameter.
    PathParam,
    /// After the `{` of a variable.
    Variable,
    /// Inside a query key.
    QueryKey,
    /// Inside a query value; only `&`, `{` and the line end are structural.
    QueryValue,
}

/// Classification of a lexer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokKind {
    /// A scheme keyword not continued by further label characters.
    Scheme(Scheme),
    /// The `localhost` keyword not continued by further label characters.
    Localhost,
    /// The `://` literal, always one token.
    SchemeSep,
    /// A run of host-name characters.
    Label,
    /// A run of ASCII digits.
    Digits,
    /// A run of path characters with trailing whitespace excluded.
    Segment,
    /// An identifier (`name_start name_continue*`).
    Ident,
    /// A run of query-key characters.
    Key,
    /// Free text of a query value with trailing whitespace excluded.
    ValueText,
    /// `/`
    Slash,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `&`
    Amp,
    /// `=`
    Equals,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `.` inside a domain.
    Dot,
    /// A line feed character.
    Newline,
    /// A single character no rule of the current context accepts.
    Unknown,
    /// End of input. Zero width.
    Eof,
}

/// A token that borrows its text directly from the source input.
///
/// `text` is exactly the source bytes between `start` and `end`. Offsets are
/// absolute, including the lexer's base offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokKind,
    /// Borrowed slice of the source input for this token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token<'_> {
    /// Source span of this token.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Context-sensitive scanner over one source string.
///
/// The only state is the cursor; cloning a lexer gives an independent probe
/// that can look ahead without disturbing the original.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    base: usize,
    pos: usize,
    keywords: &'a KeywordTrie,
}

impl<'a> Lexer<'a> {
    /// Lexer over `src` whose offsets start at 0.
    pub fn new(src: &'a str, keywords: &'a KeywordTrie) -> Self {
        Self::with_base(src, 0, keywords)
    }

    /// Lexer over `src`, a slice that begins at byte `base` of a larger input.
    pub fn with_base(src: &'a str, base: usize, keywords: &'a KeywordTrie) -> Self {
        Self {
            src,
            base,
            pos: 0,
            keywords,
        }
    }

    /// Absolute offset of the cursor.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Absolute offset one past the end of the scanned slice.
    pub fn end_offset(&self) -> usize {
        self.base + self.src.len()
    }

    /// Move the cursor to an absolute offset inside the slice.
    pub fn seek(&mut self, offset: usize) {
        debug_assert!(offset >= self.base && offset <= self.end_offset());
        self.pos = offset.saturating_sub(self.base).min(self.src.len());
    }

    /// Source text between two absolute offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.src[start - self.base..end - self.base]
    }

    /// Unscanned remainder of the slice.
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Skip whitespace at the cursor. Returns the skipped span, if any.
    pub fn skip_whitespace(&mut self) -> Option<Span> {
        let start = self.offset();
        let len = self
            .rest()
            .find(|c: char| !is_whitespace_to_skip(c))
            .unwrap_or(self.rest().len());
        self.pos += len;
        (len > 0).then(|| Span::new(start, start + len))
    }

    /// Skip whitespace, then scan the longest token valid in `ctx`.
    pub fn next_token(&mut self, ctx: LexContext) -> Token<'a> {
        self.skip_whitespace();
        let local_start = self.pos;
        let kind = self.scan(ctx);
        let tok = Token {
            kind,
            text: &self.src[local_start..self.pos],
            start: self.base + local_start,
            end: self.base + self.pos,
        };
        tracing::trace!(?ctx, kind = ?tok.kind, start = tok.start, end = tok.end, "token");
        tok
    }

    /// Scan the next token in `ctx` without moving the cursor.
    pub fn peek(&self, ctx: LexContext) -> Token<'a> {
        self.clone().next_token(ctx)
    }

    fn scan(&mut self, ctx: LexContext) -> TokKind {
        let Some(c) = self.peek_char() else {
            return TokKind::Eof;
        };
        if c == '\n' {
            self.pos += 1;
            return TokKind::Newline;
        }
        if ctx == LexContext::QueryValue {
            return self.scan_value(c);
        }
        if self.rest().starts_with("://") {
            self.pos += 3;
            return TokKind::SchemeSep;
        }
        let single = match c {
            '/' => Some(TokKind::Slash),
            ':' => Some(TokKind::Colon),
            '?' => Some(TokKind::Question),
            '&' => Some(TokKind::Amp),
            '=' => Some(TokKind::Equals),
            '{' => Some(TokKind::LBrace),
            '}' => Some(TokKind::RBrace),
            '.' if ctx == LexContext::Domain => Some(TokKind::Dot),
            _ => None,
        };
        if let Some(kind) = single {
            self.pos += 1;
            return kind;
        }

        match ctx {
            LexContext::LineStart | LexContext::AfterScheme | LexContext::Domain
                if is_host_char(c) =>
            {
                self.scan_label(ctx)
            }
            LexContext::Port if is_digit(c) => {
                self.take_while(is_digit);
                TokKind::Digits
            }
            LexContext::Path if is_path_char(c) => {
                self.take_trimmed(is_path_char);
                TokKind::Segment
            }
            LexContext::PathParam | LexContext::Variable if is_name_start(c) => {
                self.pos += c.len_utf8();
                self.take_while(is_name_continue);
                TokKind::Ident
            }
            LexContext::QueryKey if is_key_char(c) => {
                self.take_while(is_key_char);
                TokKind::Key
            }
            _ => {
                self.pos += c.len_utf8();
                TokKind::Unknown
            }
        }
    }

    /// Host-name run, walked through the keyword trie in the same pass.
    fn scan_label(&mut self, ctx: LexContext) -> TokKind {
        let mut node = Some(KeywordTrie::ROOT);
        let mut len = 0;
        for c in self.rest().chars() {
            if !is_host_char(c) {
                break;
            }
            node = node.and_then(|n| self.keywords.step(n, c));
            len += c.len_utf8();
        }
        self.pos += len;

        // A keyword followed by more label text is just the prefix of a label.
        if self.peek_char().is_some_and(is_keyword_continuation) {
            return TokKind::Label;
        }
        match (node.and_then(|n| self.keywords.terminal(n)), ctx) {
            (Some(Keyword::Scheme(scheme)), LexContext::LineStart) => {
                TokKind::Scheme(scheme.clone())
            }
            (Some(Keyword::Localhost), LexContext::Domain | LexContext::AfterScheme) => {
                TokKind::Localhost
            }
            _ => TokKind::Label,
        }
    }

    fn scan_value(&mut self, c: char) -> TokKind {
        match c {
            '&' => {
                self.pos += 1;
                TokKind::Amp
            }
            '{' => {
                self.pos += 1;
                TokKind::LBrace
            }
            _ => {
                let run = self
                    .rest()
                    .find(['&', '{', '\n'])
                    .unwrap_or(self.rest().len());
                let stops_at_brace = self.rest()[run..].starts_with('{');
                let text = &self.rest()[..run];
                let len = if stops_at_brace {
                    run
                } else {
                    text.trim_end_matches(is_whitespace_to_skip).len()
                };
                self.pos += len;
                TokKind::ValueText
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) {
        let len = self
            .rest()
            .find(|c: char| !pred(c))
            .unwrap_or(self.rest().len());
        self.pos += len;
    }

    /// Like [`take_while`](Self::take_while) but leaves trailing whitespace
    /// for the next skip.
    fn take_trimmed(&mut self, pred: impl Fn(char) -> bool) {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += rest[..len].trim_end_matches(is_whitespace_to_skip).len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str, ctx: LexContext) -> Vec<(TokKind, String)> {
        let trie = KeywordTrie::default();
        let mut lx = Lexer::new(src, &trie);
        let mut out = Vec::new();
        loop {
            let tok = lx.next_token(ctx);
            if tok.kind == TokKind::Eof {
                break;
            }
            out.push((tok.kind, tok.text.to_string()));
        }
        out
    }

    fn kinds(src: &str, ctx: LexContext) -> Vec<TokKind> {
        lex_all(src, ctx).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn scheme_keyword_at_line_start() {
        assert_eq!(
            kinds("https://", LexContext::LineStart),
            vec![TokKind::Scheme(Scheme::Https), TokKind::SchemeSep]
        );
    }

    #[test]
    fn keyword_prefix_degrades_to_label() {
        assert_eq!(kinds("httpx", LexContext::LineStart), vec![TokKind::Label]);
        assert_eq!(kinds("http-2", LexContext::LineStart), vec![TokKind::Label]);
        // Followed by a dot: first label of a longer host name.
        assert_eq!(
            kinds("http.example", LexContext::LineStart)[0],
            TokKind::Label
        );
    }

    #[test]
    fn localhost_only_in_domain_context() {
        assert_eq!(kinds("localhost", LexContext::Domain), vec![TokKind::Localhost]);
        assert_eq!(kinds("localhost", LexContext::LineStart), vec![TokKind::Label]);
        assert_eq!(
            kinds("localhost.foo", LexContext::Domain),
            vec![TokKind::Label, TokKind::Dot, TokKind::Label]
        );
        assert_eq!(kinds("http", LexContext::Domain), vec![TokKind::Label]);
    }

    #[test]
    fn same_bytes_differ_by_context() {
        assert_eq!(
            kinds("1.2.3", LexContext::Domain),
            vec![TokKind::Label, TokKind::Dot, TokKind::Label, TokKind::Dot, TokKind::Label]
        );
        assert_eq!(
            lex_all("1.2.3", LexContext::Path),
            vec![(TokKind::Segment, "1.2.3".to_string())]
        );
    }

    #[test]
    fn scheme_separator_is_one_token() {
        assert_eq!(
            kinds("://x", LexContext::Path),
            vec![TokKind::SchemeSep, TokKind::Segment]
        );
        assert_eq!(
            kinds(":/x", LexContext::Path),
            vec![TokKind::Colon, TokKind::Slash, TokKind::Segment]
        );
    }

    #[test]
    fn structural_characters_in_every_context() {
        for ctx in [
            LexContext::Domain,
            LexContext::Path,
            LexContext::PathParam,
            LexContext::QueryKey,
            LexContext::Port,
        ] {
            assert_eq!(
                kinds("/:?&={}", ctx),
                vec![
                    TokKind::Slash,
                    TokKind::Colon,
                    TokKind::Question,
                    TokKind::Amp,
                    TokKind::Equals,
                    TokKind::LBrace,
                    TokKind::RBrace,
                ],
                "context {ctx:?}"
            );
        }
    }

    #[test]
    fn path_segment_keeps_interior_whitespace() {
        assert_eq!(
            lex_all("a b \t/c", LexContext::Path),
            vec![
                (TokKind::Segment, "a b".to_string()),
                (TokKind::Slash, "/".to_string()),
                (TokKind::Segment, "c".to_string()),
            ]
        );
    }

    #[test]
    fn query_value_is_wide_open() {
        assert_eq!(
            lex_all("a b/c?d=e:f }&x", LexContext::QueryValue),
            vec![
                (TokKind::ValueText, "a b/c?d=e:f }".to_string()),
                (TokKind::Amp, "&".to_string()),
                (TokKind::ValueText, "x".to_string()),
            ]
        );
    }

    #[test]
    fn query_value_keeps_space_before_variable() {
        assert_eq!(
            lex_all("hi {n}", LexContext::QueryValue)[..2],
            [
                (TokKind::ValueText, "hi ".to_string()),
                (TokKind::LBrace, "{".to_string()),
            ]
        );
    }

    #[test]
    fn query_value_trims_trailing_whitespace() {
        assert_eq!(
            lex_all("v \r\n", LexContext::QueryValue),
            vec![
                (TokKind::ValueText, "v".to_string()),
                (TokKind::Newline, "\n".to_string()),
            ]
        );
    }

    #[test]
    fn identifiers_and_digits() {
        assert_eq!(
            lex_all("user_id-2}", LexContext::Variable),
            vec![
                (TokKind::Ident, "user_id-2".to_string()),
                (TokKind::RBrace, "}".to_string()),
            ]
        );
        assert_eq!(kinds("9x", LexContext::Variable)[0], TokKind::Unknown);
        assert_eq!(
            lex_all("8080x", LexContext::Port)[0],
            (TokKind::Digits, "8080".to_string())
        );
    }

    #[test]
    fn newline_and_eof_are_distinct() {
        let trie = KeywordTrie::default();
        let mut lx = Lexer::new("\n", &trie);
        assert_eq!(lx.next_token(LexContext::Path).kind, TokKind::Newline);
        let eof = lx.next_token(LexContext::Path);
        assert_eq!(eof.kind, TokKind::Eof);
        assert_eq!((eof.start, eof.end), (1, 1));
    }

    #[test]
    fn offsets_include_base() {
        let trie = KeywordTrie::default();
        let mut lx = Lexer::with_base("  abc", 10, &trie);
        let ws = lx.skip_whitespace();
        assert_eq!(ws, Some(Span::new(10, 12)));
        let tok = lx.next_token(LexContext::QueryKey);
        assert_eq!(tok.kind, TokKind::Key);
        assert_eq!(tok.span(), Span::new(12, 15));
        assert_eq!(lx.offset(), 15);
    }

    #[test]
    fn peek_does_not_advance() {
        let trie = KeywordTrie::default();
        let lx = Lexer::new("ws://", &trie);
        assert_eq!(lx.peek(LexContext::LineStart).kind, TokKind::Scheme(Scheme::Ws));
        assert_eq!(lx.offset(), 0);
    }

    #[test]
    fn extra_scheme_keyword() {
        let trie = KeywordTrie::with_schemes(&["grpc".to_string()]);
        let mut lx = Lexer::new("grpc://", &trie);
        assert_eq!(
            lx.next_token(LexContext::LineStart).kind,
            TokKind::Scheme(Scheme::Other("grpc".into()))
        );
    }

    #[test]
    fn control_characters_are_unknown_in_paths() {
        assert_eq!(
            kinds("\u{1}", LexContext::Path),
            vec![TokKind::Unknown]
        );
    }
}
