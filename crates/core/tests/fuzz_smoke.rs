//! Fuzz smoke tests for the URL template lexer and parser.
//!
//! These tests feed random, adversarial, and edge-case inputs to the lexer
//! and parser to verify they never panic and that basic structural invariants
//! hold on every `ParseResult`.
//!
//! No external crate dependencies are used; a simple deterministic PRNG
//! provides reproducible randomness.

mod common;

use url_template_core::grammar::keywords::KeywordTrie;
use url_template_core::grammar::lexer::{LexContext, Lexer, TokKind};
use url_template_core::grammar::parser::{ParseResult, parse_bytes, parse_with_options};
use url_template_core::options::ParseOptions;
use url_template_core::{emit_file, expand_line, highlight::highlight_file, Bindings};

// ─── Simple deterministic PRNG (LCG) ────────────────────────────────────────

struct SimpleRng(u64);

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range(&mut self, max: usize) -> usize {
        (self.next() as usize) % max
    }

    fn gen_bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.next() as u8).collect()
    }

    fn gen_string(&mut self, alphabet: &[u8], len: usize) -> String {
        (0..len)
            .map(|_| alphabet[self.gen_range(alphabet.len())] as char)
            .collect()
    }
}

// ─── Invariant checking ─────────────────────────────────────────────────────

/// Assert structural invariants on any `ParseResult`, regardless of input.
fn assert_invariants(result: &ParseResult, input: &str) {
    common::assert_round_trip(result, input);

    for line in &result.file.lines {
        if let Some(c) = &line.components {
            assert!(
                c.span.start >= line.span.start && c.span.end <= line.span.end,
                "components {:?} escape line {:?} in input {:?}",
                c.span,
                line.span,
                truncate(input, 120),
            );
        }
    }

    // Verify diagnostic spans are valid
    for diag in &result.diagnostics {
        if let Some(span) = diag.span {
            assert!(
                span.start <= span.end,
                "Diagnostic span start ({}) > end ({}): {:?}",
                span.start,
                span.end,
                diag
            );
            assert!(
                span.end <= input.len(),
                "Diagnostic span end ({}) > input length ({}): {:?}",
                span.end,
                input.len(),
                diag
            );
        }
    }

    // Diagnostics are emitted in source order.
    let starts: Vec<usize> = result
        .diagnostics
        .iter()
        .filter_map(|d| d.span.map(|s| s.start))
        .collect();
    assert!(
        starts.windows(2).all(|w| w[0] <= w[1]),
        "diagnostics out of order in input {:?}",
        truncate(input, 120),
    );
}

/// Truncate a string for error messages (safe for multi-byte UTF-8).
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        // Find the largest char boundary <= max to avoid slicing mid-character.
        let safe_end = (0..=max)
            .rev()
            .find(|&i| s.is_char_boundary(i))
            .unwrap_or(0);
        format!("{}…({} bytes total)", &s[..safe_end], s.len())
    }
}

/// Parse an input with both brace styles, check invariants, and run every
/// consumer of the tree.
fn fuzz_parse(input: &str) {
    for double in [true, false] {
        let opts = ParseOptions {
            double_brace_variables: double,
            ..Default::default()
        };
        let result = parse_with_options(input, &opts);
        assert_invariants(&result, input);

        // Consumers should never panic either.
        let _ = emit_file(&result.file);
        let _ = highlight_file(&result.file);
        for line in &result.file.lines {
            let _ = expand_line(line, &Bindings::default());
        }
    }
}

/// Lex an input in one context until EOF, checking offsets advance.
fn fuzz_lex(input: &str, ctx: LexContext) {
    let trie = KeywordTrie::default();
    let mut lexer = Lexer::new(input, &trie);
    let mut last_end = 0;
    loop {
        let tok = lexer.next_token(ctx);
        assert!(tok.start >= last_end, "token went backwards in {input:?}");
        assert_eq!(&input[tok.start..tok.end], tok.text);
        if tok.kind == TokKind::Eof {
            assert_eq!(tok.end, input.len());
            break;
        }
        assert!(tok.end > tok.start, "zero-width {:?} in {input:?}", tok.kind);
        last_end = tok.end;
    }
}

const ALL_CONTEXTS: [LexContext; 9] = [
    LexContext::LineStart,
    LexContext::AfterScheme,
    LexContext::Domain,
    LexContext::Port,
    LexContext::Path,
    LexContext::PathParam,
    LexContext::Variable,
    LexContext::QueryKey,
    LexContext::QueryValue,
];

// ═══════════════════════════════════════════════════════════════════════════════
// Category A: Random strings
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn lexer_no_panic_random_bytes() {
    let mut rng = SimpleRng::new(0xDEAD_BEEF);
    for len in [0, 1, 2, 5, 10, 50, 100, 500] {
        for _ in 0..20 {
            let bytes = rng.gen_bytes(len);
            let input = String::from_utf8_lossy(&bytes);
            for ctx in ALL_CONTEXTS {
                fuzz_lex(&input, ctx);
            }
        }
    }
}

#[test]
fn parser_no_panic_random_bytes() {
    let mut rng = SimpleRng::new(0xCAFE_BABE);
    for len in [0, 1, 2, 5, 10, 50, 100, 500, 1000] {
        for _ in 0..20 {
            let bytes = rng.gen_bytes(len);
            let input = String::from_utf8_lossy(&bytes);
            fuzz_parse(&input);
        }
    }
}

#[test]
fn parser_no_panic_random_ascii() {
    let mut rng = SimpleRng::new(0x1234_5678);
    let ascii_chars: Vec<u8> = (0x20..=0x7E).collect();
    for len in [0, 1, 5, 20, 100, 500, 2000] {
        for _ in 0..20 {
            let s = rng.gen_string(&ascii_chars, len);
            fuzz_parse(&s);
        }
    }
}

#[test]
fn parser_no_panic_random_url_like() {
    let mut rng = SimpleRng::new(0xBAAD_F00D);
    let alphabet: &[u8] = b"htpsw:/.?&={}{}{}abcxyz019-_ \t\r\n";
    for len in [1, 5, 20, 100, 500] {
        for _ in 0..50 {
            let s = rng.gen_string(alphabet, len);
            fuzz_parse(&s);
        }
    }
}

#[test]
fn parser_no_panic_random_fragments() {
    let mut rng = SimpleRng::new(0x5EED_0001);
    let fragments = [
        "https", "http", "ws", "ftp", "localhost", "://", ":", "/", "//", "?", "&", "=", "{",
        "}", "{{", "}}", ".", "api", "8080", "99999", "{id}", ":id", " ", "\n", "\r\n", "-",
    ];
    for _ in 0..500 {
        let n = rng.gen_range(12) + 1;
        let s: String = (0..n)
            .map(|_| fragments[rng.gen_range(fragments.len())])
            .collect();
        fuzz_parse(&s);
    }
}

#[test]
fn parse_bytes_no_panic_random_bytes() {
    let mut rng = SimpleRng::new(0x0BAD_CAFE);
    for len in [0, 1, 3, 16, 128, 1024] {
        for _ in 0..20 {
            let bytes = rng.gen_bytes(len);
            let result = parse_bytes(&bytes, &ParseOptions::default());
            // Lines partition the byte input.
            let mut pos = 0;
            for line in &result.file.lines {
                assert_eq!(line.span.start, pos);
                pos = line.span.end;
            }
            assert_eq!(pos, bytes.len());
            for diag in &result.diagnostics {
                let span = diag.span.expect("parser diagnostics carry spans");
                assert!(span.end <= bytes.len());
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Category B: Adversarial delimiter sequences
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn parser_no_panic_adversarial_delimiters() {
    let cases = [
        ":",
        "://",
        ":::",
        "//////",
        "????",
        "&&&&",
        "====",
        "....",
        "{",
        "}",
        "{{",
        "}}",
        "{{{{}}}}",
        "}{",
        "{}{}{}",
        "?&=&=&",
        "http://:/?&={}",
        "a.:b./c:?d",
        "host:",
        "host:.",
        "host::80",
        "host:80:80",
        ".host",
        "host..com",
    ];
    for input in &cases {
        fuzz_parse(input);
    }
}

#[test]
fn parser_no_panic_non_ascii() {
    let cases = [
        "https://é.com",
        "/日本語/テスト",
        "?q=🎉",
        "{λ}",
        "/users/:ñ",
        "höst:80",
        "/\u{FEFF}",
        "/a\u{200B}b",
        "?\u{202A}=x",
    ];
    for input in &cases {
        fuzz_parse(input);
    }
}

#[test]
fn parser_no_panic_truncated_templates() {
    let full = "https://api.{env}.example.com:8443/v1/users/{{id}}/:tab?limit={n}&q=a b";
    for end in 0..=full.len() {
        if full.is_char_boundary(end) {
            fuzz_parse(&full[..end]);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Category C: Pathological repetition
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn parser_no_panic_long_domain() {
    let input = format!("{}com", "a.".repeat(5_000));
    fuzz_parse(&input);
}

#[test]
fn parser_no_panic_long_path() {
    let input = "/{x}:y".repeat(2_000);
    fuzz_parse(&input);
}

#[test]
fn parser_no_panic_long_query() {
    let input = format!("?{}", "k={v}&".repeat(2_000));
    fuzz_parse(&input);
}

#[test]
fn parser_no_panic_many_lines() {
    let input = "http://h/p?q=1\n{\n".repeat(1_000);
    fuzz_parse(&input);
}

#[test]
fn parser_no_panic_many_open_braces() {
    let input = "{".repeat(2_000);
    fuzz_parse(&input);
    let input = format!("/{}", "{".repeat(2_000));
    fuzz_parse(&input);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Category D: Edge-case strings
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn parser_no_panic_empty_input() {
    fuzz_parse("");
}

#[test]
fn parser_no_panic_single_chars() {
    let cases = ["\n", "\r", "\t", " ", "\0", "\u{b}", "\u{c}", "\u{1f}", "#", "%"];
    for input in &cases {
        fuzz_parse(input);
    }
}

#[test]
fn parser_no_panic_whitespace_variants() {
    let cases: &[&str] = &["   ", "\n\n\n", "\r\n\r\n", "\t\t\t", " \n \t \r "];
    for input in cases {
        fuzz_parse(input);
    }
    let long_spaces = " ".repeat(10_000);
    fuzz_parse(&long_spaces);
}

#[test]
fn parser_no_panic_mixed_control_chars() {
    let mut input = String::from("https://host/");
    for c in 0u8..32 {
        input.push(c as char);
    }
    input.push_str("?a=");
    for c in 0u8..32 {
        input.push(c as char);
    }
    fuzz_parse(&input);
}
