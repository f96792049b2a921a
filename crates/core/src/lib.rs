//! URL template toolchain core library.
//!
//! Parses lines of URL templates (`https://api.{env}.example.com/users/:id?q={term}`)
//! into a typed tree with recoverable diagnostics. The main entry points are
//! [`parse_str`] and [`parse_with_options`] for parsing, [`emit_line`] for
//! rebuilding text, and [`expand_line`] for placeholder substitution.

#![warn(missing_docs)]

/// Placeholder expansion against a set of bindings.
pub mod expand;
/// URL template grammar: classifier, lexer, parser, tree, emitter.
pub mod grammar;
/// Editor highlight captures for parsed lines.
pub mod highlight;
/// Parser configuration.
pub mod options;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parser
pub use grammar::parser::{
    LineResult, ParseResult, parse_bytes, parse_line, parse_str, parse_with_options,
};

// Tree
pub use grammar::ast::{
    BraceStyle, Domain, DomainAndPort, DomainKind, DomainLabel, Key, KeyKind, LabelKind, Leaf,
    LeafKind, LineStatus, Path, PathComponent, PathComponentKind, PathParam, Port, Protocol,
    QueryParam, QueryString, SourceFile, Text, Trivia, UrlComponents, UrlLine, Value, ValuePart,
    Variable,
};
pub use grammar::keywords::Scheme;

// Emitter
pub use grammar::emit::{emit_file, emit_line};

// Expansion
pub use expand::{Bindings, BindingsError, Expansion, Unresolved, expand_line};

// Options
pub use options::{OptionsError, ParseOptions};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, DiagnosticKind, LineIndex, Severity, Span, codes};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
