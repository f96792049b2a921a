/// URL template syntax tree types.
pub mod ast;
/// Character classes used by the lexer.
pub mod classify;
/// Re-exports from the diagnostics crate and the diagnostics collector.
pub mod diag;
/// JSON serialization helpers for the tree.
pub mod dump;
/// Emitter: rebuilds template text from a tree.
pub mod emit;
/// Keyword literals and the prefix trie the lexer walks.
pub mod keywords;
/// Context-sensitive lexer.
pub mod lexer;
/// Recursive-descent parser producing a [`SourceFile`](ast::SourceFile).
pub mod parser;
