//! Diagnostic ID constants.
//!
//! Generated from `spec/diagnostics.json` at build time. Parser code refers to
//! these constants rather than to string literals.

include!(concat!(env!("OUT_DIR"), "/generated_codes.rs"));
