//! Parser configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grammar::keywords::{Keyword, KeywordTrie};

/// Errors that can occur when loading or validating [`ParseOptions`].
#[derive(Debug, Error)]
pub enum OptionsError {
    /// JSON deserialization failed.
    #[error("invalid parse options JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// Options that change what the lexer and parser accept.
///
/// # Example
/// ```
/// let opts = url_template_core::ParseOptions::from_json(
///     r#"{ "extra_schemes": ["grpc"] }"#,
/// ).unwrap();
/// assert!(opts.double_brace_variables);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Also accept `{{name}}` placeholders. The closing delimiter must match
    /// the opening one.
    pub double_brace_variables: bool,
    /// Additional protocol keywords, recognized as `Scheme::Other`.
    pub extra_schemes: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            double_brace_variables: true,
            extra_schemes: Vec::new(),
        }
    }
}

impl ParseOptions {
    /// Deserialize options from JSON and validate them.
    pub fn from_json(s: &str) -> Result<Self, OptionsError> {
        let opts: ParseOptions = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check every extra scheme is `[a-z][a-z0-9-]*` and not a hostname keyword.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let builtin = KeywordTrie::default();
        for (i, scheme) in self.extra_schemes.iter().enumerate() {
            let mut chars = scheme.chars();
            let well_formed = chars.next().is_some_and(|c| c.is_ascii_lowercase())
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
            if !well_formed {
                return Err(OptionsError::InvalidField {
                    field: format!("extra_schemes[{i}]"),
                    reason: format!("`{scheme}` must match [a-z][a-z0-9-]*"),
                });
            }
            if builtin.lookup(scheme) == Some(&Keyword::Localhost) {
                return Err(OptionsError::InvalidField {
                    field: format!("extra_schemes[{i}]"),
                    reason: format!("`{scheme}` is reserved as a hostname"),
                });
            }
        }
        Ok(())
    }

    /// Keyword trie for these options.
    pub fn keyword_trie(&self) -> KeywordTrie {
        KeywordTrie::with_schemes(&self.extra_schemes)
    }
}
