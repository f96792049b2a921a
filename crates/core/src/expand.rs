//! Placeholder expansion: substitute variables and path parameters in a
//! parsed line.
//!
//! Substitution walks the tree, so only real placeholders are replaced; text
//! that merely looks like `{name}` inside an opaque span is left alone. Values
//! are inserted as given, without percent-encoding.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grammar::ast::UrlLine;
use crate::grammar::classify::{is_name_continue, is_name_start};
use crate::grammar::emit::{Placeholder, emit_line_with};

/// Errors that can occur when loading or validating [`Bindings`].
#[derive(Debug, Error)]
pub enum BindingsError {
    /// JSON deserialization failed.
    #[error("invalid bindings JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A binding name is not an identifier.
    #[error("invalid {table} name `{name}`: expected an identifier")]
    InvalidName {
        /// `variables` or `path_params`.
        table: &'static str,
        /// The offending name.
        name: String,
    },
}

/// Values for the placeholders of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Bindings {
    /// Values for `{name}` variables.
    pub variables: BTreeMap<String, String>,
    /// Values for `:name` path parameters.
    pub path_params: BTreeMap<String, String>,
}

impl Bindings {
    /// Deserialize bindings from JSON and validate every name.
    pub fn from_json(s: &str) -> Result<Self, BindingsError> {
        let bindings: Bindings = serde_json::from_str(s)?;
        bindings.validate()?;
        Ok(bindings)
    }

    /// Check that every name is an identifier.
    pub fn validate(&self) -> Result<(), BindingsError> {
        for (table, map) in [
            ("variables", &self.variables),
            ("path_params", &self.path_params),
        ] {
            if let Some(name) = map.keys().find(|k| !is_identifier(k)) {
                return Err(BindingsError::InvalidName {
                    table,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Bind a variable, replacing any previous value.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Bind a path parameter, replacing any previous value.
    pub fn set_path_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.path_params.insert(name.into(), value.into());
    }

    /// Add every binding from `other`, overriding on conflict.
    pub fn merge(&mut self, other: Bindings) {
        self.variables.extend(other.variables);
        self.path_params.extend(other.path_params);
    }
}

/// Which kind of placeholder was left unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    /// A `{name}` variable.
    Variable,
    /// A `:name` path parameter.
    PathParam,
}

/// A placeholder with no binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Unresolved {
    /// Placeholder kind.
    pub kind: PlaceholderKind,
    /// Placeholder name.
    pub name: String,
}

/// Result of expanding one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expansion {
    /// The line with every bound placeholder substituted.
    pub url: String,
    /// Unbound placeholders in first-appearance order, without duplicates.
    pub unresolved: Vec<Unresolved>,
}

impl Expansion {
    /// Whether every placeholder was bound.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Substitute bound placeholders in `line`.
///
/// Unbound placeholders are written as they appear in the source and listed
/// in [`Expansion::unresolved`].
pub fn expand_line(line: &UrlLine, bindings: &Bindings) -> Expansion {
    let mut unresolved = Vec::new();
    let mut seen = HashSet::new();
    let url = emit_line_with(line, |placeholder| {
        let (kind, name, table) = match placeholder {
            Placeholder::Variable(v) => (
                PlaceholderKind::Variable,
                &v.name.text,
                &bindings.variables,
            ),
            Placeholder::PathParam(p) => (
                PlaceholderKind::PathParam,
                &p.name.text,
                &bindings.path_params,
            ),
        };
        let value = table.get(name).cloned();
        if value.is_none() {
            let entry = Unresolved {
                kind,
                name: name.clone(),
            };
            if seen.insert(entry.clone()) {
                unresolved.push(entry);
            }
        }
        value
    });
    tracing::trace!(url = %url, unresolved = unresolved.len(), "expanded line");
    Expansion { url, unresolved }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_name_start) && chars.all(is_name_continue)
}
