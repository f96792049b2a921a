//! Literal keywords (`http`, `https`, `ftp`, `ws`, `wss`, `localhost`) and the
//! prefix trie the lexer walks alongside the generic label class.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Protocol scheme of a [`Protocol`](super::ast::Protocol) node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scheme {
    /// `http`
    Http,
    /// `https`
    Https,
    /// `ftp`
    Ftp,
    /// `ws`
    Ws,
    /// `wss`
    Wss,
    /// A scheme registered through `ParseOptions::extra_schemes`.
    Other(String),
}

impl Scheme {
    /// Schemes recognized without any configuration.
    pub const BUILTIN: [Scheme; 5] = [
        Scheme::Http,
        Scheme::Https,
        Scheme::Ftp,
        Scheme::Ws,
        Scheme::Wss,
    ];

    /// The keyword text.
    pub fn as_str(&self) -> &str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ftp => "ftp",
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
            Scheme::Other(s) => s,
        }
    }
}

impl From<String> for Scheme {
    fn from(s: String) -> Self {
        match s.as_str() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            "ftp" => Scheme::Ftp,
            "ws" => Scheme::Ws,
            "wss" => Scheme::Wss,
            _ => Scheme::Other(s),
        }
    }
}

impl From<Scheme> for String {
    fn from(s: Scheme) -> Self {
        match s {
            Scheme::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal keyword recognized by the trie walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    /// A protocol scheme keyword.
    Scheme(Scheme),
    /// The `localhost` hostname keyword.
    Localhost,
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<char, usize>,
    terminal: Option<Keyword>,
}

/// Prefix trie over the keyword literals, stored as an arena of nodes.
///
/// Node `0` is the root.
#[derive(Debug, Clone)]
pub struct KeywordTrie {
    nodes: Vec<TrieNode>,
}

impl Default for KeywordTrie {
    fn default() -> Self {
        Self::with_schemes(&[])
    }
}

impl KeywordTrie {
    /// Root node index.
    pub const ROOT: usize = 0;

    /// Trie over the built-in schemes, `localhost`, and `extra` schemes.
    ///
    /// Extra schemes are expected to be validated by the caller; an extra
    /// entry equal to a built-in keyword leaves the built-in in place.
    pub fn with_schemes(extra: &[String]) -> Self {
        let mut trie = Self {
            nodes: vec![TrieNode::default()],
        };
        for scheme in Scheme::BUILTIN {
            let word = scheme.as_str().to_string();
            trie.insert(&word, Keyword::Scheme(scheme));
        }
        trie.insert("localhost", Keyword::Localhost);
        for word in extra {
            if trie.lookup(word).is_none() {
                trie.insert(word, Keyword::Scheme(Scheme::from(word.clone())));
            }
        }
        trie
    }

    fn insert(&mut self, word: &str, keyword: Keyword) {
        let mut node = Self::ROOT;
        for c in word.chars() {
            node = match self.nodes[node].children.get(&c) {
                Some(&next) => next,
                None => {
                    self.nodes.push(TrieNode::default());
                    let next = self.nodes.len() - 1;
                    self.nodes[node].children.insert(c, next);
                    next
                }
            };
        }
        self.nodes[node].terminal = Some(keyword);
    }

    /// Follow the edge labelled `c` out of `node`.
    pub fn step(&self, node: usize, c: char) -> Option<usize> {
        self.nodes.get(node)?.children.get(&c).copied()
    }

    /// Keyword ending exactly at `node`, if any.
    pub fn terminal(&self, node: usize) -> Option<&Keyword> {
        self.nodes.get(node)?.terminal.as_ref()
    }

    /// Exact lookup of a whole word.
    pub fn lookup(&self, word: &str) -> Option<&Keyword> {
        let mut node = Self::ROOT;
        for c in word.chars() {
            node = self.step(node, c)?;
        }
        self.terminal(node)
    }
}
