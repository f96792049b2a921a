//! Character classes shared by the lexer contexts.
//!
//! Every predicate looks at a single code point and is total: there is no
//! error case and no state.

/// First character of an identifier (path param or variable name).
pub fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Identifier continuation: letters, digits, `_`, `-`.
pub fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// ASCII decimal digit.
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Characters that make up a domain label. Same set as [`is_name_continue`].
pub fn is_host_char(c: char) -> bool {
    is_name_continue(c)
}

/// Characters of a query key: letters, digits, `-`, `_`.
pub fn is_key_char(c: char) -> bool {
    is_name_continue(c)
}

/// A character that, after a keyword, means the keyword is only the prefix of
/// a longer label (`httpx`, `localhost.dev`, `ws-01`).
pub fn is_keyword_continuation(c: char) -> bool {
    is_name_continue(c) || c == '.'
}

/// Structural delimiters recognized by every context except query values.
pub fn is_reserved_delimiter(c: char) -> bool {
    matches!(c, '/' | ':' | '?' | '&' | '=' | '{' | '}' | '\n')
}

/// Permissive path-segment set: everything except the control ranges
/// 0x00–0x08 and 0x0E–0x1F, the line terminator, and the reserved delimiters.
pub fn is_path_char(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{8}' | '\u{e}'..='\u{1f}') && !is_reserved_delimiter(c)
}

/// Whitespace skipped between tokens: tab through CR plus space, minus the
/// line terminator (which is a token of its own).
pub fn is_whitespace_to_skip(c: char) -> bool {
    matches!(c, '\t' | '\u{b}' | '\u{c}' | '\r' | ' ')
}
