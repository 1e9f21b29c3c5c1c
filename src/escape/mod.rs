//! Escaping and tokenizing utilities
//!
//! The filter-graph mini-language escapes in two nested levels: parameter
//! values first (so `=` and `:` survive the key/value join), then the whole
//! clause body (so `[`, `]`, `,`, `;` survive clause assembly). Unescaping
//! mirrors the same two levels so values round-trip exactly.

use crate::error::{FfgraphError, FfgraphResult};

/// Characters escaped inside individual filter parameter keys and values
pub const FILTER_PARAM_SPECIAL: &str = "\\'=:";

/// Characters escaped across a whole joined filter clause body
pub const FILTER_CLAUSE_SPECIAL: &str = "\\'[],;";

/// Backslash-escape every occurrence of the given special characters
pub fn escape(value: &str, special: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if special.contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Remove every backslash escape (`\x` becomes `x`)
///
/// Used at the innermost level, where any remaining escape belongs to the
/// value itself.
pub fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => unescaped.push(next),
                None => unescaped.push(ch),
            }
        } else {
            unescaped.push(ch);
        }
    }
    unescaped
}

/// Remove backslash escapes only for the given special characters
///
/// Escapes of characters outside the set are kept verbatim, so the inner
/// escaping level survives an outer-level unescape.
pub fn unescape_only(value: &str, special: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek() {
                Some(&next) if special.contains(next) => {
                    unescaped.push(next);
                    chars.next();
                }
                Some(&next) => {
                    unescaped.push(ch);
                    unescaped.push(next);
                    chars.next();
                }
                None => unescaped.push(ch),
            }
        } else {
            unescaped.push(ch);
        }
    }
    unescaped
}

/// Tokenize a full command line with POSIX shell quoting rules
pub fn split_command_line(line: &str) -> FfgraphResult<Vec<String>> {
    shell_words::split(line).map_err(|error| FfgraphError::BadCommand {
        message: format!("unbalanced quoting: {error}"),
    })
}

/// Join argument tokens into a shell-safe command line
pub fn join_command_line(tokens: &[String]) -> String {
    shell_words::join(tokens)
}
