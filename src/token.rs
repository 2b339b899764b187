//! Placeholder token syntax
//!
//! Fragments reference entities they cannot see by embedding placeholder
//! tokens in their property values. A token is a string leaf consisting of
//! exactly one marker pair around a reference expression:
//!
//! ```text
//! <% RESUsers %>              references the entity's declared form
//! <% Api.RootResourceId %>    references a named attribute of the entity
//! ```
//!
//! The expression is a key, optionally followed by a dot-separated attribute
//! path. Only the whole-string form is a token: the same characters embedded
//! inside a longer string are plain text and pass through resolution
//! untouched. A leaf that opens a marker without closing it, or opens a
//! second marker before the first closes, is malformed and aborts the build.
//!
//! This module only classifies and parses. Substitution happens in the
//! resolve phase, which owns the sealed symbol table and the error context
//! (which entity carried the bad leaf).
//!
//! # Examples
//!
//! ```rust
//! use stackweave::token::{self, Scan};
//!
//! assert!(matches!(token::scan("<% RESUsers %>"), Scan::Expression("RESUsers")));
//! assert!(matches!(token::scan("arn:aws:s3:::bucket"), Scan::Literal));
//! assert!(matches!(token::scan("see <% RESUsers %> here"), Scan::Literal));
//! assert!(matches!(token::scan("<% RESUsers"), Scan::Malformed { .. }));
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::{TOKEN_CLOSE, TOKEN_OPEN};

/// Pattern a reference expression must match: a key, optionally followed by
/// a dot-separated attribute path.
fn expr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9]*(?:\.[A-Za-z][A-Za-z0-9]*)*$").unwrap()
    })
}

/// Outcome of classifying one string leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan<'a> {
    /// Plain text; resolution passes it through untouched.
    Literal,
    /// The whole leaf is a single token carrying this expression text.
    Expression(&'a str),
    /// The leaf misuses the marker syntax and aborts the build.
    Malformed {
        /// What is wrong with the leaf.
        reason: &'static str,
    },
}

/// Classify a string leaf
///
/// Walks every marker in the leaf. An opening marker without a matching
/// close, or a second opening marker before the close, is [`Scan::Malformed`]
/// regardless of position. When the leaf consists of exactly one well-formed
/// marker pair spanning the entire string, the trimmed expression between the
/// markers is returned as [`Scan::Expression`]; in every other case the leaf
/// is [`Scan::Literal`].
#[must_use]
pub fn scan(leaf: &str) -> Scan<'_> {
    let mut spans = 0usize;
    let mut whole = None;
    let mut offset = 0usize;
    let mut rest = leaf;

    loop {
        let Some(open_rel) = rest.find(TOKEN_OPEN) else {
            break;
        };
        let after_open = &rest[open_rel + TOKEN_OPEN.len()..];
        let Some(close_rel) = after_open.find(TOKEN_CLOSE) else {
            return Scan::Malformed {
                reason: "opening marker without a matching closing marker",
            };
        };
        let inner = &after_open[..close_rel];
        if inner.contains(TOKEN_OPEN) {
            return Scan::Malformed {
                reason: "marker opened inside another marker",
            };
        }

        spans += 1;
        let start = offset + open_rel;
        let end = start + TOKEN_OPEN.len() + close_rel + TOKEN_CLOSE.len();
        if start == 0 && end == leaf.len() {
            whole = Some(inner.trim());
        }

        let consumed = open_rel + TOKEN_OPEN.len() + close_rel + TOKEN_CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }

    match (spans, whole) {
        (1, Some(expr)) => Scan::Expression(expr),
        _ => Scan::Literal,
    }
}

/// A parsed reference expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenExpr<'a> {
    /// The entity key being referenced.
    pub key: &'a str,
    /// Attribute path after the key, when the expression names one.
    ///
    /// May itself contain dots (`Endpoint.Address`); the split happens at
    /// the first dot only.
    pub attribute: Option<&'a str>,
}

/// Parse the expression text between markers
///
/// # Errors
///
/// Returns the reason as a static string when the expression is empty or
/// does not have the `KEY` / `KEY.ATTRIBUTE` identifier shape. The caller
/// wraps it into a malformed-token error together with the owning entity.
pub fn parse_expr(expr: &str) -> Result<TokenExpr<'_>, &'static str> {
    if expr.is_empty() {
        return Err("empty expression between markers");
    }
    if !expr_regex().is_match(expr) {
        return Err("expression must be a key or key.attribute identifier pair");
    }
    match expr.split_once('.') {
        Some((key, attribute)) => Ok(TokenExpr {
            key,
            attribute: Some(attribute),
        }),
        None => Ok(TokenExpr {
            key: expr,
            attribute: None,
        }),
    }
}

/// Render a key in token form: `<% Key %>`.
#[must_use]
pub fn reference(key: &str) -> String {
    format!("{TOKEN_OPEN} {key} {TOKEN_CLOSE}")
}

/// Render a key and attribute in token form: `<% Key.Attribute %>`.
#[must_use]
pub fn attribute(key: &str, attr: &str) -> String {
    format!("{TOKEN_OPEN} {key}.{attr} {TOKEN_CLOSE}")
}
