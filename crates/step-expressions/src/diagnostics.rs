//! JSON renderings of tokens and syntax trees.
//!
//! The shape matches the shared Cucumber Expressions fixture suites: tokens
//! carry `type`, `start`, `end` and `text`; nodes carry `type`, `start`,
//! `end` and either `token` or `nodes`.

use crate::expression::{Node, Token};

/// Render a token stream as a JSON array.
///
/// # Errors
/// Propagates serialisation failures from `serde_json`.
///
/// # Examples
/// ```
/// use step_expressions::{diagnostics::tokens_to_json, tokenize};
///
/// let tokens = tokenize("(blind)").expect("valid expression");
/// let json = tokens_to_json(&tokens).expect("serialisable");
/// assert!(json.starts_with(r#"[{"type":"START_OF_LINE""#));
/// ```
pub fn tokens_to_json(tokens: &[Token]) -> serde_json::Result<String> {
    serde_json::to_string(tokens)
}

/// Render a syntax tree as a JSON object.
///
/// # Errors
/// Propagates serialisation failures from `serde_json`.
pub fn ast_to_json(node: &Node) -> serde_json::Result<String> {
    serde_json::to_string(node)
}
