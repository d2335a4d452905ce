//! Cucumber Expression lexing, parsing and compilation.

pub(crate) mod ast;
mod compiler;
mod lexer;
mod parser;
#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use regex::Regex;

use crate::argument::Argument;
use crate::errors::ExpressionError;
use crate::parameter::{ParameterType, ParameterTypeRegistry};
use crate::tree_regex::TreeRegex;

pub use ast::{Located, Node, NodeBody, NodeKind, Token, TokenKind};
pub use compiler::{CompiledPattern, ParameterSlot, build_regex_from_ast, build_regex_from_expression};
pub use lexer::tokenize;
pub use parser::parse;

/// Anything that matches step text and yields arguments.
pub trait Expression {
    /// The text the expression was created from.
    fn source(&self) -> &str;

    /// The compiled regex.
    fn regex(&self) -> &Regex;

    /// Source of the compiled regex.
    fn pattern(&self) -> &str {
        self.regex().as_str()
    }

    /// Match `text`, returning one argument per parameter, or `None` when
    /// the text does not match.
    ///
    /// # Errors
    /// Returns [`ExpressionError::AmbiguousParameterType`] when a regular
    /// expression's group cannot be typed, and
    /// [`ExpressionError::CaptureGroupMismatch`] when groups and parameter
    /// types disagree.
    fn match_text(&self, text: &str) -> Result<Option<Vec<Argument>>, ExpressionError>;
}

/// A compiled Cucumber Expression.
///
/// # Examples
/// ```
/// use step_expressions::{CucumberExpression, Expression, ParameterTypeRegistry, Value};
///
/// let registry = ParameterTypeRegistry::new();
/// let expression = CucumberExpression::new("I have {int} cuke(s)", &registry)
///     .expect("valid expression");
/// let arguments = expression
///     .match_text("I have 7 cukes")
///     .expect("types resolve")
///     .expect("text matches");
/// assert_eq!(arguments[0].value().ok(), Some(Value::I32(7)));
/// ```
#[derive(Debug, Clone)]
pub struct CucumberExpression {
    source: String,
    ast: Node,
    parameters: Vec<ParameterSlot>,
    tree_regex: TreeRegex,
}

impl CucumberExpression {
    /// Parse and compile `expression` against `registry`.
    ///
    /// The expression keeps its own handles to the parameter types it uses.
    ///
    /// # Errors
    /// Returns [`ExpressionError::Syntax`] for malformed expressions and
    /// undefined parameter types, and [`ExpressionError::Regex`] when the
    /// compiled pattern exceeds the configured size limit.
    pub fn new(expression: &str, registry: &ParameterTypeRegistry) -> Result<Self, ExpressionError> {
        let ast = parse(expression)?;
        let CompiledPattern {
            pattern,
            parameters,
        } = build_regex_from_ast(expression, &ast, registry)?;
        Ok(Self {
            source: expression.to_owned(),
            ast,
            parameters,
            tree_regex: TreeRegex::new(&pattern)?,
        })
    }

    /// The syntax tree.
    #[must_use]
    pub const fn ast(&self) -> &Node {
        &self.ast
    }

    /// Parameter types in capture-group order.
    pub fn parameter_types(&self) -> impl Iterator<Item = &Arc<ParameterType>> {
        self.parameters.iter().map(|slot| &slot.parameter_type)
    }

    /// Parameter types with their explicit names, in capture-group order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSlot] {
        &self.parameters
    }
}

impl Expression for CucumberExpression {
    fn source(&self) -> &str {
        &self.source
    }

    fn regex(&self) -> &Regex {
        self.tree_regex.regex()
    }

    fn match_text(&self, text: &str) -> Result<Option<Vec<Argument>>, ExpressionError> {
        Argument::build(&self.tree_regex, text, &self.parameters)
    }
}
