//! Error types shared by the expression pipeline, the parameter-type registry
//! and the argument binder.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::expression::ast::{Located, Token, TokenKind};
use crate::generator::GeneratedExpression;
use crate::parameter::ParameterType;

/// Category of a positional problem found while compiling an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ProblemKind {
    /// A `(` or `{` without its closing counterpart.
    MissingEndToken,
    /// A backslash followed by a character that cannot be escaped.
    CantEscape,
    /// A backslash as the final character of the expression.
    EndOfLineCannotBeEscaped,
    /// An optional without any text.
    OptionalMayNotBeEmpty,
    /// A parameter inside an optional.
    ParameterIsNotAllowedInOptional,
    /// An optional inside another optional.
    OptionalIsNotAllowedInOptional,
    /// An alternative with no content, as in `a//b`.
    AlternativeMayNotBeEmpty,
    /// An alternative consisting solely of optionals.
    AlternativeMayNotExclusivelyContainOptionals,
    /// A `/` inside an optional.
    AlternationNotAllowedInOptional,
    /// A demarcation character inside `{...}`.
    InvalidParameterTypeName,
    /// A `{name}` that the registry does not know.
    UndefinedParameterType,
    /// A token that no parsing rule in the current context accepts.
    NoEligibleParsers,
}

/// A located problem within an expression, rendered with a pointer under the
/// offending span.
///
/// # Examples
/// ```
/// use step_expressions::{CucumberExpression, ExpressionError, ParameterTypeRegistry, ProblemKind};
///
/// let registry = ParameterTypeRegistry::new();
/// let Err(ExpressionError::Syntax(problem)) = CucumberExpression::new("({int})", &registry) else {
///     panic!("expected a syntax problem");
/// };
/// assert_eq!(problem.kind, ProblemKind::ParameterIsNotAllowedInOptional);
/// assert_eq!(problem.index(), 1);
/// assert_eq!(problem.pointer(), " ^---^");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionProblem {
    /// What went wrong.
    pub kind: ProblemKind,
    /// The expression as written by the author.
    pub expression: String,
    /// Zero-based character offset where the offending span starts.
    pub start: usize,
    /// Zero-based character offset one past the offending span.
    pub end: usize,
    /// One-line statement of the problem.
    pub problem: String,
    /// One-line suggestion for fixing it.
    pub solution: String,
    /// Parameter type name involved in the problem, when known.
    pub parameter: Option<String>,
}

impl ExpressionProblem {
    fn new(
        kind: ProblemKind,
        expression: &str,
        span: (usize, usize),
        problem: impl Into<String>,
        solution: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            expression: expression.to_owned(),
            start: span.0,
            end: span.1,
            problem: problem.into(),
            solution: solution.into(),
            parameter: None,
        }
    }

    fn with_parameter(mut self, name: &str) -> Self {
        self.parameter = Some(name.to_owned());
        self
    }

    /// Zero-based character index reported to the author.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.start
    }

    /// Pointer line marking the offending span: `^` for a single character,
    /// `^--^` for longer spans.
    #[must_use]
    pub fn pointer(&self) -> String {
        let mut pointer = " ".repeat(self.start);
        pointer.push('^');
        if self.start + 1 < self.end {
            pointer.push_str(&"-".repeat(self.end - self.start - 2));
            pointer.push('^');
        }
        pointer
    }
}

impl fmt::Display for ExpressionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "This Cucumber Expression has a problem at column {}:",
            self.start + 1
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.expression)?;
        writeln!(f, "{}", self.pointer())?;
        writeln!(f, "{}.", self.problem)?;
        f.write_str(&self.solution)
    }
}

/// Details of a regular-expression capture group whose pattern is shared by
/// several non-preferential parameter types.
#[derive(Debug, Clone)]
pub struct AmbiguousParameterType {
    /// Source of the ambiguous capture group.
    pub parameter_type_regexp: String,
    /// Source of the whole regular expression.
    pub expression_regexp: String,
    /// Competing parameter types, best ranked first.
    pub parameter_types: Vec<Arc<ParameterType>>,
    /// Cucumber Expressions the author could use instead.
    pub generated_expressions: Vec<GeneratedExpression>,
}

impl fmt::Display for AmbiguousParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .parameter_types
            .iter()
            .map(|parameter_type| format!("{{{}}}", parameter_type.name()))
            .collect::<Vec<_>>()
            .join("\n   ");
        let expressions = self
            .generated_expressions
            .iter()
            .map(GeneratedExpression::source)
            .collect::<Vec<_>>()
            .join("\n   ");
        writeln!(f, "Your Regular Expression /{}/", self.expression_regexp)?;
        writeln!(
            f,
            "matches multiple parameter types with regexp /{}/:",
            self.parameter_type_regexp
        )?;
        writeln!(f, "   {names}")?;
        writeln!(f)?;
        writeln!(f, "I couldn't decide which one to use. You have two options:")?;
        writeln!(f)?;
        writeln!(
            f,
            "1) Use a Cucumber Expression instead of a Regular Expression. Try one of these:"
        )?;
        writeln!(f, "   {expressions}")?;
        writeln!(f)?;
        f.write_str(
            "2) Make one of the parameter types preferential and continue to use a Regular Expression.",
        )
    }
}

/// Errors surfaced while compiling, registering or matching expressions.
///
/// # Examples
/// ```
/// use step_expressions::{ExpressionError, ParameterType, ParameterTypeRegistry, Value};
///
/// let mut registry = ParameterTypeRegistry::new();
/// let duplicate = ParameterType::new("int", [r"\d+"], "u32", |_| Ok(Value::Nil))
///     .expect("name is valid");
/// let err = registry.define_parameter_type(duplicate).unwrap_err();
/// assert!(matches!(err, ExpressionError::DuplicateParameterTypeName(ref name) if name == "int"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExpressionError {
    /// The expression text is malformed; see [`ExpressionProblem`].
    #[error("{0}")]
    Syntax(ExpressionProblem),
    /// A regular-expression capture group maps to several parameter types.
    #[error("{0}")]
    AmbiguousParameterType(Box<AmbiguousParameterType>),
    /// A parameter type with this name is already registered.
    #[error("There is already a parameter type with name {0}")]
    DuplicateParameterTypeName(String),
    /// A second anonymous parameter type was defined.
    #[error("The anonymous parameter type has already been defined")]
    DuplicateAnonymousParameterType,
    /// Two preferential parameter types share one pattern source.
    #[error(
        "There can only be one preferential parameter type per regexp. The regexp /{regexp}/ is used for two preferential parameter types, {{{existing}}} and {{{candidate}}}"
    )]
    DuplicatePreferredParameterType {
        /// The shared pattern source.
        regexp: String,
        /// Name of the already registered preferential type.
        existing: String,
        /// Name of the rejected preferential type.
        candidate: String,
    },
    /// A declared parameter type name contains a reserved character.
    #[error(
        "Illegal character in parameter name {{{0}}}. Parameter names may not contain '[', ']', '(', ')', '$', '.', '|', '?', '*', '+', '{{', '}}', '\\' or '/'"
    )]
    InvalidParameterTypeName(String),
    /// The match produced a different number of top-level groups than there
    /// are parameter types to bind them to.
    #[error("Group has {groups} capture groups, but there were {parameter_types} parameter types")]
    CaptureGroupMismatch {
        /// Top-level capture groups in the match.
        groups: usize,
        /// Parameter types supplied for binding.
        parameter_types: usize,
    },
    /// An anchored string failed to compile as a regular expression but
    /// looks like a Cucumber Expression.
    #[error(
        "You cannot use anchors (^ or $) in Cucumber Expressions. Please remove them from {0}"
    )]
    AnchorsInCucumberExpression(String),
    /// The generated or supplied regular expression failed to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl ExpressionError {
    /// Return the positional problem when this error carries one.
    #[must_use]
    pub const fn problem(&self) -> Option<&ExpressionProblem> {
        match self {
            Self::Syntax(problem) => Some(problem),
            _ => None,
        }
    }
}

impl From<ExpressionProblem> for ExpressionError {
    fn from(problem: ExpressionProblem) -> Self {
        Self::Syntax(problem)
    }
}

fn span_of(located: &impl Located) -> (usize, usize) {
    (located.start(), located.end())
}

pub(crate) fn missing_end_token(
    expression: &str,
    begin: TokenKind,
    end: TokenKind,
    current: &impl Located,
) -> ExpressionError {
    let purpose = begin.purpose();
    ExpressionProblem::new(
        ProblemKind::MissingEndToken,
        expression,
        span_of(current),
        format!(
            "The '{}' does not have a matching '{}'",
            begin.symbol(),
            end.symbol()
        ),
        format!(
            "If you did not intend to use {purpose} you can use '\\{}' to escape the {purpose}",
            begin.symbol()
        ),
    )
    .into()
}

pub(crate) fn alternation_not_allowed_in_optional(
    expression: &str,
    current: &impl Located,
) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::AlternationNotAllowedInOptional,
        expression,
        span_of(current),
        "An alternation can not be used inside an optional",
        "If you did not mean to use an alternation you can use '\\/' to escape the '/'. Otherwise rephrase your expression or consider using a regular expression instead.",
    )
    .into()
}

pub(crate) fn no_eligible_parsers(expression: &str, token: &Token) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::NoEligibleParsers,
        expression,
        span_of(token),
        format!("No eligible parsers for the {:?} token {:?}", token.kind, token.text),
        "This expression could not be parsed. Escape the token with '\\' or use a regular expression instead",
    )
    .into()
}

pub(crate) fn end_of_line_cannot_be_escaped(expression: &str) -> ExpressionError {
    let index = expression.chars().count().saturating_sub(1);
    ExpressionProblem::new(
        ProblemKind::EndOfLineCannotBeEscaped,
        expression,
        (index, index + 1),
        "The end of line can not be escaped",
        "You can use '\\\\' to escape the '\\'",
    )
    .into()
}

pub(crate) fn cant_escape(expression: &str, index: usize) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::CantEscape,
        expression,
        (index, index + 1),
        "Only the characters '{', '}', '(', ')', '\\', '/' and whitespace can be escaped",
        "If you did mean to use an '\\' you can use '\\\\' to escape it",
    )
    .into()
}

pub(crate) fn alternative_may_not_be_empty(
    node: &impl Located,
    expression: &str,
) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::AlternativeMayNotBeEmpty,
        expression,
        span_of(node),
        "Alternative may not be empty",
        "If you did not mean to use an alternative you can use '\\/' to escape the '/'",
    )
    .into()
}

pub(crate) fn alternative_may_not_exclusively_contain_optionals(
    node: &impl Located,
    expression: &str,
) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::AlternativeMayNotExclusivelyContainOptionals,
        expression,
        span_of(node),
        "An alternative may not exclusively contain optionals",
        "If you did not mean to use an optional you can use '\\(' to escape the '('",
    )
    .into()
}

pub(crate) fn parameter_is_not_allowed_in_optional(
    node: &impl Located,
    expression: &str,
) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::ParameterIsNotAllowedInOptional,
        expression,
        span_of(node),
        "An optional may not contain a parameter type",
        "If you did not mean to use an parameter type you can use '\\{' to escape the '{'",
    )
    .into()
}

pub(crate) fn optional_is_not_allowed_in_optional(
    node: &impl Located,
    expression: &str,
) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::OptionalIsNotAllowedInOptional,
        expression,
        span_of(node),
        "An optional may not contain an other optional",
        "If you did not mean to use an optional type you can use '\\(' to escape the '('. For more complicated expressions consider using a regular expression instead.",
    )
    .into()
}

pub(crate) fn optional_may_not_be_empty(node: &impl Located, expression: &str) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::OptionalMayNotBeEmpty,
        expression,
        span_of(node),
        "An optional must contain some text",
        "If you did not mean to use an optional you can use '\\(' to escape the '('",
    )
    .into()
}

pub(crate) fn invalid_parameter_type_name_in_node(
    token: &impl Located,
    expression: &str,
) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::InvalidParameterTypeName,
        expression,
        span_of(token),
        "Parameter names may not contain '{', '}', '(', ')', '\\' or '/'",
        "Did you mean to use a regular expression?",
    )
    .into()
}

pub(crate) fn undefined_parameter_type(
    node: &impl Located,
    expression: &str,
    name: &str,
) -> ExpressionError {
    ExpressionProblem::new(
        ProblemKind::UndefinedParameterType,
        expression,
        span_of(node),
        format!("Undefined parameter type '{name}'"),
        format!("Please register a ParameterType for '{name}'"),
    )
    .with_parameter(name)
    .into()
}
