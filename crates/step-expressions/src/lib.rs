//! Step expressions for behaviour-driven test runners.
//!
//! The crate compiles Cucumber Expressions such as `I have {int} cuke(s)`
//! into anchored regular expressions, matches step text against them and
//! converts each capture into a typed [`Value`] through a
//! [`ParameterTypeRegistry`]. Hand-written regular expressions are supported
//! too: their capture groups are typed by looking the group source up in the
//! registry. Finally, [`ExpressionGenerator`] suggests expressions for step
//! text that has no definition yet.
//!
//! ```
//! use step_expressions::{
//!     CucumberExpression, Expression, ExpressionGenerator, ParameterTypeRegistry, Value,
//! };
//!
//! let registry = ParameterTypeRegistry::new();
//! let expression = CucumberExpression::new("I have {int} cuke(s) in my {word}", &registry)
//!     .expect("valid expression");
//! let arguments = expression
//!     .match_text("I have 42 cukes in my belly")
//!     .expect("types resolve")
//!     .expect("text matches");
//! assert_eq!(arguments[0].value().ok(), Some(Value::I32(42)));
//! assert_eq!(arguments[1].value().ok(), Some(Value::Str("belly".into())));
//!
//! let suggestions = ExpressionGenerator::new(&registry).generate_expressions("I have 3 pears");
//! assert_eq!(suggestions[0].source(), "I have {int} pears");
//! ```

mod argument;
mod capture;
pub mod config;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
mod errors;
mod expression;
mod factory;
mod generator;
mod parameter;
mod regular;
mod tree_regex;

pub use argument::Argument;
pub use capture::Group;
pub use errors::{AmbiguousParameterType, ExpressionError, ExpressionProblem, ProblemKind};
pub use expression::{
    CompiledPattern, CucumberExpression, Expression, Located, Node, NodeBody, NodeKind,
    ParameterSlot, Token, TokenKind, build_regex_from_ast, build_regex_from_expression, parse,
    tokenize,
};
pub use factory::{ExpressionFactory, ExpressionKind, classify};
pub use generator::{ExpressionGenerator, GeneratedExpression, MAX_EXPRESSIONS};
pub use parameter::{
    ANONYMOUS_PATTERN, FLOAT_PATTERN, INTEGER_PATTERNS, ParameterType, ParameterTypeRegistry,
    STRING_PATTERNS, TransformError, Transformer, Value, WORD_PATTERN,
};
pub use regular::RegularExpression;
pub use tree_regex::{GroupBuilder, TreeRegex};
