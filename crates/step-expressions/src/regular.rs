//! Hand-written regular expressions typed through the registry.

use std::sync::Arc;

use log::debug;
use regex::Regex;

use crate::argument::Argument;
use crate::errors::ExpressionError;
use crate::expression::{Expression, ParameterSlot};
use crate::parameter::{ParameterType, ParameterTypeRegistry};
use crate::tree_regex::TreeRegex;

/// Length of a capture-name prefix (`?P<name>` or `?<name>`) at the start
/// of `source`, along with the name.
fn group_name_prefix(source: &str) -> Option<(&str, usize)> {
    let after_marker = source
        .strip_prefix("?P<")
        .or_else(|| source.strip_prefix("?<"))?;
    let marker = source.len() - after_marker.len();
    let (name, _) = after_marker.split_once('>')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    valid.then_some((name, marker + name.len() + 1))
}

/// Remove every capture-name marker so nested named groups compare equal
/// to registered pattern sources.
fn strip_group_names(source: &str) -> String {
    let mut stripped = String::with_capacity(source.len());
    let mut rest = source;
    let mut escaping = false;
    while let Some(ch) = rest.chars().next() {
        let after = rest.get(ch.len_utf8()..).unwrap_or_default();
        stripped.push(ch);
        rest = after;
        if ch == '(' && !escaping {
            if let Some((_, skip)) = group_name_prefix(rest) {
                rest = rest.get(skip..).unwrap_or_default();
            }
        }
        escaping = ch == '\\' && !escaping;
    }
    stripped
}

/// Split a capture group source into its name and the unnamed pattern.
fn split_named_group(source: &str) -> (Option<&str>, String) {
    match group_name_prefix(source) {
        Some((name, skip)) => (
            Some(name),
            strip_group_names(source.get(skip..).unwrap_or_default()),
        ),
        None => (None, strip_group_names(source)),
    }
}

/// A regular expression whose capture groups are typed by looking their
/// sources up in a registry.
///
/// Groups no registered type owns are passed through as strings.
///
/// # Examples
/// ```
/// use step_expressions::{Expression, ParameterTypeRegistry, RegularExpression, Value};
///
/// let registry = ParameterTypeRegistry::new();
/// let expression = RegularExpression::from_pattern(r"^I have (\d+) cukes? in my (\w+)$", &registry)
///     .expect("valid regex");
/// let arguments = expression
///     .match_text("I have 3 cukes in my belly")
///     .expect("types resolve")
///     .expect("text matches");
/// assert_eq!(arguments[0].value().ok(), Some(Value::I32(3)));
/// assert_eq!(arguments[1].value().ok(), Some(Value::Str("belly".into())));
/// ```
#[derive(Debug, Clone)]
pub struct RegularExpression<'r> {
    tree_regex: TreeRegex,
    registry: &'r ParameterTypeRegistry,
}

impl<'r> RegularExpression<'r> {
    /// Wrap a compiled regex.
    #[must_use]
    pub fn new(regex: Regex, registry: &'r ParameterTypeRegistry) -> Self {
        Self {
            tree_regex: TreeRegex::from_regex(regex),
            registry,
        }
    }

    /// Compile `pattern` with the configured size limit.
    ///
    /// # Errors
    /// Returns [`ExpressionError::Regex`] when the pattern does not compile.
    pub fn from_pattern(
        pattern: &str,
        registry: &'r ParameterTypeRegistry,
    ) -> Result<Self, ExpressionError> {
        Ok(Self {
            tree_regex: TreeRegex::new(pattern)?,
            registry,
        })
    }

    /// Type each top-level capture group; `text` only feeds diagnostics.
    fn parameters(&self, text: &str) -> Result<Vec<ParameterSlot>, ExpressionError> {
        let expression_regexp = self.tree_regex.regex().as_str();
        self.tree_regex
            .group_builder()
            .children()
            .map(|child| {
                let source = child.source().unwrap_or_default();
                let (name, pattern) = split_named_group(source);
                let parameter_type = match self.registry.lookup_by_regexp(
                    &pattern,
                    expression_regexp,
                    text,
                )? {
                    Some(parameter_type) => parameter_type,
                    None => {
                        debug!("no parameter type owns /{pattern}/; passing it through");
                        Arc::new(ParameterType::untyped(name, &pattern))
                    }
                };
                Ok(ParameterSlot {
                    parameter_type,
                    name: name.map(str::to_owned),
                })
            })
            .collect()
    }
}

impl Expression for RegularExpression<'_> {
    fn source(&self) -> &str {
        self.tree_regex.regex().as_str()
    }

    fn regex(&self) -> &Regex {
        self.tree_regex.regex()
    }

    fn match_text(&self, text: &str) -> Result<Option<Vec<Argument>>, ExpressionError> {
        if !self.tree_regex.regex().is_match(text) {
            return Ok(None);
        }
        let parameters = self.parameters(text)?;
        Argument::build(&self.tree_regex, text, &parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("?P<count>\\d+", Some("count"), "\\d+")]
    #[case("?<count>\\d+", Some("count"), "\\d+")]
    #[case("\\d+", None, "\\d+")]
    #[case("?:a|b", None, "?:a|b")]
    #[case("?P<outer>a(?P<inner>b)", Some("outer"), "a(b)")]
    #[case("a\\(?P<x>b", None, "a\\(?P<x>b")]
    fn splits_group_names(
        #[case] source: &str,
        #[case] name: Option<&str>,
        #[case] pattern: &str,
    ) {
        assert_eq!(split_named_group(source), (name, pattern.to_owned()));
    }

    #[test]
    fn untyped_groups_pass_strings_through() {
        let registry = ParameterTypeRegistry::new();
        let Ok(expression) = RegularExpression::from_pattern("^I am (.+)$", &registry) else {
            panic!("regex should compile");
        };
        let Ok(Some(arguments)) = expression.match_text("I am here") else {
            panic!("text should match");
        };
        let argument = arguments.first();
        assert_eq!(
            argument.map(|a| a.parameter_type().value_type().to_owned()),
            Some("String".to_owned())
        );
        assert_eq!(
            argument.and_then(|a| a.value().ok()),
            Some(crate::Value::Str("here".into()))
        );
    }

    #[test]
    fn non_matching_text_skips_type_lookup() {
        let mut registry = ParameterTypeRegistry::new();
        for name in ["alpha", "beta"] {
            let defined = registry.define_parameter_type(ParameterType::unchecked(
                name,
                ["[a-z]+"],
                "String",
                crate::parameter::first_as_string,
            ));
            assert!(defined.is_ok());
        }
        let Ok(expression) = RegularExpression::from_pattern("^([a-z]+)$", &registry) else {
            panic!("regex should compile");
        };
        assert!(matches!(expression.match_text("123"), Ok(None)));
        assert!(matches!(
            expression.match_text("abc"),
            Err(ExpressionError::AmbiguousParameterType(_))
        ));
    }
}
