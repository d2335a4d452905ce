//! Decide whether a step pattern is a Cucumber Expression or a regex.

use log::warn;
use regex::Regex;

use crate::config::compile_regex;
use crate::errors::ExpressionError;
use crate::expression::{CucumberExpression, Expression};
use crate::parameter::ParameterTypeRegistry;
use crate::regular::RegularExpression;

/// How a step pattern should be compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// Compile as a Cucumber Expression.
    Cucumber,
    /// Compile as a regular expression.
    Regular,
}

/// Contents of each unescaped `{...}` block.
fn brace_blocks(source: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut escaping = false;
    let mut open = None;
    for (at, ch) in source.char_indices() {
        match ch {
            '{' if !escaping => open = Some(at),
            '}' if !escaping => {
                if let Some(start) = open.take() {
                    blocks.extend(source.get(start + 1..at));
                }
            }
            _ => {}
        }
        escaping = ch == '\\' && !escaping;
    }
    blocks
}

/// `3`, `2,` or `2,4`.
fn is_numeric_quantifier(block: &str) -> bool {
    let (min, max) = block.split_once(',').unwrap_or((block, ""));
    !min.is_empty()
        && min.chars().all(|c| c.is_ascii_digit())
        && max.chars().all(|c| c.is_ascii_digit())
}

/// A backslash followed by something a Cucumber Expression cannot escape.
fn has_regex_escape(source: &str) -> bool {
    let mut chars = source.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) if next.is_whitespace() || "{}()/\\".contains(next) => {}
                Some(_) => return true,
                None => return false,
            }
        }
    }
    false
}

/// Classify `source` without compiling it.
///
/// Anchors and `/.../` delimiters select a regex. Otherwise a `{...}` block
/// that is not a numeric quantifier selects a Cucumber Expression, and
/// regex-only syntax (`(?`, class escapes such as `\d`, quantifiers such as
/// `{3}`) selects a regex.
///
/// One anchor on either end is enough. A step such as `it costs 5$` is a
/// regex whose `$` anchors the end, so it no longer matches a literal
/// dollar sign. Build a [`CucumberExpression`] directly to keep it.
///
/// # Examples
/// ```
/// use step_expressions::{ExpressionKind, classify};
///
/// assert_eq!(classify("I have {int} cukes"), ExpressionKind::Cucumber);
/// assert_eq!(classify(r"^I have (\d+) cukes$"), ExpressionKind::Regular);
/// assert_eq!(classify(r"I have \d{2} cukes"), ExpressionKind::Regular);
/// assert_eq!(classify("I have cukes"), ExpressionKind::Cucumber);
/// ```
#[must_use]
pub fn classify(source: &str) -> ExpressionKind {
    if source.starts_with('^') || source.ends_with('$') {
        return ExpressionKind::Regular;
    }
    if is_slash_delimited(source) {
        return ExpressionKind::Regular;
    }
    let blocks = brace_blocks(source);
    if blocks.iter().any(|block| !is_numeric_quantifier(block)) {
        return ExpressionKind::Cucumber;
    }
    if !blocks.is_empty() || source.contains("(?") || has_regex_escape(source) {
        return ExpressionKind::Regular;
    }
    ExpressionKind::Cucumber
}

fn is_slash_delimited(source: &str) -> bool {
    source.len() >= 2 && source.starts_with('/') && source.ends_with('/')
}

/// Builds expressions from step patterns, choosing the flavour with
/// [`classify`].
#[derive(Debug, Clone, Copy)]
pub struct ExpressionFactory<'r> {
    registry: &'r ParameterTypeRegistry,
}

impl<'r> ExpressionFactory<'r> {
    /// Create a factory compiling against `registry`.
    #[must_use]
    pub const fn new(registry: &'r ParameterTypeRegistry) -> Self {
        Self { registry }
    }

    /// Compile `source` as whichever flavour it looks like.
    ///
    /// # Errors
    /// Returns the compilation error of the chosen flavour, or
    /// [`ExpressionError::AnchorsInCucumberExpression`] when an anchored
    /// pattern fails as a regex but contains a parameter block.
    pub fn create_expression(
        &self,
        source: &str,
    ) -> Result<Box<dyn Expression + 'r>, ExpressionError> {
        match classify(source) {
            ExpressionKind::Cucumber => Ok(Box::new(CucumberExpression::new(source, self.registry)?)),
            ExpressionKind::Regular => self.create_regular(source),
        }
    }

    /// Wrap an already compiled regex.
    #[must_use]
    pub fn create_regular_expression(&self, regex: Regex) -> Box<dyn Expression + 'r> {
        Box::new(RegularExpression::new(regex, self.registry))
    }

    fn create_regular(&self, source: &str) -> Result<Box<dyn Expression + 'r>, ExpressionError> {
        let pattern = if is_slash_delimited(source) {
            source
                .strip_prefix('/')
                .and_then(|inner| inner.strip_suffix('/'))
                .unwrap_or(source)
        } else {
            source
        };
        match compile_regex(pattern) {
            Ok(regex) => Ok(self.create_regular_expression(regex)),
            Err(err) => {
                let anchored = source.starts_with('^') || source.ends_with('$');
                if anchored && brace_blocks(source).iter().any(|b| !is_numeric_quantifier(b)) {
                    return Err(ExpressionError::AnchorsInCucumberExpression(
                        source.to_owned(),
                    ));
                }
                if is_slash_delimited(source) || anchored {
                    return Err(err.into());
                }
                warn!("{source:?} is not a valid regex ({err}); compiling it as a Cucumber Expression");
                Ok(Box::new(CucumberExpression::new(source, self.registry)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("I have {int} cukes", ExpressionKind::Cucumber)]
    #[case("I have {} cukes", ExpressionKind::Cucumber)]
    #[case("three blind/sighted mice", ExpressionKind::Cucumber)]
    #[case("I have cuke(s)", ExpressionKind::Cucumber)]
    #[case(r"I have \{3} cukes", ExpressionKind::Cucumber)]
    #[case("^I have cukes", ExpressionKind::Regular)]
    #[case("I have cukes$", ExpressionKind::Regular)]
    #[case("it costs 5$", ExpressionKind::Regular)]
    #[case("it costs $5", ExpressionKind::Cucumber)]
    #[case("/I have (.*) cukes/", ExpressionKind::Regular)]
    #[case(r"I have (?P<cuke_count>\d+) cukes? in my (?P<word>\w+) now", ExpressionKind::Regular)]
    #[case(r"I have \d cukes", ExpressionKind::Regular)]
    #[case("a{2,4}b", ExpressionKind::Regular)]
    #[case("a{3}b {int}", ExpressionKind::Cucumber)]
    fn classifies_sources(#[case] source: &str, #[case] expected: ExpressionKind) {
        assert_eq!(classify(source), expected);
    }

    #[rstest]
    #[case("3", true)]
    #[case("2,", true)]
    #[case("2,4", true)]
    #[case("", false)]
    #[case(",4", false)]
    #[case("int", false)]
    fn recognises_numeric_quantifiers(#[case] block: &str, #[case] expected: bool) {
        assert_eq!(is_numeric_quantifier(block), expected);
    }

    #[test]
    fn strips_slash_delimiters() {
        let registry = ParameterTypeRegistry::new();
        let factory = ExpressionFactory::new(&registry);
        let Ok(expression) = factory.create_expression("/I have (.*) cukes/") else {
            panic!("regex should compile");
        };
        assert_eq!(expression.source(), "I have (.*) cukes");
    }

    #[test]
    fn trailing_dollar_is_an_end_anchor() {
        let registry = ParameterTypeRegistry::new();
        let factory = ExpressionFactory::new(&registry);
        let Ok(expression) = factory.create_expression("it costs 5$") else {
            panic!("regex should compile");
        };
        assert!(matches!(expression.match_text("it costs 5"), Ok(Some(_))));
        assert!(matches!(expression.match_text("it costs 5$"), Ok(None)));

        let Ok(literal) = CucumberExpression::new("it costs 5$", &registry) else {
            panic!("expression should compile");
        };
        assert!(matches!(literal.match_text("it costs 5$"), Ok(Some(_))));
    }

    #[test]
    fn anchored_parameter_blocks_are_reported() {
        let registry = ParameterTypeRegistry::new();
        let factory = ExpressionFactory::new(&registry);
        let result = factory.create_expression("^I have {int} (cukes$");
        assert!(matches!(
            result,
            Err(ExpressionError::AnchorsInCucumberExpression(ref s)) if s == "^I have {int} (cukes$"
        ));
    }

    #[test]
    fn invalid_regex_without_anchors_falls_back() {
        let registry = ParameterTypeRegistry::new();
        let factory = ExpressionFactory::new(&registry);
        let Ok(expression) = factory.create_expression("I said (? loudly)") else {
            panic!("should fall back to a Cucumber Expression");
        };
        assert_eq!(expression.pattern(), r"^I said (?:\? loudly)?$");
        assert!(matches!(expression.match_text("I said ? loudly"), Ok(Some(_))));
    }
}
