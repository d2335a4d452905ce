//! Suggest Cucumber Expressions for a sample step text.
//!
//! Every snippet-eligible pattern is searched for whole-word occurrences.
//! At each position the earliest, then longest, match wins, and every type
//! tied with it becomes a candidate for that placeholder.

mod combinatorial;
mod matcher;

use std::sync::Arc;

use hashbrown::HashMap;
use log::{trace, warn};

use crate::config::compile_regex;
use crate::parameter::{ParameterType, ParameterTypeRegistry};

use matcher::ParameterTypeMatcher;

pub use combinatorial::MAX_EXPRESSIONS;

/// A suggested expression: a template with one `%s` per placeholder and the
/// parameter types filling them.
#[derive(Debug, Clone)]
pub struct GeneratedExpression {
    template: String,
    parameter_types: Vec<Arc<ParameterType>>,
}

impl GeneratedExpression {
    pub(crate) fn new(template: &str, parameter_types: Vec<Arc<ParameterType>>) -> Self {
        Self {
            template: template.to_owned(),
            parameter_types,
        }
    }

    /// The template, with `%%` standing for a literal `%`.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The expression text with each `%s` replaced by its type's name.
    #[must_use]
    pub fn source(&self) -> String {
        let mut names = self.parameter_types.iter().map(|t| t.name());
        let mut source = String::with_capacity(self.template.len());
        let mut chars = self.template.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                source.push(ch);
                continue;
            }
            match chars.next() {
                Some('s') => source.push_str(names.next().unwrap_or_default()),
                Some(other) => source.push(other),
                None => source.push('%'),
            }
        }
        source
    }

    /// Argument names for generated step functions; repeats of a type name
    /// get a counter suffix: `int`, `int2`, `int3`.
    #[must_use]
    pub fn parameter_names(&self) -> Vec<String> {
        let mut usage: HashMap<&str, usize> = HashMap::new();
        self.parameter_types
            .iter()
            .map(|parameter_type| {
                let name = parameter_type.name();
                let count = usage.entry(name).or_default();
                *count += 1;
                if *count == 1 {
                    name.to_owned()
                } else {
                    format!("{name}{count}")
                }
            })
            .collect()
    }

    /// The parameter types chosen for each placeholder.
    #[must_use]
    pub fn parameter_types(&self) -> &[Arc<ParameterType>] {
        &self.parameter_types
    }
}

/// Keep the template a valid expression skeleton.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '%' => escaped.push_str("%%"),
            '(' | '{' | '/' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Generates expressions from the snippet-eligible types of a registry.
///
/// # Examples
/// ```
/// use step_expressions::{ExpressionGenerator, ParameterTypeRegistry};
///
/// let registry = ParameterTypeRegistry::new();
/// let generated = ExpressionGenerator::new(&registry)
///     .generate_expressions("I have 2 cucumbers and 1.5 tomato");
/// assert_eq!(generated[0].source(), "I have {int} cucumbers and {float} tomato");
/// assert_eq!(generated[0].parameter_names(), ["int", "float"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExpressionGenerator<'r> {
    registry: &'r ParameterTypeRegistry,
}

impl<'r> ExpressionGenerator<'r> {
    /// Create a generator over `registry`.
    #[must_use]
    pub const fn new(registry: &'r ParameterTypeRegistry) -> Self {
        Self { registry }
    }

    fn matchers<'t>(&self, text: &'t str) -> Vec<ParameterTypeMatcher<'t>> {
        let mut matchers = Vec::new();
        for parameter_type in self.registry.parameter_types() {
            if !parameter_type.use_for_snippets() {
                continue;
            }
            for pattern in parameter_type.patterns() {
                match compile_regex(&format!("({pattern})")) {
                    Ok(regex) => matchers.push(ParameterTypeMatcher::new(
                        Arc::clone(parameter_type),
                        regex,
                        text,
                        0,
                    )),
                    Err(err) => warn!(
                        "skipping /{pattern}/ of {{{}}} for suggestions: {err}",
                        parameter_type.name()
                    ),
                }
            }
        }
        matchers
    }

    /// Suggest expressions matching `text`, best first.
    ///
    /// There is always at least one suggestion; at worst the escaped text
    /// itself. At most [`MAX_EXPRESSIONS`] are returned.
    #[must_use]
    pub fn generate_expressions(&self, text: &str) -> Vec<GeneratedExpression> {
        let matchers = self.matchers(text);
        let mut choices: Vec<Vec<Arc<ParameterType>>> = Vec::new();
        let mut template = String::new();
        let mut position = 0;

        loop {
            let mut found: Vec<ParameterTypeMatcher<'_>> = matchers
                .iter()
                .map(|matcher| matcher.advance_to(position))
                .filter(ParameterTypeMatcher::find)
                .collect();
            found.sort_by(ParameterTypeMatcher::compare);
            let Some(best) = found.first() else {
                break;
            };

            let mut candidates: Vec<Arc<ParameterType>> = Vec::new();
            for matcher in found
                .iter()
                .filter(|m| ParameterTypeMatcher::compare(m, best).is_eq())
            {
                if !candidates.iter().any(|c| Arc::ptr_eq(c, matcher.parameter_type())) {
                    candidates.push(Arc::clone(matcher.parameter_type()));
                }
            }
            candidates.sort_by(|a, b| ParameterType::compare(a, b));
            trace!(
                "placeholder at {}..{} could be {:?}",
                best.start(),
                best.end(),
                candidates.iter().map(|c| c.name()).collect::<Vec<_>>()
            );

            template.push_str(&escape(text.get(position..best.start()).unwrap_or_default()));
            template.push_str("{%s}");
            choices.push(candidates);
            position = best.end();
            if position >= text.len() {
                break;
            }
        }
        template.push_str(&escape(text.get(position..).unwrap_or_default()));
        combinatorial::generate_expressions(&template, &choices)
    }
}
