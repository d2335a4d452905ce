//! Rewrite syntax trees into anchored regular-expression sources.

use std::sync::Arc;

use crate::errors::{
    ExpressionError, alternative_may_not_be_empty,
    alternative_may_not_exclusively_contain_optionals, optional_is_not_allowed_in_optional,
    optional_may_not_be_empty, parameter_is_not_allowed_in_optional, undefined_parameter_type,
};
use crate::parameter::{ParameterType, ParameterTypeRegistry};

use super::ast::{Node, NodeKind};
use super::parser::parse;

/// A parameter occurrence, in capture-group order.
#[derive(Debug, Clone)]
pub struct ParameterSlot {
    /// Type bound to the capture group.
    pub parameter_type: Arc<ParameterType>,
    /// Explicit name from `{name:type}` or a named regex group.
    pub name: Option<String>,
}

/// Regex source plus the parameters its top-level groups bind to.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Anchored regular-expression source.
    pub pattern: String,
    /// One entry per top-level capture group, left to right.
    pub parameters: Vec<ParameterSlot>,
}

struct Compiler<'a> {
    expression: &'a str,
    registry: &'a ParameterTypeRegistry,
    parameters: Vec<ParameterSlot>,
}

impl Compiler<'_> {
    fn rewrite(&mut self, node: &Node) -> Result<String, ExpressionError> {
        match node.kind {
            NodeKind::Text => Ok(regex::escape(&node.text())),
            NodeKind::Optional => self.rewrite_optional(node),
            NodeKind::Alternation => self.rewrite_alternation(node),
            NodeKind::Alternative => self.rewrite_children(node),
            NodeKind::Parameter => self.rewrite_parameter(node),
            NodeKind::Expression => Ok(format!("^{}$", self.rewrite_children(node)?)),
        }
    }

    fn rewrite_children(&mut self, node: &Node) -> Result<String, ExpressionError> {
        node.nodes().iter().map(|child| self.rewrite(child)).collect()
    }

    fn rewrite_optional(&mut self, node: &Node) -> Result<String, ExpressionError> {
        let children = node.nodes();
        if let Some(parameter) = children.iter().find(|c| c.kind == NodeKind::Parameter) {
            return Err(parameter_is_not_allowed_in_optional(parameter, self.expression));
        }
        if let Some(optional) = children.iter().find(|c| c.kind == NodeKind::Optional) {
            return Err(optional_is_not_allowed_in_optional(optional, self.expression));
        }
        if !children.iter().any(|c| c.kind == NodeKind::Text) {
            return Err(optional_may_not_be_empty(node, self.expression));
        }
        Ok(format!("(?:{})?", self.rewrite_children(node)?))
    }

    fn rewrite_alternation(&mut self, node: &Node) -> Result<String, ExpressionError> {
        for alternative in node.nodes() {
            if alternative.nodes().is_empty() {
                return Err(alternative_may_not_be_empty(alternative, self.expression));
            }
            if !alternative.nodes().iter().any(|c| c.kind == NodeKind::Text) {
                return Err(alternative_may_not_exclusively_contain_optionals(
                    alternative,
                    self.expression,
                ));
            }
        }
        let alternatives = node
            .nodes()
            .iter()
            .map(|alternative| self.rewrite(alternative))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("(?:{})", alternatives.join("|")))
    }

    fn rewrite_parameter(&mut self, node: &Node) -> Result<String, ExpressionError> {
        let text = node.text();
        let (name, type_name) = match text.split_once(':') {
            Some((name, type_name)) => (Some(name.to_owned()), type_name),
            None => (None, text.as_str()),
        };
        let Some(parameter_type) = self.registry.lookup_by_type_name(type_name) else {
            return Err(undefined_parameter_type(node, self.expression, type_name));
        };
        let group = match parameter_type.patterns() {
            [pattern] => format!("({pattern})"),
            patterns => {
                let alternatives: Vec<_> = patterns.iter().map(|p| format!("(?:{p})")).collect();
                format!("({})", alternatives.join("|"))
            }
        };
        self.parameters.push(ParameterSlot {
            parameter_type: Arc::clone(parameter_type),
            name,
        });
        Ok(group)
    }
}

/// Rewrite a parsed expression into an anchored regex source.
///
/// # Errors
/// Returns [`ExpressionError::Syntax`] when an optional holds a parameter,
/// another optional or no text, when an alternative is empty or holds only
/// optionals, or when a parameter names an unregistered type.
pub fn build_regex_from_ast(
    expression: &str,
    ast: &Node,
    registry: &ParameterTypeRegistry,
) -> Result<CompiledPattern, ExpressionError> {
    let mut compiler = Compiler {
        expression,
        registry,
        parameters: Vec::new(),
    };
    let pattern = compiler.rewrite(ast)?;
    Ok(CompiledPattern {
        pattern,
        parameters: compiler.parameters,
    })
}

/// Parse and rewrite `expression` in one step.
///
/// # Errors
/// Returns any [`ExpressionError`] the parser or rewriter reports.
///
/// # Examples
/// ```
/// use step_expressions::{ParameterTypeRegistry, build_regex_from_expression};
///
/// let registry = ParameterTypeRegistry::new();
/// let compiled = build_regex_from_expression("I have {int} cuke(s)", &registry)
///     .expect("valid expression");
/// assert_eq!(compiled.pattern, r"^I have ((?:-?\d+)|(?:\d+)) cuke(?:s)?$");
/// assert_eq!(compiled.parameters.len(), 1);
/// ```
pub fn build_regex_from_expression(
    expression: &str,
    registry: &ParameterTypeRegistry,
) -> Result<CompiledPattern, ExpressionError> {
    let ast = parse(expression)?;
    build_regex_from_ast(expression, &ast, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProblemKind;
    use crate::expression::test_support::{compile_err, compile_ok, parse_ok};
    use rstest::rstest;

    #[rstest]
    #[case("three blind mice", "^three blind mice$")]
    #[case("", "^$")]
    #[case("three (blind) mice", "^three (?:blind)? mice$")]
    #[case("three blind/sighted mice", "^three (?:blind|sighted) mice$")]
    #[case("a.b*c", r"^a\.b\*c$")]
    #[case(r"\(a\)", r"^\(a\)$")]
    #[case(r"a\\b", r"^a\\b$")]
    #[case("{word}", r"^([^\s]+)$")]
    #[case("{}", "^(.*)$")]
    #[case("cuke(s)!", r"^cuke(?:s)?!$")]
    fn rewrites_expressions(#[case] expression: &str, #[case] expected: &str) {
        assert_eq!(compile_ok(expression).pattern, expected);
    }

    #[test]
    fn multi_pattern_types_wrap_alternatives() {
        assert_eq!(
            compile_ok("{string}").pattern,
            r#"^((?:"([^"\\]*(\\.[^"\\]*)*)")|(?:'([^'\\]*(\\.[^'\\]*)*)'))$"#
        );
    }

    #[test]
    fn tracks_parameters_in_order_with_names() {
        let compiled = compile_ok("{count:int} {word} {label:string}");
        let tracked: Vec<_> = compiled
            .parameters
            .iter()
            .map(|slot| (slot.parameter_type.name(), slot.name.as_deref()))
            .collect();
        assert_eq!(
            tracked,
            [("int", Some("count")), ("word", None), ("string", Some("label"))]
        );
    }

    #[test]
    fn rewriting_twice_is_identical() {
        let registry = ParameterTypeRegistry::new();
        let expression = "I have {int} cuke(s) in my belly/stomach";
        let ast = parse_ok(expression);
        let first = build_regex_from_ast(expression, &ast, &registry);
        let second = build_regex_from_ast(expression, &ast, &registry);
        let (Ok(first), Ok(second)) = (first, second) else {
            panic!("expression should compile twice");
        };
        assert_eq!(first.pattern, second.pattern);
        let names = |c: &CompiledPattern| {
            c.parameters
                .iter()
                .map(|slot| (slot.parameter_type.name().to_owned(), slot.name.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
    }

    #[rstest]
    #[case("({int})", ProblemKind::ParameterIsNotAllowedInOptional, 1, " ^---^")]
    #[case("((a))", ProblemKind::OptionalIsNotAllowedInOptional, 1, " ^-^")]
    #[case("three () mice", ProblemKind::OptionalMayNotBeEmpty, 6, "      ^^")]
    #[case("three blind//sighted mice", ProblemKind::AlternativeMayNotBeEmpty, 12, "            ^")]
    #[case("three (blind)/sighted mice", ProblemKind::AlternativeMayNotExclusivelyContainOptionals, 6, "      ^-----^")]
    #[case("{unknown}", ProblemKind::UndefinedParameterType, 0, "^-------^")]
    fn reports_semantic_errors(
        #[case] expression: &str,
        #[case] kind: ProblemKind,
        #[case] index: usize,
        #[case] pointer: &str,
    ) {
        let problem = compile_err(expression);
        assert_eq!(problem.kind, kind);
        assert_eq!(problem.index(), index);
        assert_eq!(problem.pointer(), pointer);
    }

    #[test]
    fn undefined_type_names_the_type_part() {
        let problem = compile_err("{colour:color}");
        assert_eq!(problem.parameter.as_deref(), Some("color"));
        assert_eq!(problem.problem, "Undefined parameter type 'color'");
        assert_eq!(problem.solution, "Please register a ParameterType for 'color'");
    }
}
