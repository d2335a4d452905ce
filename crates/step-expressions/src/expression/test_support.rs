//! Test helpers for asserting lexer, parser and compiler outcomes.
use super::ast::Node;
use super::compiler::{CompiledPattern, build_regex_from_expression};
use super::lexer::tokenize;
use super::parser::parse;
use crate::errors::{ExpressionError, ExpressionProblem};
use crate::parameter::ParameterTypeRegistry;

fn into_problem(err: ExpressionError) -> ExpressionProblem {
    match err {
        ExpressionError::Syntax(problem) => problem,
        other => panic!("expected a positional problem, got: {other}"),
    }
}

pub(crate) fn tokenize_err(expression: &str) -> ExpressionProblem {
    match tokenize(expression) {
        Ok(_) => panic!("tokenizing {expression:?} should fail"),
        Err(err) => into_problem(err),
    }
}

pub(crate) fn parse_ok(expression: &str) -> Node {
    match parse(expression) {
        Ok(node) => node,
        Err(err) => panic!("expression should parse: {err}"),
    }
}

pub(crate) fn parse_err(expression: &str) -> ExpressionProblem {
    match parse(expression) {
        Ok(_) => panic!("parsing {expression:?} should fail"),
        Err(err) => into_problem(err),
    }
}

pub(crate) fn compile_ok(expression: &str) -> CompiledPattern {
    let registry = ParameterTypeRegistry::new();
    match build_regex_from_expression(expression, &registry) {
        Ok(compiled) => compiled,
        Err(err) => panic!("expression should compile: {err}"),
    }
}

pub(crate) fn compile_err(expression: &str) -> ExpressionProblem {
    let registry = ParameterTypeRegistry::new();
    match build_regex_from_expression(expression, &registry) {
        Ok(_) => panic!("compiling {expression:?} should fail"),
        Err(err) => into_problem(err),
    }
}
