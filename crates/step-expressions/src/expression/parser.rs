//! Recursive-descent parser turning tokens into a syntax tree.
//!
//! Each rule receives the token slice and an explicit cursor and reports how
//! many tokens it consumed. A rule that does not apply consumes nothing.

use crate::errors::{
    ExpressionError, alternation_not_allowed_in_optional, invalid_parameter_type_name_in_node,
    missing_end_token, no_eligible_parsers,
};

use super::ast::{Node, NodeKind, Token, TokenKind};
use super::lexer::tokenize;

#[derive(Debug, Clone, Copy)]
enum Rule {
    Text,
    Name,
    Parameter,
    Optional,
    AlternativeSeparator,
    Alternation,
}

const EXPRESSION_RULES: &[Rule] = &[Rule::Alternation, Rule::Optional, Rule::Parameter, Rule::Text];
const OPTIONAL_RULES: &[Rule] = &[Rule::Optional, Rule::Parameter, Rule::Text];
const PARAMETER_RULES: &[Rule] = &[Rule::Name];
const ALTERNATIVE_RULES: &[Rule] = &[
    Rule::AlternativeSeparator,
    Rule::Optional,
    Rule::Parameter,
    Rule::Text,
];

const LEFT_BOUNDARY: &[TokenKind] = &[
    TokenKind::StartOfLine,
    TokenKind::WhiteSpace,
    TokenKind::EndParameter,
];
const RIGHT_BOUNDARY: &[TokenKind] = &[
    TokenKind::WhiteSpace,
    TokenKind::EndOfLine,
    TokenKind::BeginParameter,
];

/// Outcome of a rule that applied.
struct Parsed {
    consumed: usize,
    node: Node,
}

impl Parsed {
    const fn new(consumed: usize, node: Node) -> Self {
        Self { consumed, node }
    }
}

struct Parser<'a> {
    expression: &'a str,
    tokens: &'a [Token],
}

impl Parser<'_> {
    fn looking_at(&self, position: usize, kind: TokenKind) -> bool {
        // Reading past the stream behaves as end of line.
        self.tokens
            .get(position)
            .map_or(kind == TokenKind::EndOfLine, |token| token.kind == kind)
    }

    fn looking_at_any(&self, position: usize, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|kind| self.looking_at(position, *kind))
    }

    fn start_of(&self, position: usize) -> usize {
        self.tokens
            .get(position)
            .map_or_else(|| self.expression.chars().count(), |token| token.start)
    }

    fn apply(&self, rule: Rule, current: usize) -> Result<Option<Parsed>, ExpressionError> {
        match rule {
            Rule::Text => self.parse_text(current),
            Rule::Name => self.parse_name(current),
            Rule::Parameter => self.parse_between(
                NodeKind::Parameter,
                TokenKind::BeginParameter,
                TokenKind::EndParameter,
                PARAMETER_RULES,
                current,
            ),
            Rule::Optional => self.parse_between(
                NodeKind::Optional,
                TokenKind::BeginOptional,
                TokenKind::EndOptional,
                OPTIONAL_RULES,
                current,
            ),
            Rule::AlternativeSeparator => Ok(self.parse_separator(current)),
            Rule::Alternation => self.parse_alternation(current),
        }
    }

    fn parse_text(&self, current: usize) -> Result<Option<Parsed>, ExpressionError> {
        let Some(token) = self.tokens.get(current) else {
            return Ok(None);
        };
        match token.kind {
            TokenKind::WhiteSpace
            | TokenKind::Text
            | TokenKind::EndParameter
            | TokenKind::EndOptional => Ok(Some(Parsed::new(
                1,
                Node::leaf(NodeKind::Text, token.text.clone(), token.start, token.end),
            ))),
            TokenKind::Alternation => Err(alternation_not_allowed_in_optional(
                self.expression,
                token,
            )),
            TokenKind::StartOfLine
            | TokenKind::EndOfLine
            | TokenKind::BeginOptional
            | TokenKind::BeginParameter => Ok(None),
        }
    }

    fn parse_name(&self, current: usize) -> Result<Option<Parsed>, ExpressionError> {
        let Some(token) = self.tokens.get(current) else {
            return Ok(None);
        };
        match token.kind {
            TokenKind::WhiteSpace | TokenKind::Text => Ok(Some(Parsed::new(
                1,
                Node::leaf(NodeKind::Text, token.text.clone(), token.start, token.end),
            ))),
            TokenKind::BeginOptional
            | TokenKind::EndOptional
            | TokenKind::BeginParameter
            | TokenKind::Alternation => Err(invalid_parameter_type_name_in_node(
                token,
                self.expression,
            )),
            TokenKind::StartOfLine | TokenKind::EndOfLine | TokenKind::EndParameter => Ok(None),
        }
    }

    fn parse_separator(&self, current: usize) -> Option<Parsed> {
        let token = self.tokens.get(current)?;
        (token.kind == TokenKind::Alternation).then(|| {
            Parsed::new(
                1,
                Node::leaf(NodeKind::Alternative, token.text.clone(), token.start, token.end),
            )
        })
    }

    fn parse_between(
        &self,
        kind: NodeKind,
        begin: TokenKind,
        end: TokenKind,
        rules: &[Rule],
        current: usize,
    ) -> Result<Option<Parsed>, ExpressionError> {
        let Some(opening) = self.tokens.get(current).filter(|token| token.kind == begin) else {
            return Ok(None);
        };
        let mut sub = current + 1;
        let (consumed, nodes) = self.parse_tokens_until(rules, sub, &[end, TokenKind::EndOfLine])?;
        sub += consumed;

        let Some(closing) = self.tokens.get(sub).filter(|token| token.kind == end) else {
            return Err(missing_end_token(self.expression, begin, end, opening));
        };
        let node = Node::branch(kind, nodes, opening.start, closing.end);
        Ok(Some(Parsed::new(sub + 1 - current, node)))
    }

    fn parse_alternation(&self, current: usize) -> Result<Option<Parsed>, ExpressionError> {
        let left_bounded = current
            .checked_sub(1)
            .is_none_or(|previous| self.looking_at_any(previous, LEFT_BOUNDARY));
        if !left_bounded {
            return Ok(None);
        }
        let (consumed, nodes) = self.parse_tokens_until(ALTERNATIVE_RULES, current, RIGHT_BOUNDARY)?;
        if !nodes.iter().any(|node| node.kind == NodeKind::Alternative) {
            return Ok(None);
        }
        let start = self.start_of(current);
        let end = self.start_of(current + consumed);
        let alternatives = split_alternatives(start, end, nodes);
        Ok(Some(Parsed::new(
            consumed,
            Node::branch(NodeKind::Alternation, alternatives, start, end),
        )))
    }

    fn parse_token(&self, rules: &[Rule], current: usize) -> Result<Option<Parsed>, ExpressionError> {
        for rule in rules {
            if let Some(parsed) = self.apply(*rule, current)? {
                return Ok(Some(parsed));
            }
        }
        Ok(None)
    }

    fn parse_tokens_until(
        &self,
        rules: &[Rule],
        start_at: usize,
        end_kinds: &[TokenKind],
    ) -> Result<(usize, Vec<Node>), ExpressionError> {
        let mut current = start_at;
        let mut nodes = Vec::new();
        while let Some(token) = self.tokens.get(current) {
            if self.looking_at_any(current, end_kinds) {
                break;
            }
            let Some(parsed) = self.parse_token(rules, current)? else {
                return Err(no_eligible_parsers(self.expression, token));
            };
            current += parsed.consumed;
            nodes.push(parsed.node);
        }
        Ok((current - start_at, nodes))
    }
}

/// Partition `nodes` on separator leaves into alternative branches.
fn split_alternatives(start: usize, end: usize, nodes: Vec<Node>) -> Vec<Node> {
    let mut bounds = vec![start];
    let mut groups: Vec<Vec<Node>> = vec![Vec::new()];
    for node in nodes {
        if node.kind == NodeKind::Alternative {
            bounds.push(node.start);
            bounds.push(node.end);
            groups.push(Vec::new());
        } else if let Some(group) = groups.last_mut() {
            group.push(node);
        }
    }
    bounds.push(end);

    groups
        .into_iter()
        .zip(bounds.chunks_exact(2))
        .map(|(children, span)| {
            let (from, to) = match span {
                [from, to] => (*from, *to),
                _ => (start, end),
            };
            Node::branch(NodeKind::Alternative, children, from, to)
        })
        .collect()
}

/// Parse `expression` into a syntax tree rooted at an expression node.
///
/// # Errors
/// Returns [`ExpressionError::Syntax`] for tokenizer failures, unmatched
/// brackets, alternation inside an optional and demarcation characters in
/// a parameter name.
///
/// # Examples
/// ```
/// use step_expressions::{NodeKind, parse};
///
/// let ast = parse("I have {int} cuke(s)").expect("valid expression");
/// assert_eq!(ast.kind, NodeKind::Expression);
/// assert_eq!(ast.nodes().len(), 8);
/// ```
pub fn parse(expression: &str) -> Result<Node, ExpressionError> {
    let tokens = tokenize(expression)?;
    let parser = Parser {
        expression,
        tokens: &tokens,
    };
    let root = parser.parse_between(
        NodeKind::Expression,
        TokenKind::StartOfLine,
        TokenKind::EndOfLine,
        EXPRESSION_RULES,
        0,
    )?;
    Ok(root.map_or_else(
        || Node::branch(NodeKind::Expression, Vec::new(), 0, 0),
        |parsed| parsed.node,
    ))
}
