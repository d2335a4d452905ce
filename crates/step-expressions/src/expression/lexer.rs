//! Lexer converting expression strings into a token stream.

use crate::errors::{ExpressionError, cant_escape, end_of_line_cannot_be_escaped};

use super::ast::{ESCAPE, Token, TokenKind};

/// Pending run of characters waiting to become a token.
#[derive(Default)]
struct Buffer {
    text: String,
    chars: usize,
    start: usize,
    escaped: usize,
}

impl Buffer {
    fn flush(&mut self, kind: TokenKind) -> Token {
        let escaped = if kind == TokenKind::Text {
            std::mem::take(&mut self.escaped)
        } else {
            0
        };
        let end = self.start + self.chars + escaped;
        let token = Token::new(kind, std::mem::take(&mut self.text), self.start, end);
        self.start = end;
        self.chars = 0;
        token
    }

    fn push(&mut self, ch: char) {
        self.text.push(ch);
        self.chars += 1;
    }
}

/// Whitespace and text runs merge; every other kind gets its own token.
fn starts_new_token(previous: TokenKind, current: TokenKind) -> bool {
    current != previous || !matches!(current, TokenKind::WhiteSpace | TokenKind::Text)
}

/// Split `expression` into tokens bracketed by start- and end-of-line.
///
/// # Errors
/// Returns [`ExpressionError::Syntax`] when a backslash precedes a character
/// that cannot be escaped or ends the expression.
///
/// # Examples
/// ```
/// use step_expressions::{TokenKind, tokenize};
///
/// let tokens = tokenize("three (blind)").expect("valid expression");
/// let kinds: Vec<_> = tokens.iter().map(|token| token.kind).collect();
/// assert_eq!(
///     kinds,
///     [
///         TokenKind::StartOfLine,
///         TokenKind::Text,
///         TokenKind::WhiteSpace,
///         TokenKind::BeginOptional,
///         TokenKind::Text,
///         TokenKind::EndOptional,
///         TokenKind::EndOfLine,
///     ]
/// );
/// ```
pub fn tokenize(expression: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut buffer = Buffer::default();
    let mut previous = TokenKind::StartOfLine;
    let mut treat_as_text = false;
    let mut length = 0;

    for ch in expression.chars() {
        length += 1;
        if !treat_as_text && ch == ESCAPE {
            buffer.escaped += 1;
            treat_as_text = true;
            continue;
        }
        let current = if !treat_as_text {
            TokenKind::of(ch)
        } else if TokenKind::can_escape(ch) {
            TokenKind::Text
        } else {
            let index = buffer.start + buffer.chars + buffer.escaped;
            return Err(cant_escape(expression, index));
        };
        treat_as_text = false;

        if starts_new_token(previous, current) {
            tokens.push(buffer.flush(previous));
        }
        previous = current;
        buffer.push(ch);
    }

    if treat_as_text {
        return Err(end_of_line_cannot_be_escaped(expression));
    }
    if buffer.chars > 0 || tokens.is_empty() {
        tokens.push(buffer.flush(previous));
    }
    tokens.push(Token::new(TokenKind::EndOfLine, "", length, length));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProblemKind;
    use crate::expression::test_support::tokenize_err;
    use rstest::rstest;

    #[expect(clippy::expect_used, reason = "tests require valid token streams")]
    fn lex(expression: &str) -> Vec<(TokenKind, String, usize, usize)> {
        tokenize(expression)
            .expect("expression should tokenize")
            .into_iter()
            .map(|token| (token.kind, token.text, token.start, token.end))
            .collect()
    }

    fn t(kind: TokenKind, text: &str, start: usize, end: usize) -> (TokenKind, String, usize, usize) {
        (kind, text.to_owned(), start, end)
    }

    #[test]
    fn empty_expression_is_bracketed() {
        assert_eq!(
            lex(""),
            vec![
                t(TokenKind::StartOfLine, "", 0, 0),
                t(TokenKind::EndOfLine, "", 0, 0),
            ]
        );
    }

    #[test]
    fn merges_text_and_whitespace_runs() {
        assert_eq!(
            lex("three  blind"),
            vec![
                t(TokenKind::StartOfLine, "", 0, 0),
                t(TokenKind::Text, "three", 0, 5),
                t(TokenKind::WhiteSpace, "  ", 5, 7),
                t(TokenKind::Text, "blind", 7, 12),
                t(TokenKind::EndOfLine, "", 12, 12),
            ]
        );
    }

    #[test]
    fn demarcation_characters_never_merge() {
        assert_eq!(
            lex("(("),
            vec![
                t(TokenKind::StartOfLine, "", 0, 0),
                t(TokenKind::BeginOptional, "(", 0, 1),
                t(TokenKind::BeginOptional, "(", 1, 2),
                t(TokenKind::EndOfLine, "", 2, 2),
            ]
        );
    }

    #[test]
    fn tokenizes_alternation_and_parameter() {
        assert_eq!(
            lex("cat/dog {int}"),
            vec![
                t(TokenKind::StartOfLine, "", 0, 0),
                t(TokenKind::Text, "cat", 0, 3),
                t(TokenKind::Alternation, "/", 3, 4),
                t(TokenKind::Text, "dog", 4, 7),
                t(TokenKind::WhiteSpace, " ", 7, 8),
                t(TokenKind::BeginParameter, "{", 8, 9),
                t(TokenKind::Text, "int", 9, 12),
                t(TokenKind::EndParameter, "}", 12, 13),
                t(TokenKind::EndOfLine, "", 13, 13),
            ]
        );
    }

    #[test]
    fn escaped_characters_join_text_and_widen_span() {
        assert_eq!(
            lex("\\(blind\\)"),
            vec![
                t(TokenKind::StartOfLine, "", 0, 0),
                t(TokenKind::Text, "(blind)", 0, 9),
                t(TokenKind::EndOfLine, "", 9, 9),
            ]
        );
    }

    #[test]
    fn escaped_whitespace_is_text() {
        assert_eq!(
            lex("a\\ b"),
            vec![
                t(TokenKind::StartOfLine, "", 0, 0),
                t(TokenKind::Text, "a b", 0, 4),
                t(TokenKind::EndOfLine, "", 4, 4),
            ]
        );
    }

    #[test]
    fn escaped_backslash_is_text() {
        assert_eq!(
            lex("\\\\"),
            vec![
                t(TokenKind::StartOfLine, "", 0, 0),
                t(TokenKind::Text, "\\", 0, 2),
                t(TokenKind::EndOfLine, "", 2, 2),
            ]
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(
            lex("42° x"),
            vec![
                t(TokenKind::StartOfLine, "", 0, 0),
                t(TokenKind::Text, "42°", 0, 3),
                t(TokenKind::WhiteSpace, " ", 3, 4),
                t(TokenKind::Text, "x", 4, 5),
                t(TokenKind::EndOfLine, "", 5, 5),
            ]
        );
    }

    #[rstest]
    #[case("\\[", 1)]
    #[case("ab\\x", 3)]
    #[case("a \\d", 3)]
    fn rejects_unescapable_characters(#[case] expression: &str, #[case] index: usize) {
        let problem = tokenize_err(expression);
        assert_eq!(problem.kind, ProblemKind::CantEscape);
        assert_eq!(problem.index(), index);
    }

    #[rstest]
    #[case("\\", 0)]
    #[case("three\\", 5)]
    fn rejects_trailing_escape(#[case] expression: &str, #[case] index: usize) {
        let problem = tokenize_err(expression);
        assert_eq!(problem.kind, ProblemKind::EndOfLineCannotBeEscaped);
        assert_eq!(problem.index(), index);
    }
}
