//! Tokens and syntax-tree nodes produced by the lexer and parser.
//!
//! Spans are character offsets into the expression so error pointers line
//! up with what the author typed.

#[cfg(feature = "diagnostics")]
use serde::Serialize;

pub(crate) const ESCAPE: char = '\\';
pub(crate) const ALTERNATION: char = '/';
pub(crate) const BEGIN_PARAMETER: char = '{';
pub(crate) const END_PARAMETER: char = '}';
pub(crate) const BEGIN_OPTIONAL: char = '(';
pub(crate) const END_OPTIONAL: char = ')';

/// Anything that occupies a span of the expression text.
pub trait Located {
    /// Zero-based character offset of the first character.
    fn start(&self) -> usize;
    /// Zero-based character offset one past the last character.
    fn end(&self) -> usize;
}

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
#[cfg_attr(feature = "diagnostics", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TokenKind {
    /// Virtual token opening every stream.
    StartOfLine,
    /// Virtual token closing every stream.
    EndOfLine,
    /// A run of whitespace.
    WhiteSpace,
    /// `(`
    BeginOptional,
    /// `)`
    EndOptional,
    /// `{`
    BeginParameter,
    /// `}`
    EndParameter,
    /// `/`
    Alternation,
    /// A run of literal characters, escaped characters included.
    Text,
}

impl TokenKind {
    /// Classify an unescaped character.
    #[must_use]
    pub fn of(ch: char) -> Self {
        match ch {
            BEGIN_OPTIONAL => Self::BeginOptional,
            END_OPTIONAL => Self::EndOptional,
            BEGIN_PARAMETER => Self::BeginParameter,
            END_PARAMETER => Self::EndParameter,
            ALTERNATION => Self::Alternation,
            c if c.is_whitespace() => Self::WhiteSpace,
            _ => Self::Text,
        }
    }

    /// Whether `ch` may follow a backslash.
    #[must_use]
    pub fn can_escape(ch: char) -> bool {
        ch.is_whitespace()
            || matches!(
                ch,
                ESCAPE
                    | ALTERNATION
                    | BEGIN_PARAMETER
                    | END_PARAMETER
                    | BEGIN_OPTIONAL
                    | END_OPTIONAL
            )
    }

    /// The character this kind stands for, or `""` for multi-character and
    /// virtual kinds.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BeginOptional => "(",
            Self::EndOptional => ")",
            Self::BeginParameter => "{",
            Self::EndParameter => "}",
            Self::Alternation => "/",
            Self::StartOfLine | Self::EndOfLine | Self::WhiteSpace | Self::Text => "",
        }
    }

    /// Human description used in "missing end token" suggestions.
    #[must_use]
    pub const fn purpose(self) -> &'static str {
        match self {
            Self::BeginOptional | Self::EndOptional => "optional text",
            Self::BeginParameter | Self::EndParameter => "a parameter",
            Self::Alternation => "alternation",
            Self::StartOfLine | Self::EndOfLine | Self::WhiteSpace | Self::Text => "",
        }
    }
}

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub struct Token {
    /// Token category.
    #[cfg_attr(feature = "diagnostics", serde(rename = "type"))]
    pub kind: TokenKind,
    /// Text with escapes removed.
    pub text: String,
    /// Start offset in characters.
    pub start: usize,
    /// End offset in characters, escapes included.
    pub end: usize,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
        }
    }
}

impl Located for Token {
    fn start(&self) -> usize {
        self.start
    }

    fn end(&self) -> usize {
        self.end
    }
}

/// Syntactic category of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub enum NodeKind {
    /// Literal text.
    #[cfg_attr(feature = "diagnostics", serde(rename = "TEXT_NODE"))]
    Text,
    /// `( ... )`
    #[cfg_attr(feature = "diagnostics", serde(rename = "OPTIONAL_NODE"))]
    Optional,
    /// A run of `/`-separated alternatives.
    #[cfg_attr(feature = "diagnostics", serde(rename = "ALTERNATION_NODE"))]
    Alternation,
    /// One branch of an alternation.
    #[cfg_attr(feature = "diagnostics", serde(rename = "ALTERNATIVE_NODE"))]
    Alternative,
    /// `{ ... }`
    #[cfg_attr(feature = "diagnostics", serde(rename = "PARAMETER_NODE"))]
    Parameter,
    /// The root.
    #[cfg_attr(feature = "diagnostics", serde(rename = "EXPRESSION_NODE"))]
    Expression,
}

/// Payload of a [`Node`]: a literal token or child nodes, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
#[cfg_attr(feature = "diagnostics", serde(rename_all = "lowercase"))]
pub enum NodeBody {
    /// Literal text of a leaf.
    Token(String),
    /// Ordered children of a branch.
    Nodes(Vec<Node>),
}

/// A syntax-tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub struct Node {
    /// Node category.
    #[cfg_attr(feature = "diagnostics", serde(rename = "type"))]
    pub kind: NodeKind,
    /// Token text or children.
    #[cfg_attr(feature = "diagnostics", serde(flatten))]
    pub body: NodeBody,
    /// Start offset in characters.
    pub start: usize,
    /// End offset in characters.
    pub end: usize,
}

impl Node {
    pub(crate) fn leaf(kind: NodeKind, token: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            body: NodeBody::Token(token.into()),
            start,
            end,
        }
    }

    pub(crate) fn branch(kind: NodeKind, nodes: Vec<Self>, start: usize, end: usize) -> Self {
        Self {
            kind,
            body: NodeBody::Nodes(nodes),
            start,
            end,
        }
    }

    /// Children of a branch; empty for a leaf.
    #[must_use]
    pub fn nodes(&self) -> &[Self] {
        match &self.body {
            NodeBody::Nodes(nodes) => nodes,
            NodeBody::Token(_) => &[],
        }
    }

    /// Literal text of a leaf.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match &self.body {
            NodeBody::Token(token) => Some(token),
            NodeBody::Nodes(_) => None,
        }
    }

    /// The token of a leaf, or the concatenated text of all descendants.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.body {
            NodeBody::Token(token) => token.clone(),
            NodeBody::Nodes(nodes) => nodes.iter().map(Self::text).collect(),
        }
    }
}

impl Located for Node {
    fn start(&self) -> usize {
        self.start
    }

    fn end(&self) -> usize {
        self.end
    }
}
