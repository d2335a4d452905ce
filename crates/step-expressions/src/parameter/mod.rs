//! Parameter types: named bindings of regex fragments to value transformers.

mod builtin;
mod registry;

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::errors::ExpressionError;

pub use builtin::{
    ANONYMOUS_PATTERN, FLOAT_PATTERN, INTEGER_PATTERNS, STRING_PATTERNS, WORD_PATTERN,
};
pub use registry::ParameterTypeRegistry;

/// Failure raised by a transformer, surfaced untouched by
/// [`Argument::value`](crate::Argument::value).
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Signature of a value transformer: captured group values in, value out.
pub type Transformer = dyn Fn(&[Option<&str>]) -> Result<Value, TransformError> + Send + Sync;

/// Characters a declared parameter type name may not contain.
const ILLEGAL_NAME_CHARACTERS: &[char] = &[
    '[', ']', '(', ')', '$', '.', '|', '?', '*', '+', '{', '}', '\\', '/',
];

/// A value produced by a transformer.
///
/// The built-in types produce the primitive variants; custom types may wrap
/// anything in [`Value::Custom`].
#[derive(Clone)]
pub enum Value {
    /// The group did not participate in the match.
    Nil,
    /// `byte`
    I8(i8),
    /// `short`
    I16(i16),
    /// `int`
    I32(i32),
    /// `long`
    I64(i64),
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
    /// `word`, `string` and untyped captures.
    Str(String),
    /// A caller-defined value.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wrap a caller-defined value.
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// Integer variants widened to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Float variants widened to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// The string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this is [`Value::Nil`].
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Borrow a custom payload as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("Nil"),
            Self::I8(v) => f.debug_tuple("I8").field(v).finish(),
            Self::I16(v) => f.debug_tuple("I16").field(v).finish(),
            Self::I32(v) => f.debug_tuple("I32").field(v).finish(),
            Self::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Self::F32(v) => f.debug_tuple("F32").field(v).finish(),
            Self::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

/// A named binding of one or more regex fragments to a transformer.
///
/// # Examples
/// ```
/// use step_expressions::{ParameterType, Value};
///
/// let colour = ParameterType::new("colour", ["red|blue|yellow"], "Colour", |values| {
///     Ok(values.first().copied().flatten().map_or(Value::Nil, Value::from))
/// })
/// .expect("valid name")
/// .with_use_for_snippets(false);
/// assert_eq!(colour.name(), "colour");
/// assert!(!colour.use_for_snippets());
/// ```
pub struct ParameterType {
    name: String,
    patterns: Vec<String>,
    value_type: String,
    transformer: Box<Transformer>,
    use_for_snippets: bool,
    prefer_for_regexp_match: bool,
}

impl ParameterType {
    /// Create a parameter type that is used for snippets and is not
    /// preferential.
    ///
    /// An empty `name` denotes the anonymous parameter type.
    ///
    /// # Errors
    /// Returns [`ExpressionError::InvalidParameterTypeName`] when `name`
    /// contains a regex or expression metacharacter.
    pub fn new<I, S, F>(
        name: impl Into<String>,
        patterns: I,
        value_type: impl Into<String>,
        transformer: F,
    ) -> Result<Self, ExpressionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Option<&str>]) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(ExpressionError::InvalidParameterTypeName(name));
        }
        Ok(Self::unchecked(name, patterns, value_type, transformer))
    }

    pub(crate) fn unchecked<I, S, F>(
        name: impl Into<String>,
        patterns: I,
        value_type: impl Into<String>,
        transformer: F,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Option<&str>]) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            value_type: value_type.into(),
            transformer: Box::new(transformer),
            use_for_snippets: true,
            prefer_for_regexp_match: false,
        }
    }

    /// Pass-through type for a regex capture group no registered type owns.
    pub(crate) fn untyped(name: Option<&str>, pattern: &str) -> Self {
        Self::unchecked(name.unwrap_or_default(), [pattern], "String", first_as_string)
            .with_use_for_snippets(false)
    }

    /// Set whether the generator may suggest this type.
    #[must_use]
    pub fn with_use_for_snippets(mut self, use_for_snippets: bool) -> Self {
        self.use_for_snippets = use_for_snippets;
        self
    }

    /// Set whether this type wins when several share a pattern.
    #[must_use]
    pub fn with_prefer_for_regexp_match(mut self, prefer: bool) -> Self {
        self.prefer_for_regexp_match = prefer;
        self
    }

    /// The type name; empty for the anonymous type.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the anonymous type.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Regex sources, in declaration order.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Tag describing the produced value.
    #[must_use]
    pub fn value_type(&self) -> &str {
        &self.value_type
    }

    /// Whether the generator may suggest this type.
    #[must_use]
    pub const fn use_for_snippets(&self) -> bool {
        self.use_for_snippets
    }

    /// Whether this type wins when several share a pattern.
    #[must_use]
    pub const fn prefer_for_regexp_match(&self) -> bool {
        self.prefer_for_regexp_match
    }

    /// Run the transformer over captured values.
    ///
    /// # Errors
    /// Propagates whatever the transformer returns.
    pub fn transform(&self, values: &[Option<&str>]) -> Result<Value, TransformError> {
        (self.transformer)(values)
    }

    /// Ranking used by the registry and the generator: preferential types
    /// first, then shorter names. Anything else ties.
    #[must_use]
    pub fn compare(a: &Self, b: &Self) -> Ordering {
        b.prefer_for_regexp_match
            .cmp(&a.prefer_for_regexp_match)
            .then_with(|| a.name.chars().count().cmp(&b.name.chars().count()))
    }
}

impl fmt::Debug for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterType")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .field("value_type", &self.value_type)
            .field("use_for_snippets", &self.use_for_snippets)
            .field("prefer_for_regexp_match", &self.prefer_for_regexp_match)
            .finish_non_exhaustive()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.contains(ILLEGAL_NAME_CHARACTERS)
}

pub(crate) fn first_as_string(values: &[Option<&str>]) -> Result<Value, TransformError> {
    Ok(values.first().copied().flatten().map_or(Value::Nil, Value::from))
}
