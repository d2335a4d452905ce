//! Built-in parameter types registered with every registry.

use std::str::FromStr;

use super::{ParameterType, TransformError, Value, first_as_string};

/// Signed and unsigned integer forms shared by `int`, `byte`, `short` and
/// `long`.
pub const INTEGER_PATTERNS: [&str; 2] = [r"-?\d+", r"\d+"];

/// Decimal number with optional sign, fraction and exponent, shared by
/// `float` and `double`. Only an upper-case `E` introduces the exponent.
pub const FLOAT_PATTERN: &str = r"[-+]?(?:\d+(?:\.\d+)?|\.\d+)(?:E[-+]?\d+)?";

/// A run of non-whitespace.
pub const WORD_PATTERN: &str = r"[^\s]+";

/// Double- and single-quoted strings with backslash escapes.
pub const STRING_PATTERNS: [&str; 2] = [
    r#""([^"\\]*(\\.[^"\\]*)*)""#,
    r"'([^'\\]*(\\.[^'\\]*)*)'",
];

/// Anything at all.
pub const ANONYMOUS_PATTERN: &str = ".*";

fn parse_first<T>(values: &[Option<&str>], wrap: fn(T) -> Value) -> Result<Value, TransformError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match values.first().copied().flatten() {
        Some(text) => Ok(wrap(text.parse::<T>()?)),
        None => Ok(Value::Nil),
    }
}

/// The quote style that matched wins; its escaped quotes are restored.
fn unquote(values: &[Option<&str>]) -> Result<Value, TransformError> {
    let matched = values.iter().copied().flatten().next();
    Ok(matched.map_or(Value::Nil, |text| {
        Value::Str(text.replace("\\\"", "\"").replace("\\'", "'"))
    }))
}

type BuiltinTransform = fn(&[Option<&str>]) -> Result<Value, TransformError>;

fn integer(name: &str, value_type: &str, transform: BuiltinTransform) -> ParameterType {
    ParameterType::unchecked(name, INTEGER_PATTERNS, value_type, transform)
        .with_use_for_snippets(false)
}

fn float(name: &str, value_type: &str, transform: BuiltinTransform) -> ParameterType {
    ParameterType::unchecked(name, [FLOAT_PATTERN], value_type, transform)
        .with_use_for_snippets(false)
}

/// Built-in types in registration order.
pub(crate) fn parameter_types() -> Vec<ParameterType> {
    vec![
        integer("int", "i32", |v| parse_first(v, Value::I32))
            .with_use_for_snippets(true)
            .with_prefer_for_regexp_match(true),
        integer("byte", "i8", |v| parse_first(v, Value::I8)),
        integer("short", "i16", |v| parse_first(v, Value::I16)),
        integer("long", "i64", |v| parse_first(v, Value::I64)),
        float("float", "f32", |v| parse_first(v, Value::F32)).with_use_for_snippets(true),
        float("double", "f64", |v| parse_first(v, Value::F64)),
        ParameterType::unchecked("word", [WORD_PATTERN], "String", first_as_string)
            .with_use_for_snippets(false),
        ParameterType::unchecked("string", STRING_PATTERNS, "String", unquote),
        ParameterType::unchecked("", [ANONYMOUS_PATTERN], "String", first_as_string)
            .with_use_for_snippets(false)
            .with_prefer_for_regexp_match(true),
    ]
}
