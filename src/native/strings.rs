use super::{expect_number, expect_string, native_error, Builtin, NativeModule};
use crate::{
    interpreter::SystemContext,
    value::{collection::List, error::RuntimeErrorKind, Value},
};
use compact_str::ToCompactString;

pub fn module() -> Value {
    NativeModule::new(
        "strings",
        [
            ("toLower", Builtin::value("toLower", Some(1), to_lower)),
            ("toUpper", Builtin::value("toUpper", Some(1), to_upper)),
            ("ord", Builtin::value("ord", Some(1), ord)),
            ("chr", Builtin::value("chr", Some(1), chr)),
            ("asNumber", Builtin::value("asNumber", Some(1), as_number)),
            ("split", Builtin::value("split", Some(2), split)),
        ],
    )
    .value()
}

fn to_lower(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    Ok(Value::String(expect_string(&arguments[0])?.to_lowercase().into()))
}

fn to_upper(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    Ok(Value::String(expect_string(&arguments[0])?.to_uppercase().into()))
}

/// Code point of the first character.
fn ord(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let text = expect_string(&arguments[0])?;
    let first = text
        .chars()
        .next()
        .ok_or_else(|| native_error("ord expects a non-empty string"))?;
    Ok(Value::Number(u32::from(first) as f64))
}

fn chr(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let code = expect_number(&arguments[0])?;
    let character = char::from_u32(code as u32)
        .ok_or_else(|| native_error(format!("{code} is not a valid code point")))?;
    Ok(Value::String(character.to_compact_string()))
}

/// `nil` when the text is not a number.
fn as_number(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let text = expect_string(&arguments[0])?;
    Ok(text
        .trim()
        .parse::<f64>()
        .map(Value::Number)
        .unwrap_or(Value::Nil))
}

fn split(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let text = expect_string(&arguments[0])?;
    let separator = expect_string(&arguments[1])?;
    let parts = text
        .split(separator.as_str())
        .map(|part| Value::String(part.into()))
        .collect();
    Ok(Value::List(List::new(parts)))
}
