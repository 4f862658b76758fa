use super::{expect_string, native_error, Builtin, NativeModule};
use crate::{
    interpreter::SystemContext,
    value::{error::RuntimeErrorKind, Value},
};

pub fn module() -> Value {
    NativeModule::new(
        "env",
        [
            ("get", Builtin::value("get", Some(1), get)),
            ("set", Builtin::value("set", Some(2), set)),
        ],
    )
    .value()
}

/// `nil` when the variable is unset or not unicode.
fn get(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let name = expect_string(&arguments[0])?;
    Ok(std::env::var(name.as_str())
        .map(|value| Value::String(value.into()))
        .unwrap_or(Value::Nil))
}

fn set(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let name = expect_string(&arguments[0])?;
    let value = expect_string(&arguments[1])?;
    if name.is_empty() || name.contains(['=', '\0']) {
        return Err(native_error(format_args!("invalid environment variable name {name:?}")));
    }
    if value.contains('\0') {
        return Err(native_error(format_args!("invalid value for environment variable {name}")));
    }
    std::env::set_var(name.as_str(), value.as_str());
    Ok(Value::Nil)
}
