use super::{expect_number, expect_string, native_error, Builtin, NativeModule};
use crate::{
    interpreter::SystemContext,
    value::{
        collection::{Dict, List},
        error::RuntimeErrorKind,
        Value,
    },
};
use std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

pub fn module() -> Value {
    NativeModule::new(
        "io",
        [
            ("println", Builtin::value("println", None, println)),
            ("readFile", Builtin::value("readFile", Some(1), read_file)),
            ("writeFile", Builtin::value("writeFile", Some(2), write_file)),
            ("fileExists", Builtin::value("fileExists", Some(1), file_exists)),
            ("listDir", Builtin::value("listDir", Some(1), list_dir)),
            ("mkdirAll", Builtin::value("mkdirAll", Some(2), mkdir_all)),
            ("clock", Builtin::value("clock", Some(0), clock)),
        ],
    )
    .value()
}

fn println(context: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let line: Vec<String> = arguments.iter().map(Value::to_string).collect();
    context.writeln(&line.join(" "));
    Ok(Value::Nil)
}

fn read_file(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let path = expect_string(&arguments[0])?;
    let text = std::fs::read_to_string(path.as_str()).map_err(native_error)?;
    Ok(Value::String(text.into()))
}

fn write_file(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let path = expect_string(&arguments[0])?;
    let text = expect_string(&arguments[1])?;
    std::fs::write(path.as_str(), text.as_bytes()).map_err(native_error)?;
    Ok(Value::Nil)
}

fn file_exists(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let path = expect_string(&arguments[0])?;
    Ok(Value::Bool(Path::new(path.as_str()).exists()))
}

/// One dict per entry with `name`, `size` and `is_dir`, sorted by name.
fn list_dir(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let path = expect_string(&arguments[0])?;
    let mut entries = std::fs::read_dir(path.as_str())
        .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
        .map_err(native_error)?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        let metadata = entry.metadata().map_err(native_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let file = Dict::from_entries(vec![
            (Value::from("name"), Value::String(name.into())),
            (Value::from("size"), Value::Number(metadata.len() as f64)),
            (Value::from("is_dir"), Value::Bool(metadata.is_dir())),
        ])?;
        files.push(Value::Dict(file));
    }
    Ok(Value::List(List::new(files)))
}

/// Creates a directory and its missing parents. The mode only applies on unix.
fn mkdir_all(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let path = expect_string(&arguments[0])?;
    let mode = expect_number(&arguments[1])?;
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode as u32);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path.as_str()).map_err(native_error)?;
    Ok(Value::Nil)
}

/// Seconds since the Unix epoch.
fn clock(_: &mut dyn SystemContext, _: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(native_error)?;
    Ok(Value::Number(elapsed.as_secs_f64()))
}
