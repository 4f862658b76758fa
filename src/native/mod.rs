mod env;
mod import;
mod io;
mod strings;

use crate::{
    config::InterpreterConfig,
    environment::SharedEnvironment,
    interpreter::SystemContext,
    value::{error::RuntimeErrorKind, NativeFunction, NativeObject, Value},
};
use compact_str::CompactString;
use std::{collections::HashMap, sync::Arc};

pub type BuiltinFn = fn(&mut dyn SystemContext, &[Value]) -> Result<Value, RuntimeErrorKind>;

/// A native function backed by a plain function pointer.
pub struct Builtin {
    name: &'static str,
    /// `None` accepts any number of arguments.
    arity: Option<usize>,
    function: BuiltinFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl Builtin {
    pub fn value(name: &'static str, arity: Option<usize>, function: BuiltinFn) -> Value {
        Value::NativeFunction(Arc::new(Self {
            name,
            arity,
            function,
        }))
    }
}

impl NativeFunction for Builtin {
    fn call(
        &self,
        context: &mut dyn SystemContext,
        arguments: &[Value],
    ) -> Result<Value, RuntimeErrorKind> {
        if self.arity.is_some_and(|arity| arity != arguments.len()) {
            return Err(RuntimeErrorKind::InvalidNumberOfArguments);
        }
        (self.function)(context, arguments)
    }
}

/// A read-only bag of named values, such as `io` or an imported module.
#[derive(Debug)]
pub struct NativeModule {
    name: CompactString,
    members: HashMap<CompactString, Value>,
}

impl NativeModule {
    pub fn new<K: Into<CompactString>>(
        name: impl Into<CompactString>,
        members: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(self) -> Value {
        Value::NativeObject(Arc::new(self))
    }
}

impl NativeObject for NativeModule {
    fn get(&self, name: &str) -> Option<Value> {
        self.members.get(name).cloned()
    }
}

/// Installs the native globals into the outermost scope.
pub fn define_globals(environment: &SharedEnvironment, config: &InterpreterConfig) {
    environment.declare("io", io::module());
    environment.declare("strings", strings::module());
    environment.declare("env", env::module());
    environment.declare("type", Builtin::value("type", Some(1), type_of));
    environment.declare("import", import::Import::value(config));
}

fn type_of(_: &mut dyn SystemContext, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
    Ok(Value::from(arguments[0].type_name()))
}

fn expect_string(value: &Value) -> Result<&CompactString, RuntimeErrorKind> {
    match value {
        Value::String(value) => Ok(value),
        _ => Err(RuntimeErrorKind::ExpectedString),
    }
}

fn expect_number(value: &Value) -> Result<f64, RuntimeErrorKind> {
    match value {
        Value::Number(value) => Ok(*value),
        _ => Err(RuntimeErrorKind::ExpectedNumber),
    }
}

fn native_error(error: impl std::fmt::Display) -> RuntimeErrorKind {
    RuntimeErrorKind::Native(compact_str::format_compact!("{error}"))
}
