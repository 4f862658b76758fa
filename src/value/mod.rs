pub mod collection;
pub mod error;
pub mod formatter;
pub mod operator;

use crate::{
    environment::SharedEnvironment,
    interpreter::SystemContext,
    parser::statement::FunctionDecl,
};
use collection::{Dict, List};
use compact_str::CompactString;
use error::RuntimeErrorKind;
use operator::Operator;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// A function implemented by the host.
pub trait NativeFunction: std::fmt::Debug + Send + Sync {
    fn call(
        &self,
        context: &mut dyn SystemContext,
        arguments: &[Value],
    ) -> Result<Value, RuntimeErrorKind>;
}

/// A property bag implemented by the host, such as a native module.
pub trait NativeObject: std::fmt::Debug + Send + Sync {
    fn get(&self, name: &str) -> Option<Value>;

    fn set(&self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        let _ = (name, value);
        Err(RuntimeErrorKind::ReadOnly)
    }

    fn get_operator(&self, operator: Operator) -> Option<Value> {
        let _ = operator;
        None
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub declaration: Arc<FunctionDecl>,
    pub closure: SharedEnvironment,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(
        declaration: Arc<FunctionDecl>,
        closure: SharedEnvironment,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        self.declaration
            .name
            .as_ref()
            .map(|name| name.lexeme.as_str())
            .unwrap_or("anonymous")
    }

    pub fn arity(&self) -> usize {
        self.declaration.parameters.len()
    }

    /// A copy of the method whose closure defines `this` as the given instance.
    pub fn bind(&self, instance: Arc<Instance>) -> Function {
        let closure = self.closure.new_scope();
        closure.declare("this", Value::Instance(instance));
        Function {
            declaration: self.declaration.clone(),
            closure,
            is_initializer: self.is_initializer,
        }
    }
}

#[derive(Debug)]
pub struct Class {
    pub name: CompactString,
    pub super_class: Option<Arc<Class>>,
    pub methods: HashMap<CompactString, Arc<Function>>,
    pub static_methods: HashMap<CompactString, Arc<Function>>,
}

impl Class {
    /// Looks the method up on this class, then on its ancestors.
    pub fn find_method(&self, name: &str) -> Option<Arc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }
        self.super_class
            .as_ref()
            .and_then(|super_class| super_class.find_method(name))
    }
}

pub struct Instance {
    pub class: Arc<Class>,
    pub fields: Mutex<HashMap<CompactString, Value>>,
}

impl Instance {
    pub fn new(class: Arc<Class>) -> Self {
        Self {
            class,
            fields: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.lock().get(name).cloned()
    }

    pub fn set_field(&self, name: &str, value: Value) {
        self.fields.lock().insert(name.into(), value);
    }
}

// Fields can hold the instance itself.
impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(CompactString),
    List(List),
    Dict(Dict),
    Function(Arc<Function>),
    Class(Arc<Class>),
    Instance(Arc<Instance>),
    NativeFunction(Arc<dyn NativeFunction>),
    NativeObject(Arc<dyn NativeObject>),
}

impl Value {
    /// `nil`, `false`, the empty string and zero are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil | Value::Bool(false) => false,
            Value::Number(value) => *value != 0.0,
            Value::String(value) => !value.is_empty(),
            _ => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Function(_) | Value::NativeFunction(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) | Value::NativeObject(_) => "object",
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<CompactString> for Value {
    fn from(value: CompactString) -> Self {
        Value::String(value)
    }
}
