use super::{Class, Value};
use std::fmt::{self, Display, Formatter, Write};

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(value) => f.write_str(value),
            value => write_nested(f, value),
        }
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.super_class {
            Some(super_class) => write!(f, "<class {} extends {}>", self.name, super_class.name),
            None => write!(f, "<class {}>", self.name),
        }
    }
}

/// Strings are quoted once they appear inside a collection.
fn write_nested(f: &mut impl Write, value: &Value) -> fmt::Result {
    match value {
        Value::Nil => f.write_str("<nil>"),
        Value::Bool(value) => write!(f, "{value}"),
        Value::Number(value) => write!(f, "{value}"),
        Value::String(value) => write!(f, "{:?}", value.as_str()),
        Value::List(list) => {
            f.write_char('[')?;
            for (index, element) in list.snapshot().iter().enumerate() {
                if index != 0 {
                    f.write_str(", ")?;
                }
                write_nested(f, element)?;
            }
            f.write_char(']')
        }
        Value::Dict(dict) => {
            f.write_char('{')?;
            for (index, (key, value)) in dict.entries().iter().enumerate() {
                if index != 0 {
                    f.write_str(", ")?;
                }
                write_nested(f, key)?;
                f.write_str(": ")?;
                write_nested(f, value)?;
            }
            f.write_char('}')
        }
        Value::Function(function) => write!(f, "<fn {}>", function.name()),
        Value::NativeFunction(_) => f.write_str("<fn native>"),
        Value::Class(class) => write!(f, "{class}"),
        Value::Instance(instance) => write!(f, "<instance <class {}>>", instance.class.name),
        Value::NativeObject(_) => f.write_str("<instance native>"),
    }
}

