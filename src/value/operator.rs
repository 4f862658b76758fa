use super::{error::RuntimeErrorKind, Value};
use crate::lexer::TokenKind;
use compact_str::CompactString;

/// Operator tags. An instance overloads an operator by defining a method with its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Div,
    Mod,
    Mul,
    Pow,
    Neg,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Operator {
    pub fn method_name(&self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Sub => "sub",
            Operator::Div => "div",
            Operator::Mod => "mod",
            Operator::Mul => "mul",
            Operator::Pow => "pow",
            Operator::Neg => "neg",
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
        }
    }

    pub fn from_binary(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Operator::Add),
            TokenKind::Minus => Some(Operator::Sub),
            TokenKind::Slash => Some(Operator::Div),
            TokenKind::Percent => Some(Operator::Mod),
            TokenKind::Star => Some(Operator::Mul),
            TokenKind::Caret => Some(Operator::Pow),
            TokenKind::EqualEqual => Some(Operator::Eq),
            TokenKind::BangEqual => Some(Operator::Neq),
            TokenKind::LessThan => Some(Operator::Lt),
            TokenKind::LessThanEqual => Some(Operator::Lte),
            TokenKind::GreaterThan => Some(Operator::Gt),
            TokenKind::GreaterThanEqual => Some(Operator::Gte),
            _ => None,
        }
    }
}

/// The outcome of an operator lookup: either a value, or a callable that produces it.
#[derive(Debug)]
pub enum Dispatch {
    Resolved(Value),
    Call { callee: Value, arguments: Vec<Value> },
}

pub fn binary(operator: Operator, lhs: &Value, rhs: &Value) -> Result<Dispatch, RuntimeErrorKind> {
    if matches!(lhs, Value::Nil) || matches!(rhs, Value::Nil) {
        let both_nil = matches!(lhs, Value::Nil) && matches!(rhs, Value::Nil);
        return match operator {
            Operator::Eq => Ok(Dispatch::Resolved(Value::Bool(both_nil))),
            Operator::Neq => Ok(Dispatch::Resolved(Value::Bool(!both_nil))),
            _ => Err(RuntimeErrorKind::UndefinedOperation),
        };
    }

    let value = match lhs {
        Value::Number(lhs) => number(operator, *lhs, rhs)?,
        Value::String(lhs) => string(operator, lhs, rhs)?,
        Value::List(lhs) => {
            if !matches!(operator, Operator::Add | Operator::Sub | Operator::Eq | Operator::Neq) {
                return Err(RuntimeErrorKind::UndefinedOperation);
            }
            let Value::List(rhs) = rhs else {
                return Err(RuntimeErrorKind::ExpectedList);
            };
            match operator {
                Operator::Add => Value::List(lhs.concat(rhs)),
                Operator::Sub => Value::List(lhs.difference(rhs)),
                Operator::Eq => Value::Bool(lhs.ptr_eq(rhs)),
                _ => Value::Bool(!lhs.ptr_eq(rhs)),
            }
        }
        Value::Dict(lhs) => {
            if !matches!(operator, Operator::Add | Operator::Eq | Operator::Neq) {
                return Err(RuntimeErrorKind::UndefinedOperation);
            }
            let Value::Dict(rhs) = rhs else {
                return Err(RuntimeErrorKind::ExpectedDict);
            };
            match operator {
                Operator::Add => Value::Dict(lhs.union(rhs)),
                Operator::Eq => Value::Bool(lhs.ptr_eq(rhs)),
                _ => Value::Bool(!lhs.ptr_eq(rhs)),
            }
        }
        Value::Instance(instance) => {
            return overloaded(instance, operator, vec![rhs.clone()]);
        }
        Value::NativeObject(object) => {
            let callee = object
                .get_operator(operator)
                .ok_or(RuntimeErrorKind::UndefinedOperation)?;
            return Ok(Dispatch::Call {
                callee,
                arguments: vec![rhs.clone()],
            });
        }
        Value::Nil
        | Value::Bool(_)
        | Value::Function(_)
        | Value::Class(_)
        | Value::NativeFunction(_) => return Err(RuntimeErrorKind::UndefinedOperation),
    };
    Ok(Dispatch::Resolved(value))
}

pub fn unary(operator: Operator, operand: &Value) -> Result<Dispatch, RuntimeErrorKind> {
    match (operator, operand) {
        (Operator::Neg, Value::Number(value)) => Ok(Dispatch::Resolved(Value::Number(-value))),
        (Operator::Neg, Value::List(list)) => Ok(Dispatch::Resolved(Value::List(list.unique()))),
        (_, Value::Instance(instance)) => overloaded(instance, operator, Vec::new()),
        (_, Value::NativeObject(object)) => {
            let callee = object
                .get_operator(operator)
                .ok_or(RuntimeErrorKind::UndefinedOperation)?;
            Ok(Dispatch::Call {
                callee,
                arguments: Vec::new(),
            })
        }
        _ => Err(RuntimeErrorKind::UndefinedOperation),
    }
}

fn overloaded(
    instance: &std::sync::Arc<super::Instance>,
    operator: Operator,
    arguments: Vec<Value>,
) -> Result<Dispatch, RuntimeErrorKind> {
    let method = instance
        .class
        .find_method(operator.method_name())
        .ok_or(RuntimeErrorKind::UndefinedOperator)?;
    Ok(Dispatch::Call {
        callee: Value::Function(std::sync::Arc::new(method.bind(instance.clone()))),
        arguments,
    })
}

fn number(operator: Operator, lhs: f64, rhs: &Value) -> Result<Value, RuntimeErrorKind> {
    let Value::Number(rhs) = rhs else {
        return Err(RuntimeErrorKind::ExpectedNumber);
    };
    let rhs = *rhs;
    let value = match operator {
        Operator::Add => Value::Number(lhs + rhs),
        Operator::Sub => Value::Number(lhs - rhs),
        Operator::Div => Value::Number(lhs / rhs),
        Operator::Mod => Value::Number(lhs % rhs),
        Operator::Mul => Value::Number(lhs * rhs),
        Operator::Pow => Value::Number(lhs.powf(rhs)),
        Operator::Eq => Value::Bool(lhs == rhs),
        Operator::Neq => Value::Bool(lhs != rhs),
        Operator::Lt => Value::Bool(lhs < rhs),
        Operator::Lte => Value::Bool(lhs <= rhs),
        Operator::Gt => Value::Bool(lhs > rhs),
        Operator::Gte => Value::Bool(lhs >= rhs),
        Operator::Neg => return Err(RuntimeErrorKind::UndefinedOperation),
    };
    Ok(value)
}

fn string(operator: Operator, lhs: &CompactString, rhs: &Value) -> Result<Value, RuntimeErrorKind> {
    if matches!(
        operator,
        Operator::Sub | Operator::Div | Operator::Mod | Operator::Mul | Operator::Pow | Operator::Neg
    ) {
        return Err(RuntimeErrorKind::UndefinedOperation);
    }
    let Value::String(rhs) = rhs else {
        return Err(RuntimeErrorKind::ExpectedString);
    };
    let value = match operator {
        Operator::Add => {
            let mut joined = lhs.clone();
            joined.push_str(rhs);
            Value::String(joined)
        }
        Operator::Eq => Value::Bool(lhs == rhs),
        Operator::Neq => Value::Bool(lhs != rhs),
        Operator::Lt => Value::Bool(lhs < rhs),
        Operator::Lte => Value::Bool(lhs <= rhs),
        Operator::Gt => Value::Bool(lhs > rhs),
        _ => Value::Bool(lhs >= rhs),
    };
    Ok(value)
}
