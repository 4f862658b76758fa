use super::statement::FunctionDecl;
use crate::lexer::Token;
use compact_str::CompactString;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(CompactString),
    Bool(bool),
    Nil,
}

/// An indexing or slicing suffix: `object[first:second:third]`, any part omittable.
#[derive(Debug, Clone, PartialEq)]
pub struct Access {
    pub object: Box<Expression>,
    pub bracket: Token,
    pub first: Option<Box<Expression>>,
    pub first_colon: Option<Token>,
    pub second: Option<Box<Expression>>,
    pub second_colon: Option<Token>,
    pub third: Option<Box<Expression>>,
}

impl Access {
    /// A single index with no colons selects one element instead of a range.
    pub fn is_index(&self) -> bool {
        self.first_colon.is_none() && self.second_colon.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    List {
        elements: Vec<Expression>,
        bracket: Token,
    },
    Dict {
        entries: Vec<(Expression, Expression)>,
        brace: Token,
    },
    Assign {
        name: Token,
        value: Box<Expression>,
        access: Option<Access>,
    },
    Access(Access),
    Binary {
        left: Box<Expression>,
        operator: Token,
        right: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        paren: Token,
        arguments: Vec<Expression>,
    },
    Get {
        object: Box<Expression>,
        name: Token,
    },
    Set {
        object: Box<Expression>,
        name: Token,
        value: Box<Expression>,
        access: Option<Access>,
    },
    Super {
        keyword: Token,
        method: Token,
    },
    Grouping(Box<Expression>),
    Literal(LiteralValue),
    Logical {
        left: Box<Expression>,
        operator: Token,
        right: Box<Expression>,
    },
    This(Token),
    Unary {
        operator: Token,
        operand: Box<Expression>,
    },
    Variable(Token),
    Function(Arc<FunctionDecl>),
}
