use super::expression::Expression;
use crate::lexer::Token;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Vec<Statement>),
    /// `fn square(x) x * x`
    Expression(Expression),
}

/// Shared by function statements, lambdas and methods. Lambdas have no name.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Option<Token>,
    pub parameters: Vec<Token>,
    pub body: FunctionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Token,
    pub super_class: Option<Token>,
    pub methods: Vec<Arc<FunctionDecl>>,
    pub static_methods: Vec<Arc<FunctionDecl>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElifBranch {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    TryCatch {
        body: Box<Statement>,
        name: Token,
        handler: Box<Statement>,
    },
    ClassicFor {
        keyword: Token,
        initializer: Option<Box<Statement>>,
        condition: Expression,
        increment: Expression,
        body: Box<Statement>,
    },
    EnhancedFor {
        keyword: Token,
        identifiers: Vec<Token>,
        collection: Expression,
        body: Box<Statement>,
    },
    Let {
        name: Token,
        initializer: Option<Expression>,
    },
    Block(Vec<Statement>),
    While {
        keyword: Token,
        condition: Expression,
        body: Box<Statement>,
    },
    Return {
        keyword: Token,
        value: Option<Expression>,
    },
    Break(Token),
    Continue(Token),
    If {
        keyword: Token,
        condition: Expression,
        then_branch: Vec<Statement>,
        elifs: Vec<ElifBranch>,
        else_branch: Option<Vec<Statement>>,
    },
    Function(Arc<FunctionDecl>),
    Class(ClassDecl),
}
