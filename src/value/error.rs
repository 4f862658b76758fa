use crate::{interpreter::FrameError, lexer::Token};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Undefined variable")]
    UndefinedVariable,
    #[error("The operation is only defined for numbers")]
    OnlyNumbers,
    #[error("Undefined operation")]
    UndefinedOperation,
    #[error("Expected step of the slice")]
    ExpectedStep,
    #[error("Expected key for accessing dictionary")]
    ExpectedKey,
    #[error("The object is not subscriptable")]
    InvalidAccess,
    #[error("Can only call functions")]
    OnlyFunctions,
    #[error("Invalid number of arguments")]
    InvalidNumberOfArguments,
    #[error("Collection expected")]
    ExpectedCollection,
    #[error("Object expected")]
    ExpectedObject,
    #[error("Expected 1 or 2 identifiers for dict")]
    ExpectedIdentifiersDict,
    #[error("Cannot unpack value")]
    CannotUnpack,
    #[error("Wrong number of values to unpack")]
    WrongNumberOfValues,
    #[error("Method not found")]
    MethodNotFound,
    #[error("Undefined property")]
    UndefinedProperty,
    #[error("Trying to set a property on a Read-Only object")]
    ReadOnly,
    #[error("Undefined operator for this object")]
    UndefinedOperator,
    #[error("A number was expected at this position")]
    ExpectedNumber,
    #[error("A class was expected at this position")]
    ExpectedClass,
    #[error("A string was expected at this position")]
    ExpectedString,
    #[error("A dictionary was expected at this position")]
    ExpectedDict,
    #[error("A list was expected at this position")]
    ExpectedList,
    #[error("Index out of range")]
    IndexOutOfRange,
    #[error("The value cannot be used as a dictionary key")]
    UnhashableKey,
    #[error("Statement only allowed for use inside loop")]
    OnlyAllowedInsideLoop,
    #[error("Max recursion depth exceeded")]
    MaxRecursion,
    #[error("import module error")]
    ImportError,
    /// Failures raised by native functions, such as I/O errors.
    #[error("{0}")]
    Native(CompactString),
    #[error("Internal error: {0}")]
    Internal(#[from] FrameError),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}: {lexeme}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub line: u32,
    pub lexeme: CompactString,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, token: &Token) -> Self {
        Self {
            kind,
            line: token.line,
            lexeme: token.lexeme.clone(),
        }
    }

    /// Evaluator bugs rather than program bugs. `try`/`catch` never intercepts these.
    pub fn is_internal(&self) -> bool {
        matches!(self.kind, RuntimeErrorKind::Internal(_))
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::UndefinedVariable => "RT001",
            RuntimeErrorKind::OnlyNumbers => "RT002",
            RuntimeErrorKind::UndefinedOperation => "RT003",
            RuntimeErrorKind::ExpectedStep => "RT004",
            RuntimeErrorKind::ExpectedKey => "RT005",
            RuntimeErrorKind::InvalidAccess => "RT006",
            RuntimeErrorKind::OnlyFunctions => "RT007",
            RuntimeErrorKind::InvalidNumberOfArguments => "RT008",
            RuntimeErrorKind::ExpectedCollection => "RT009",
            RuntimeErrorKind::ExpectedObject => "RT010",
            RuntimeErrorKind::ExpectedIdentifiersDict => "RT011",
            RuntimeErrorKind::CannotUnpack => "RT012",
            RuntimeErrorKind::WrongNumberOfValues => "RT013",
            RuntimeErrorKind::MethodNotFound => "RT014",
            RuntimeErrorKind::UndefinedProperty => "RT015",
            RuntimeErrorKind::ReadOnly => "RT016",
            RuntimeErrorKind::UndefinedOperator => "RT017",
            RuntimeErrorKind::ExpectedNumber => "RT018",
            RuntimeErrorKind::ExpectedClass => "RT019",
            RuntimeErrorKind::ExpectedString => "RT020",
            RuntimeErrorKind::ExpectedDict => "RT022",
            RuntimeErrorKind::ExpectedList => "RT023",
            RuntimeErrorKind::IndexOutOfRange => "RT024",
            RuntimeErrorKind::UnhashableKey => "RT025",
            RuntimeErrorKind::OnlyAllowedInsideLoop => "RT026",
            RuntimeErrorKind::MaxRecursion => "RT027",
            RuntimeErrorKind::ImportError => "RT028",
            RuntimeErrorKind::Native(_) => "RT029",
            RuntimeErrorKind::Internal(_) => "RT999",
        }
    }
}
