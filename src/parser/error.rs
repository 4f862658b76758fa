use crate::interpreter::FrameError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expected new line")]
    ExpectedNewline,
    #[error("Expected variable name")]
    ExpectedIdentifier,
    #[error("Expected '{{' at this position")]
    ExpectedOpeningCurlyBrace,
    #[error("Expected '}}' at this position")]
    ExpectedClosingCurlyBrace,
    #[error("Expected function name")]
    ExpectedFunctionName,
    #[error("Expect '(' after function name")]
    ExpectedParen,
    #[error("Expected function parameter")]
    ExpectedFunctionParameter,
    #[error("Expect ')' after expression")]
    UnclosedParen,
    #[error("Max number of parameters is 255")]
    MaxParameters,
    #[error("Max number of arguments is 255")]
    MaxArguments,
    #[error("Expected semicolon")]
    ExpectedSemicolon,
    #[error("Empty expression or let was expected at this position")]
    ExpectedInit,
    #[error("Expected 'in'")]
    ExpectedIn,
    #[error("A catch block was expected at this position")]
    ExpectedCatch,
    #[error("Statement only allowed for use inside loop")]
    OnlyAllowedInsideLoop,
    #[error("Expected ']' at end of list")]
    UnclosedBracket,
    #[error("Expected '}}' at the end of dict")]
    UnclosedCurlyBrace,
    #[error("Expected ':' after key")]
    ExpectedColon,
    #[error("Undefined statement")]
    UndefinedStatement,
    #[error("Expected ']' at the end of slice")]
    UnclosedSlice,
    #[error("Expected property name after '.'")]
    ExpectedProperty,
    #[error("Expect ')' after arguments")]
    UnclosedArguments,
    #[error("Undefined expression")]
    UndefinedExpression,
    #[error("Keyword 'super' is only valid for property accessing")]
    ExpectedDot,
    #[error("Internal error: {0}")]
    Internal(#[from] FrameError),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub line: u32,
}

impl ParserError {
    /// Fatal errors abort the whole parse instead of resynchronizing at the next statement.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ParserErrorKind::MaxParameters
                | ParserErrorKind::MaxArguments
                | ParserErrorKind::Internal(_)
        )
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::ExpectedNewline => "PE001",
            ParserErrorKind::ExpectedIdentifier => "PE002",
            ParserErrorKind::ExpectedOpeningCurlyBrace => "PE003",
            ParserErrorKind::ExpectedClosingCurlyBrace => "PE004",
            ParserErrorKind::ExpectedFunctionName => "PE005",
            ParserErrorKind::ExpectedParen => "PE006",
            ParserErrorKind::ExpectedFunctionParameter => "PE007",
            ParserErrorKind::UnclosedParen => "PE008",
            ParserErrorKind::MaxParameters => "PE009",
            ParserErrorKind::MaxArguments => "PE010",
            ParserErrorKind::ExpectedSemicolon => "PE011",
            ParserErrorKind::ExpectedInit => "PE012",
            ParserErrorKind::ExpectedIn => "PE013",
            ParserErrorKind::ExpectedCatch => "PE014",
            ParserErrorKind::OnlyAllowedInsideLoop => "PE015",
            ParserErrorKind::UnclosedBracket => "PE016",
            ParserErrorKind::UnclosedCurlyBrace => "PE017",
            ParserErrorKind::ExpectedColon => "PE018",
            ParserErrorKind::UndefinedStatement => "PE019",
            ParserErrorKind::UnclosedSlice => "PE020",
            ParserErrorKind::ExpectedProperty => "PE021",
            ParserErrorKind::UnclosedArguments => "PE022",
            ParserErrorKind::UndefinedExpression => "PE023",
            ParserErrorKind::ExpectedDot => "PE024",
            ParserErrorKind::Internal(_) => "PE999",
        }
    }
}
