use super::token::{Literal, Token, TokenKind};
use crate::lexer::{Lexer, LexicalError, LexicalErrorKind};

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_lexical_error(&self, error: &LexicalError) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

/// One token per line as `(line) KIND lexeme literal`.
pub struct BasicFormatter;

impl<'src> ToFormatter<BasicFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter {
        BasicFormatter {}
    }
}

impl TokenFormatter for BasicFormatter {
    fn format(&self, token: &Token) -> String {
        let lexeme = match token.kind {
            TokenKind::Newline => "\\n",
            _ => token.lexeme.as_str(),
        };
        let literal = match &token.literal {
            Some(Literal::Number(value)) => format!("{value:?}"),
            Some(Literal::String(value)) => format!("{value:?}"),
            None => "null".into(),
        };
        format!("({}) {} {lexeme} {literal}", token.line, token.kind)
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        let line = error.line;
        match error.kind {
            LexicalErrorKind::IllegalCharacter(c) => {
                format!("({line}) ERROR ILLEGAL_CHARACTER {c}")
            }
            LexicalErrorKind::WrongBang => format!("({line}) ERROR WRONG_BANG !"),
            LexicalErrorKind::UnclosedString => {
                format!("({line}) ERROR UNTERMINATED_STRING null")
            }
            LexicalErrorKind::InvalidEscape(c) => {
                format!("({line}) ERROR INVALID_ESCAPE \\{c}")
            }
        }
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}
