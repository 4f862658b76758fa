use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexicalErrorKind {
    #[error("Illegal character")]
    IllegalCharacter(char),
    #[error("'!' cannot be used here")]
    WrongBang,
    #[error("Closing \" was expected")]
    UnclosedString,
    #[error("Invalid escape sequence")]
    InvalidEscape(char),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct LexicalError {
    #[source]
    pub kind: LexicalErrorKind,
    pub line: u32,
}

impl LexicalError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            LexicalErrorKind::IllegalCharacter(_) => "LX001",
            LexicalErrorKind::WrongBang => "LX002",
            LexicalErrorKind::UnclosedString => "LX003",
            LexicalErrorKind::InvalidEscape(_) => "LX004",
        }
    }
}
