use compact_str::CompactString;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("and", TokenKind::KeywordAnd);
    map.insert("break", TokenKind::KeywordBreak);
    map.insert("catch", TokenKind::KeywordCatch);
    map.insert("class", TokenKind::KeywordClass);
    map.insert("continue", TokenKind::KeywordContinue);
    map.insert("elif", TokenKind::KeywordElif);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("false", TokenKind::KeywordFalse);
    map.insert("fn", TokenKind::KeywordFn);
    map.insert("for", TokenKind::KeywordFor);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("in", TokenKind::KeywordIn);
    map.insert("let", TokenKind::KeywordLet);
    map.insert("nil", TokenKind::KeywordNil);
    map.insert("not", TokenKind::KeywordNot);
    map.insert("or", TokenKind::KeywordOr);
    map.insert("return", TokenKind::KeywordReturn);
    map.insert("super", TokenKind::KeywordSuper);
    map.insert("this", TokenKind::KeywordThis);
    map.insert("true", TokenKind::KeywordTrue);
    map.insert("try", TokenKind::KeywordTry);
    map.insert("while", TokenKind::KeywordWhile);
    map
});

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Parentheses
    LeftParenthesis,
    RightParenthesis,
    // Brackets
    LeftBracket,
    RightBracket,
    // Braces
    LeftBrace,
    RightBrace,
    // Miscellaneous
    Comma,
    Dot,
    Colon,
    Semicolon,
    // Operators
    Minus,
    Plus,
    Slash,
    Percent,
    Star,
    Caret,
    BangEqual,
    Equal,
    EqualEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,

    // Literals
    NumericLiteral,
    StringLiteral,
    Ident,

    // Keywords
    KeywordAnd,
    KeywordBreak,
    KeywordCatch,
    KeywordClass,
    KeywordContinue,
    KeywordElif,
    KeywordElse,
    KeywordFalse,
    KeywordFn,
    KeywordFor,
    KeywordIf,
    KeywordIn,
    KeywordLet,
    KeywordNil,
    KeywordNot,
    KeywordOr,
    KeywordReturn,
    KeywordSuper,
    KeywordThis,
    KeywordTrue,
    KeywordTry,
    KeywordWhile,

    // Statement terminator.
    Newline,
    // End of file.
    Eof,
}

impl TokenKind {
    /// Tokens the parser resynchronizes on after an error.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::KeywordClass
                | TokenKind::KeywordFn
                | TokenKind::KeywordLet
                | TokenKind::KeywordFor
                | TokenKind::KeywordIf
                | TokenKind::KeywordWhile
                | TokenKind::KeywordReturn
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LeftParenthesis => write!(f, "LEFT_PAREN"),
            TokenKind::RightParenthesis => write!(f, "RIGHT_PAREN"),
            TokenKind::LeftBracket => write!(f, "LEFT_BRACKET"),
            TokenKind::RightBracket => write!(f, "RIGHT_BRACKET"),
            TokenKind::LeftBrace => write!(f, "LEFT_BRACE"),
            TokenKind::RightBrace => write!(f, "RIGHT_BRACE"),
            TokenKind::Comma => write!(f, "COMMA"),
            TokenKind::Dot => write!(f, "DOT"),
            TokenKind::Colon => write!(f, "COLON"),
            TokenKind::Semicolon => write!(f, "SEMICOLON"),
            TokenKind::Minus => write!(f, "MINUS"),
            TokenKind::Plus => write!(f, "PLUS"),
            TokenKind::Slash => write!(f, "SLASH"),
            TokenKind::Percent => write!(f, "PERCENT"),
            TokenKind::Star => write!(f, "STAR"),
            TokenKind::Caret => write!(f, "CARET"),
            TokenKind::BangEqual => write!(f, "BANG_EQUAL"),
            TokenKind::Equal => write!(f, "EQUAL"),
            TokenKind::EqualEqual => write!(f, "EQUAL_EQUAL"),
            TokenKind::LessThan => write!(f, "LESS"),
            TokenKind::LessThanEqual => write!(f, "LESS_EQUAL"),
            TokenKind::GreaterThan => write!(f, "GREATER"),
            TokenKind::GreaterThanEqual => write!(f, "GREATER_EQUAL"),
            TokenKind::NumericLiteral => write!(f, "NUMBER"),
            TokenKind::StringLiteral => write!(f, "STRING"),
            TokenKind::Ident => write!(f, "IDENTIFIER"),
            TokenKind::KeywordAnd => write!(f, "AND"),
            TokenKind::KeywordBreak => write!(f, "BREAK"),
            TokenKind::KeywordCatch => write!(f, "CATCH"),
            TokenKind::KeywordClass => write!(f, "CLASS"),
            TokenKind::KeywordContinue => write!(f, "CONTINUE"),
            TokenKind::KeywordElif => write!(f, "ELIF"),
            TokenKind::KeywordElse => write!(f, "ELSE"),
            TokenKind::KeywordFalse => write!(f, "FALSE"),
            TokenKind::KeywordFn => write!(f, "FN"),
            TokenKind::KeywordFor => write!(f, "FOR"),
            TokenKind::KeywordIf => write!(f, "IF"),
            TokenKind::KeywordIn => write!(f, "IN"),
            TokenKind::KeywordLet => write!(f, "LET"),
            TokenKind::KeywordNil => write!(f, "NIL"),
            TokenKind::KeywordNot => write!(f, "NOT"),
            TokenKind::KeywordOr => write!(f, "OR"),
            TokenKind::KeywordReturn => write!(f, "RETURN"),
            TokenKind::KeywordSuper => write!(f, "SUPER"),
            TokenKind::KeywordThis => write!(f, "THIS"),
            TokenKind::KeywordTrue => write!(f, "TRUE"),
            TokenKind::KeywordTry => write!(f, "TRY"),
            TokenKind::KeywordWhile => write!(f, "WHILE"),
            TokenKind::Newline => write!(f, "NEWLINE"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// The decoded value carried by literal tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(CompactString),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: CompactString,
    pub literal: Option<Literal>,
    /// 1-based line the token starts on.
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<CompactString>, line: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            line,
        }
    }

    /// A token that does not come from source text, such as the implicit `init` of `super(...)`.
    pub fn synthetic(kind: TokenKind, lexeme: &str, line: u32) -> Self {
        Self::new(kind, lexeme, line)
    }
}
