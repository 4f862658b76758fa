mod error;
pub mod formatter;
mod token;

pub use error::{LexicalError, LexicalErrorKind};
use std::{ops::Range, sync::Arc};
pub use token::{Literal, Token, TokenKind, KEYWORD_HASHMAP};

/// Byte ranges of every line in a source text, used to point diagnostics at a line.
#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_breaks: Arc<[Range<usize>]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let mut line_breaks = Vec::new();
        let mut cursor = 0;
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_breaks.push(cursor..offset);
                cursor = offset + 1;
            }
        }
        line_breaks.push(cursor..text.len());
        Self {
            line_breaks: line_breaks.into(),
        }
    }

    /// The byte range of a 1-based line, clamped to the last line.
    pub fn get_line_range(&self, line: u32) -> Range<usize> {
        let index = (line.max(1) as usize - 1).min(self.line_breaks.len() - 1);
        self.line_breaks[index].clone()
    }
}

#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    start: usize,
    offset: usize,
    line: u32,
    last_kind: Option<TokenKind>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            start: 0,
            offset: 0,
            line: 1,
            last_kind: None,
        }
    }

    /// Scans the whole source, collecting every lexical error instead of stopping at the first.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexicalError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        loop {
            match self.next_token() {
                Ok(token) => {
                    let is_eof = token.kind == TokenKind::Eof;
                    tokens.push(token);
                    if is_eof {
                        break;
                    }
                }
                Err(error) => errors.push(error),
            }
        }
        (tokens, errors)
    }
}

impl<'src> Lexer<'src> {
    fn peek_char(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_second_char(&self) -> Option<char> {
        let mut chars = self.source[self.offset..].chars();
        chars.next();
        chars.next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn eat_if(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.offset += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn lexeme(&self) -> &'src str {
        &self.source[self.start..self.offset]
    }

    fn emit(&mut self, kind: TokenKind) -> Token {
        self.last_kind = Some(kind);
        Token::new(kind, self.lexeme(), self.line)
    }

    fn error(&self, kind: LexicalErrorKind, line: u32) -> LexicalError {
        LexicalError { kind, line }
    }

    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            self.start = self.offset;
            let Some(c) = self.next_char() else {
                return Ok(self.finish());
            };

            let kind = match c {
                '(' => TokenKind::LeftParenthesis,
                ')' => TokenKind::RightParenthesis,
                '[' => TokenKind::LeftBracket,
                ']' => TokenKind::RightBracket,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                ':' => TokenKind::Colon,
                ';' => TokenKind::Semicolon,
                '-' => TokenKind::Minus,
                '+' => TokenKind::Plus,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '*' => TokenKind::Star,
                '^' => TokenKind::Caret,
                '!' => {
                    if self.eat_if('=') {
                        TokenKind::BangEqual
                    } else {
                        return Err(self.error(LexicalErrorKind::WrongBang, self.line));
                    }
                }
                '=' if self.eat_if('=') => TokenKind::EqualEqual,
                '=' => TokenKind::Equal,
                '<' if self.eat_if('=') => TokenKind::LessThanEqual,
                '<' => TokenKind::LessThan,
                '>' if self.eat_if('=') => TokenKind::GreaterThanEqual,
                '>' => TokenKind::GreaterThan,
                '#' => {
                    while self.peek_char().is_some_and(|c| c != '\n') {
                        self.next_char();
                    }
                    continue;
                }
                ' ' | '\r' | '\t' => continue,
                '\n' => {
                    let token = self.emit(TokenKind::Newline);
                    self.line += 1;
                    return Ok(token);
                }
                '"' => return self.string(),
                c if c.is_ascii_digit() => return Ok(self.number()),
                c if c.is_alphabetic() || c == '_' => return Ok(self.identifier()),
                c => {
                    return Err(self.error(LexicalErrorKind::IllegalCharacter(c), self.line));
                }
            };
            return Ok(self.emit(kind));
        }
    }

    // Every statement needs a terminator, so a missing final newline is synthesized before EOF.
    fn finish(&mut self) -> Token {
        match self.last_kind {
            Some(kind) if kind != TokenKind::Newline && kind != TokenKind::Eof => {
                self.last_kind = Some(TokenKind::Newline);
                Token::new(TokenKind::Newline, "", self.line)
            }
            _ => {
                self.last_kind = Some(TokenKind::Eof);
                Token::new(TokenKind::Eof, "", self.line)
            }
        }
    }

    fn string(&mut self) -> Result<Token, LexicalError> {
        let line = self.line;
        let mut value = String::new();
        let mut invalid_escape = None;
        loop {
            match self.next_char() {
                None => {
                    return Err(self.error(LexicalErrorKind::UnclosedString, line));
                }
                Some('"') => break,
                Some('\\') => {
                    let escaped = match self.next_char() {
                        Some('a') => '\u{7}',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('v') => '\u{b}',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(other) => {
                            if other == '\n' {
                                self.line += 1;
                            }
                            invalid_escape.get_or_insert(other);
                            continue;
                        }
                        None => {
                            return Err(self.error(LexicalErrorKind::UnclosedString, line));
                        }
                    };
                    value.push(escaped);
                }
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    value.push(c);
                }
            }
        }

        if let Some(c) = invalid_escape {
            return Err(self.error(LexicalErrorKind::InvalidEscape(c), line));
        }

        self.last_kind = Some(TokenKind::StringLiteral);
        Ok(Token {
            kind: TokenKind::StringLiteral,
            lexeme: self.lexeme().into(),
            literal: Some(Literal::String(value.into())),
            line,
        })
    }

    fn number(&mut self) -> Token {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.next_char();
        }

        if self.peek_char() == Some('.')
            && self.peek_second_char().is_some_and(|c| c.is_ascii_digit())
        {
            self.next_char();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.next_char();
            }
        }

        let value: f64 = self
            .lexeme()
            .parse()
            .expect("Numeric literals are guaranteed to be parseable into f64.");
        let mut token = self.emit(TokenKind::NumericLiteral);
        token.literal = Some(Literal::Number(value));
        token
    }

    fn identifier(&mut self) -> Token {
        while self
            .peek_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.next_char();
        }

        let kind = KEYWORD_HASHMAP
            .get(self.lexeme())
            .copied()
            .unwrap_or(TokenKind::Ident);
        self.emit(kind)
    }
}
