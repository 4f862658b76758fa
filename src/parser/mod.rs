mod error;
pub mod expression;
pub mod formatter;
pub mod statement;

use crate::{
    interpreter::CallStack,
    lexer::{Literal, Token, TokenKind},
};
pub use error::{ParserError, ParserErrorKind};
use expression::{Access, Expression, LiteralValue};
use statement::{ClassDecl, ElifBranch, FunctionBody, FunctionDecl, Statement};
use std::sync::Arc;

pub const MAX_PARAMETERS: usize = 255;

type ParseResult<T> = Result<T, ParserError>;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    call_stack: CallStack,
    errors: Vec<ParserError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |token| token.kind != TokenKind::Eof) {
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Token::new(TokenKind::Eof, "", line));
        }
        Self {
            tokens,
            current: 0,
            call_stack: CallStack::new(),
            errors: Vec::new(),
        }
    }

    /// Parses every statement, recovering after each error so that all diagnostics are collected.
    pub fn parse(mut self) -> Result<Vec<Statement>, Vec<ParserError>> {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            if self.is_at_end() {
                break;
            }
            match self.declaration(true) {
                Ok(statement) => statements.push(statement),
                Err(error) if error.is_fatal() => {
                    self.errors.push(error);
                    return Err(self.errors);
                }
                Err(error) => {
                    tracing::debug!(line = error.line, "synchronizing after parse error: {error}");
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }

        if self.errors.is_empty() {
            Ok(statements)
        } else {
            Err(self.errors)
        }
    }
}

// Token helpers
impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn next_token(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.current += 1;
        }
    }

    /// Newlines are skipped while looking for anything other than a newline. On a miss the
    /// position is left untouched.
    fn check(&mut self, kind: TokenKind) -> bool {
        let saved = self.current;
        if kind != TokenKind::Newline {
            self.skip_newlines();
        }
        let found = self.peek().kind == kind;
        if !found {
            self.current = saved;
        }
        found
    }

    fn eat_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.next_token())
        } else {
            None
        }
    }

    fn eat_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        for &kind in kinds {
            if let Some(token) = self.eat_if(kind) {
                return Some(token);
            }
        }
        None
    }

    fn expect(&mut self, kind: TokenKind, error: ParserErrorKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.next_token())
        } else {
            Err(self.error(error))
        }
    }

    fn error(&self, kind: ParserErrorKind) -> ParserError {
        ParserError {
            kind,
            line: self.peek().line,
        }
    }

    fn synchronize(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
        while !self.is_at_end() {
            if self.peek().kind.starts_statement() {
                return;
            }
            self.current += 1;
        }
    }

    fn in_loop<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.call_stack.enter_loop();
        let result = parse(self);
        self.call_stack.leave_loop();
        result
    }

    fn in_function<T>(
        &mut self,
        name: &str,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.call_stack.enter_function(name);
        let result = parse(self);
        self.call_stack
            .leave_function(name)
            .map_err(|error| self.error(error.into()))?;
        result
    }
}

// Statements
impl Parser {
    fn declaration(&mut self, expect_newline: bool) -> ParseResult<Statement> {
        let statement = if self.eat_if(TokenKind::KeywordClass).is_some() {
            self.class_declaration()?
        } else if self.eat_if(TokenKind::KeywordFn).is_some() {
            Statement::Function(Arc::new(self.function_declaration()?))
        } else if self.eat_if(TokenKind::KeywordLet).is_some() {
            self.let_declaration()?
        } else {
            self.statement()?
        };

        if expect_newline {
            self.expect(TokenKind::Newline, ParserErrorKind::ExpectedNewline)?;
        }
        Ok(statement)
    }

    fn class_declaration(&mut self) -> ParseResult<Statement> {
        let name = self.expect(TokenKind::Ident, ParserErrorKind::ExpectedIdentifier)?;
        let super_class = match self.eat_if(TokenKind::LessThan) {
            Some(_) => Some(self.expect(TokenKind::Ident, ParserErrorKind::ExpectedIdentifier)?),
            None => None,
        };
        self.expect(
            TokenKind::LeftBrace,
            ParserErrorKind::ExpectedOpeningCurlyBrace,
        )?;

        let mut methods = Vec::new();
        let mut static_methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.eat_if(TokenKind::KeywordClass).is_some() {
                static_methods.push(Arc::new(self.function_declaration()?));
            } else {
                methods.push(Arc::new(self.function_declaration()?));
            }
        }
        self.expect(
            TokenKind::RightBrace,
            ParserErrorKind::ExpectedClosingCurlyBrace,
        )?;

        Ok(Statement::Class(ClassDecl {
            name,
            super_class,
            methods,
            static_methods,
        }))
    }

    fn function_declaration(&mut self) -> ParseResult<FunctionDecl> {
        let name = self.expect(TokenKind::Ident, ParserErrorKind::ExpectedFunctionName)?;
        let frame = name.lexeme.clone();
        self.in_function(&frame, |parser| parser.function_rest(Some(name)))
    }

    fn function_rest(&mut self, name: Option<Token>) -> ParseResult<FunctionDecl> {
        self.expect(TokenKind::LeftParenthesis, ParserErrorKind::ExpectedParen)?;

        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParenthesis) {
            loop {
                if parameters.len() >= MAX_PARAMETERS {
                    return Err(self.error(ParserErrorKind::MaxParameters));
                }
                parameters.push(
                    self.expect(TokenKind::Ident, ParserErrorKind::ExpectedFunctionParameter)?,
                );
                if self.eat_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParenthesis, ParserErrorKind::UnclosedParen)?;

        let body = if self.eat_if(TokenKind::LeftBrace).is_some() {
            FunctionBody::Block(self.block()?)
        } else {
            FunctionBody::Expression(self.expression()?)
        };

        Ok(FunctionDecl {
            name,
            parameters,
            body,
        })
    }

    fn let_declaration(&mut self) -> ParseResult<Statement> {
        let name = self.expect(TokenKind::Ident, ParserErrorKind::ExpectedIdentifier)?;
        let initializer = match self.eat_if(TokenKind::Equal) {
            Some(_) => Some(self.expression()?),
            None => None,
        };
        Ok(Statement::Let { name, initializer })
    }

    fn statement(&mut self) -> ParseResult<Statement> {
        if let Some(keyword) = self.eat_if(TokenKind::KeywordFor) {
            return self.in_loop(|parser| parser.for_statement(keyword));
        }
        if self.eat_if(TokenKind::KeywordTry).is_some() {
            return self.try_statement();
        }
        if let Some(keyword) = self.eat_if(TokenKind::KeywordIf) {
            return self.if_statement(keyword);
        }
        if let Some(keyword) = self.eat_if(TokenKind::KeywordReturn) {
            return self.return_statement(keyword);
        }
        if let Some(keyword) = self.eat_if(TokenKind::KeywordBreak) {
            self.check_inside_loop(&keyword);
            return Ok(Statement::Break(keyword));
        }
        if let Some(keyword) = self.eat_if(TokenKind::KeywordContinue) {
            self.check_inside_loop(&keyword);
            return Ok(Statement::Continue(keyword));
        }
        if let Some(keyword) = self.eat_if(TokenKind::KeywordWhile) {
            return self.in_loop(|parser| parser.while_statement(keyword));
        }
        if self.eat_if(TokenKind::LeftBrace).is_some() {
            return Ok(Statement::Block(self.block()?));
        }
        Ok(Statement::Expression(self.expression()?))
    }

    fn check_inside_loop(&mut self, keyword: &Token) {
        if !self.call_stack.inside_loop() {
            self.errors.push(ParserError {
                kind: ParserErrorKind::OnlyAllowedInsideLoop,
                line: keyword.line,
            });
        }
    }

    fn for_statement(&mut self, keyword: Token) -> ParseResult<Statement> {
        if self.check(TokenKind::Ident) {
            return self.enhanced_for_statement(keyword);
        }

        let initializer = if self.eat_if(TokenKind::Semicolon).is_some() {
            None
        } else if self.eat_if(TokenKind::KeywordLet).is_some() {
            let initializer = self.let_declaration()?;
            self.expect(TokenKind::Semicolon, ParserErrorKind::ExpectedSemicolon)?;
            Some(Box::new(initializer))
        } else {
            let error = self.error(ParserErrorKind::ExpectedInit);
            self.errors.push(error);
            None
        };

        let condition = self.expression()?;
        self.expect(TokenKind::Semicolon, ParserErrorKind::ExpectedSemicolon)?;
        let increment = self.expression()?;
        let body = Box::new(self.declaration(false)?);

        Ok(Statement::ClassicFor {
            keyword,
            initializer,
            condition,
            increment,
            body,
        })
    }

    fn enhanced_for_statement(&mut self, keyword: Token) -> ParseResult<Statement> {
        let mut identifiers = Vec::new();
        while let Some(identifier) = self.eat_if(TokenKind::Ident) {
            identifiers.push(identifier);
            self.eat_if(TokenKind::Comma);
        }
        self.expect(TokenKind::KeywordIn, ParserErrorKind::ExpectedIn)?;
        let collection = self.expression()?;
        let body = Box::new(self.declaration(false)?);

        Ok(Statement::EnhancedFor {
            keyword,
            identifiers,
            collection,
            body,
        })
    }

    fn try_statement(&mut self) -> ParseResult<Statement> {
        let body = Box::new(self.declaration(false)?);
        self.expect(TokenKind::KeywordCatch, ParserErrorKind::ExpectedCatch)?;
        let name = self.expect(TokenKind::Ident, ParserErrorKind::ExpectedIdentifier)?;
        let handler = Box::new(self.declaration(false)?);
        Ok(Statement::TryCatch {
            body,
            name,
            handler,
        })
    }

    fn if_statement(&mut self, keyword: Token) -> ParseResult<Statement> {
        let condition = self.expression()?;
        let then_branch = self.branch_body()?;

        let mut elifs = Vec::new();
        while self.eat_if(TokenKind::KeywordElif).is_some() {
            let condition = self.expression()?;
            let body = self.branch_body()?;
            elifs.push(ElifBranch { condition, body });
        }

        let else_branch = match self.eat_if(TokenKind::KeywordElse) {
            Some(_) => Some(self.branch_body()?),
            None => None,
        };

        Ok(Statement::If {
            keyword,
            condition,
            then_branch,
            elifs,
            else_branch,
        })
    }

    fn branch_body(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect(
            TokenKind::LeftBrace,
            ParserErrorKind::ExpectedOpeningCurlyBrace,
        )?;
        self.block()
    }

    fn return_statement(&mut self, keyword: Token) -> ParseResult<Statement> {
        let value = match self.peek().kind {
            TokenKind::Newline | TokenKind::RightBrace | TokenKind::Eof => None,
            _ => Some(self.expression()?),
        };
        Ok(Statement::Return { keyword, value })
    }

    fn while_statement(&mut self, keyword: Token) -> ParseResult<Statement> {
        let condition = self.expression()?;
        let body = Box::new(self.declaration(false)?);
        Ok(Statement::While {
            keyword,
            condition,
            body,
        })
    }

    /// Statements up to the closing `}`; the opening brace has already been consumed.
    fn block(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat_if(TokenKind::RightBrace).is_some() {
                return Ok(statements);
            }
            if self.is_at_end() {
                return Err(self.error(ParserErrorKind::ExpectedClosingCurlyBrace));
            }
            statements.push(self.declaration(false)?);
        }
    }
}

// Expressions
impl Parser {
    fn expression(&mut self) -> ParseResult<Expression> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expression> {
        let expression = self.or()?;
        let Some(equal) = self.eat_if(TokenKind::Equal) else {
            return Ok(expression);
        };
        let value = Box::new(self.assignment()?);

        // `a.b[0][1] = v` assigns through the outermost access, rooted at `a.b`.
        let (target, access) = match expression {
            Expression::Access(access) => {
                let mut target = access.object.as_ref();
                while let Expression::Access(inner) = target {
                    target = inner.object.as_ref();
                }
                (target.clone(), Some(access))
            }
            other => (other, None),
        };

        match target {
            Expression::Variable(name) => Ok(Expression::Assign {
                name,
                value,
                access,
            }),
            Expression::Get { object, name } => Ok(Expression::Set {
                object,
                name,
                value,
                access,
            }),
            _ => Err(ParserError {
                kind: ParserErrorKind::UndefinedStatement,
                line: equal.line,
            }),
        }
    }

    fn or(&mut self) -> ParseResult<Expression> {
        let mut expression = self.and()?;
        while let Some(operator) = self.eat_if(TokenKind::KeywordOr) {
            let right = self.and()?;
            expression = Expression::Logical {
                left: Box::new(expression),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    fn and(&mut self) -> ParseResult<Expression> {
        let mut expression = self.equality()?;
        while let Some(operator) = self.eat_if(TokenKind::KeywordAnd) {
            let right = self.equality()?;
            expression = Expression::Logical {
                left: Box::new(expression),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    /// One left-associative precedence level.
    fn binary(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expression>,
    ) -> ParseResult<Expression> {
        let mut expression = operand(self)?;
        while let Some(operator) = self.eat_any(operators) {
            let right = operand(self)?;
            expression = Expression::Binary {
                left: Box::new(expression),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    fn equality(&mut self) -> ParseResult<Expression> {
        self.binary(
            &[TokenKind::EqualEqual, TokenKind::BangEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expression> {
        self.binary(
            &[
                TokenKind::GreaterThan,
                TokenKind::GreaterThanEqual,
                TokenKind::LessThan,
                TokenKind::LessThanEqual,
            ],
            Self::addition,
        )
    }

    fn addition(&mut self) -> ParseResult<Expression> {
        self.binary(&[TokenKind::Plus, TokenKind::Minus], Self::multiplication)
    }

    fn multiplication(&mut self) -> ParseResult<Expression> {
        self.binary(
            &[TokenKind::Slash, TokenKind::Percent, TokenKind::Star],
            Self::power,
        )
    }

    fn power(&mut self) -> ParseResult<Expression> {
        self.binary(&[TokenKind::Caret], Self::unary)
    }

    fn unary(&mut self) -> ParseResult<Expression> {
        match self.eat_any(&[TokenKind::KeywordNot, TokenKind::Minus]) {
            Some(operator) => Ok(Expression::Unary {
                operator,
                operand: Box::new(self.unary()?),
            }),
            None => self.call(),
        }
    }

    fn call(&mut self) -> ParseResult<Expression> {
        let mut expression = self.primary()?;
        loop {
            if self.eat_if(TokenKind::LeftParenthesis).is_some() {
                let arguments = self.arguments(TokenKind::RightParenthesis)?;
                let paren = self.expect(
                    TokenKind::RightParenthesis,
                    ParserErrorKind::UnclosedArguments,
                )?;
                expression = Expression::Call {
                    callee: Box::new(expression),
                    paren,
                    arguments,
                };
            } else if self.eat_if(TokenKind::Dot).is_some() {
                let name = self.expect(TokenKind::Ident, ParserErrorKind::ExpectedProperty)?;
                expression = Expression::Get {
                    object: Box::new(expression),
                    name,
                };
            } else if let Some(bracket) = self.eat_if(TokenKind::LeftBracket) {
                expression = self.access(expression, bracket)?;
            } else {
                return Ok(expression);
            }
        }
    }

    /// Comma separated expressions up to (not including) `closing`. A trailing comma is allowed.
    fn arguments(&mut self, closing: TokenKind) -> ParseResult<Vec<Expression>> {
        let mut arguments = Vec::new();
        if self.check(closing) {
            return Ok(arguments);
        }
        loop {
            if closing == TokenKind::RightParenthesis && arguments.len() >= MAX_PARAMETERS {
                return Err(self.error(ParserErrorKind::MaxArguments));
            }
            arguments.push(self.expression()?);
            if self.eat_if(TokenKind::Comma).is_none() || self.check(closing) {
                return Ok(arguments);
            }
        }
    }

    fn access(&mut self, object: Expression, bracket: Token) -> ParseResult<Expression> {
        let mut access = Access {
            object: Box::new(object),
            bracket,
            first: None,
            first_colon: None,
            second: None,
            second_colon: None,
            third: None,
        };

        match self.eat_if(TokenKind::Colon) {
            Some(colon) => access.first_colon = Some(colon),
            None => {
                access.first = Some(Box::new(self.expression()?));
                access.first_colon = self.eat_if(TokenKind::Colon);
            }
        }
        if access.first_colon.is_some() {
            access.second = self.slice_component()?;
            access.second_colon = self.eat_if(TokenKind::Colon);
            if access.second_colon.is_some() {
                access.third = self.slice_component()?;
            }
        }

        self.expect(TokenKind::RightBracket, ParserErrorKind::UnclosedSlice)?;
        Ok(Expression::Access(access))
    }

    fn slice_component(&mut self) -> ParseResult<Option<Box<Expression>>> {
        if self.check(TokenKind::Colon) || self.check(TokenKind::RightBracket) || self.is_at_end()
        {
            Ok(None)
        } else {
            Ok(Some(Box::new(self.expression()?)))
        }
    }

    fn primary(&mut self) -> ParseResult<Expression> {
        let saved = self.current;
        self.skip_newlines();
        let token = self.next_token();

        let expression = match token.kind {
            TokenKind::NumericLiteral | TokenKind::StringLiteral => match token.literal {
                Some(Literal::Number(value)) => Expression::Literal(LiteralValue::Number(value)),
                Some(Literal::String(value)) => Expression::Literal(LiteralValue::String(value)),
                None => {
                    self.current = saved;
                    return Err(self.error(ParserErrorKind::UndefinedExpression));
                }
            },
            TokenKind::KeywordFalse => Expression::Literal(LiteralValue::Bool(false)),
            TokenKind::KeywordTrue => Expression::Literal(LiteralValue::Bool(true)),
            TokenKind::KeywordNil => Expression::Literal(LiteralValue::Nil),
            TokenKind::Ident => Expression::Variable(token),
            TokenKind::LeftParenthesis => {
                let inner = self.expression()?;
                self.expect(TokenKind::RightParenthesis, ParserErrorKind::UnclosedParen)?;
                Expression::Grouping(Box::new(inner))
            }
            TokenKind::LeftBracket => {
                let elements = self.arguments(TokenKind::RightBracket)?;
                let bracket =
                    self.expect(TokenKind::RightBracket, ParserErrorKind::UnclosedBracket)?;
                Expression::List { elements, bracket }
            }
            TokenKind::LeftBrace => self.dictionary()?,
            TokenKind::KeywordFn => {
                let frame = format!("lambda{}", self.call_stack.depth() + 1);
                let declaration = self.in_function(&frame, |parser| parser.function_rest(None))?;
                Expression::Function(Arc::new(declaration))
            }
            TokenKind::KeywordThis => Expression::This(token),
            TokenKind::KeywordSuper => self.super_expression(token)?,
            _ => {
                self.current = saved;
                return Err(self.error(ParserErrorKind::UndefinedExpression));
            }
        };
        Ok(expression)
    }

    fn dictionary(&mut self) -> ParseResult<Expression> {
        let mut entries = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            let key = self.expression()?;
            self.expect(TokenKind::Colon, ParserErrorKind::ExpectedColon)?;
            let value = self.expression()?;
            entries.push((key, value));
            if self.eat_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        let brace = self.expect(TokenKind::RightBrace, ParserErrorKind::UnclosedCurlyBrace)?;
        Ok(Expression::Dict { entries, brace })
    }

    fn super_expression(&mut self, keyword: Token) -> ParseResult<Expression> {
        let method = if self.check(TokenKind::LeftParenthesis) {
            Token::synthetic(TokenKind::Ident, "init", keyword.line)
        } else {
            self.expect(TokenKind::Dot, ParserErrorKind::ExpectedDot)?;
            self.expect(TokenKind::Ident, ParserErrorKind::ExpectedIdentifier)?
        };
        Ok(Expression::Super { keyword, method })
    }
}
