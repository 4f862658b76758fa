use super::{stack::ensure_sufficient_stack, CallStack, ProgramState, SystemContext};
use crate::{
    config::InterpreterConfig,
    environment::SharedEnvironment,
    lexer::{Token, TokenKind},
    parser::{
        expression::{Access, Expression, LiteralValue},
        statement::{ClassDecl, ElifBranch, FunctionBody, FunctionDecl, Statement},
    },
    value::{
        collection::{Dict, List, Selection, Slice},
        error::{RuntimeError, RuntimeErrorKind},
        operator::{self, Dispatch, Operator},
        Class, Function, Instance, Value,
    },
};
use compact_str::{CompactString, ToCompactString};
use std::{collections::HashMap, sync::Arc};

type EvalResult<T> = Result<T, RuntimeError>;

/// Evaluates statements directly against a chain of environments.
#[derive(Debug)]
pub struct TreeWalkInterpreter {
    call_stack: CallStack,
    max_call_depth: usize,
}

impl TreeWalkInterpreter {
    pub fn new(config: &InterpreterConfig) -> Self {
        Self {
            call_stack: CallStack::new(),
            max_call_depth: config.max_call_depth,
        }
    }

    /// Runs a program to completion. A top-level `return` stops the program without an error.
    pub fn run(
        &mut self,
        program: &[Statement],
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<()> {
        for statement in program {
            if let ProgramState::Return(_) =
                self.interpret_statement(statement, environment, context)?
            {
                break;
            }
        }
        Ok(())
    }

    pub fn interpret_statement(
        &mut self,
        statement: &Statement,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<ProgramState> {
        match statement {
            Statement::Expression(expression) => {
                self.evaluate(expression, environment, context)?;
                Ok(ProgramState::Run)
            }
            Statement::TryCatch {
                body,
                name,
                handler,
            } => self.interpret_try_statement(body, name, handler, environment, context),
            Statement::ClassicFor {
                initializer,
                condition,
                increment,
                body,
                ..
            } => self.interpret_classic_for_statement(
                initializer.as_deref(),
                condition,
                increment,
                body,
                environment,
                context,
            ),
            Statement::EnhancedFor {
                keyword,
                identifiers,
                collection,
                body,
            } => self.interpret_enhanced_for_statement(
                keyword,
                identifiers,
                collection,
                body,
                environment,
                context,
            ),
            Statement::Let { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer, environment, context)?,
                    None => Value::Nil,
                };
                environment.declare(&name.lexeme, value);
                Ok(ProgramState::Run)
            }
            Statement::Block(statements) => {
                self.interpret_statements(statements, &environment.new_scope(), context)
            }
            Statement::While {
                condition, body, ..
            } => self.interpret_while_statement(condition, body, environment, context),
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value, environment, context)?,
                    None => Value::Nil,
                };
                Ok(ProgramState::Return(value))
            }
            Statement::Break(keyword) => {
                self.check_inside_loop(keyword)?;
                Ok(ProgramState::Break)
            }
            Statement::Continue(keyword) => {
                self.check_inside_loop(keyword)?;
                Ok(ProgramState::Continue)
            }
            Statement::If {
                condition,
                then_branch,
                elifs,
                else_branch,
                ..
            } => self.interpret_if_statement(
                condition,
                then_branch,
                elifs,
                else_branch.as_deref(),
                environment,
                context,
            ),
            Statement::Function(declaration) => {
                let function = Arc::new(self.create_function(declaration, environment));
                environment.declare(function.name(), Value::Function(function.clone()));
                Ok(ProgramState::Run)
            }
            Statement::Class(declaration) => {
                self.interpret_class_declaration(declaration, environment)
            }
        }
    }

    pub fn evaluate(
        &mut self,
        expression: &Expression,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        match expression {
            Expression::List { elements, .. } => {
                let values = self.evaluate_all(elements, environment, context)?;
                Ok(Value::List(List::new(values)))
            }
            Expression::Dict { entries, brace } => {
                let mut values = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.evaluate(key, environment, context)?;
                    let value = self.evaluate(value, environment, context)?;
                    values.push((key, value));
                }
                let dict = Dict::from_entries(values).map_err(|kind| RuntimeError::new(kind, brace))?;
                Ok(Value::Dict(dict))
            }
            Expression::Assign {
                name,
                value,
                access,
            } => self.evaluate_assign(name, value, access.as_ref(), environment, context),
            Expression::Access(access) => self.evaluate_access(access, environment, context),
            Expression::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right, environment, context),
            Expression::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee, environment, context)?;
                let arguments = self.evaluate_all(arguments, environment, context)?;
                self.call_value(callee, arguments, paren, context)
            }
            Expression::Get { object, name } => {
                let object = self.evaluate(object, environment, context)?;
                self.get_property(&object, name)
            }
            Expression::Set {
                object,
                name,
                value,
                access,
            } => self.evaluate_set(object, name, value, access.as_ref(), environment, context),
            Expression::Super { keyword, method } => {
                self.evaluate_super(keyword, method, environment)
            }
            Expression::Grouping(inner) => self.evaluate(inner, environment, context),
            Expression::Literal(literal) => Ok(match literal {
                LiteralValue::Number(value) => Value::Number(*value),
                LiteralValue::String(value) => Value::String(value.clone()),
                LiteralValue::Bool(value) => Value::Bool(*value),
                LiteralValue::Nil => Value::Nil,
            }),
            Expression::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right, environment, context),
            Expression::This(keyword) => environment
                .access("this")
                .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::UndefinedVariable, keyword)),
            Expression::Unary { operator, operand } => {
                self.evaluate_unary(operator, operand, environment, context)
            }
            Expression::Variable(name) => environment
                .access(&name.lexeme)
                .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::UndefinedVariable, name)),
            Expression::Function(declaration) => Ok(Value::Function(Arc::new(
                self.create_function(declaration, environment),
            ))),
        }
    }
}

// Statement interpreter
impl TreeWalkInterpreter {
    /// Runs statements in the given scope, stopping at the first control-flow signal.
    fn interpret_statements(
        &mut self,
        statements: &[Statement],
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<ProgramState> {
        for statement in statements {
            match self.interpret_statement(statement, environment, context)? {
                ProgramState::Run => {}
                state => return Ok(state),
            }
        }
        Ok(ProgramState::Run)
    }

    fn interpret_try_statement(
        &mut self,
        body: &Statement,
        name: &Token,
        handler: &Statement,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<ProgramState> {
        match self.interpret_statement(body, environment, context) {
            Err(error) if !error.is_internal() => {
                let scope = environment.new_scope();
                scope.declare(&name.lexeme, Value::String(error.kind.to_compact_string()));
                self.interpret_statement(handler, &scope, context)
            }
            result => result,
        }
    }

    fn interpret_if_statement(
        &mut self,
        condition: &Expression,
        then_branch: &[Statement],
        elifs: &[ElifBranch],
        else_branch: Option<&[Statement]>,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<ProgramState> {
        if self.evaluate(condition, environment, context)?.is_truthy() {
            return self.interpret_statements(then_branch, environment, context);
        }
        for elif in elifs {
            if self.evaluate(&elif.condition, environment, context)?.is_truthy() {
                return self.interpret_statements(&elif.body, environment, context);
            }
        }
        match else_branch {
            Some(else_branch) => self.interpret_statements(else_branch, environment, context),
            None => Ok(ProgramState::Run),
        }
    }

    fn interpret_while_statement(
        &mut self,
        condition: &Expression,
        body: &Statement,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<ProgramState> {
        self.in_loop(|this| {
            while this.evaluate(condition, environment, context)?.is_truthy() {
                match this.interpret_statement(body, environment, context)? {
                    ProgramState::Return(value) => return Ok(ProgramState::Return(value)),
                    ProgramState::Break => break,
                    ProgramState::Continue | ProgramState::Run => {}
                }
            }
            Ok(ProgramState::Run)
        })
    }

    fn interpret_classic_for_statement(
        &mut self,
        initializer: Option<&Statement>,
        condition: &Expression,
        increment: &Expression,
        body: &Statement,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<ProgramState> {
        // The loop variable stays visible after the loop.
        if let Some(initializer) = initializer {
            self.interpret_statement(initializer, environment, context)?;
        }

        self.in_loop(|this| {
            while this.evaluate(condition, environment, context)?.is_truthy() {
                match this.interpret_statement(body, environment, context)? {
                    ProgramState::Return(value) => return Ok(ProgramState::Return(value)),
                    ProgramState::Break => break,
                    ProgramState::Continue | ProgramState::Run => {}
                }
                this.evaluate(increment, environment, context)?;
            }
            Ok(ProgramState::Run)
        })
    }

    fn interpret_enhanced_for_statement(
        &mut self,
        keyword: &Token,
        identifiers: &[Token],
        collection: &Expression,
        body: &Statement,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<ProgramState> {
        let collection = self.evaluate(collection, environment, context)?;
        let error = |kind| RuntimeError::new(kind, keyword);

        // Each iteration binds one value per identifier.
        let rows: Vec<Vec<Value>> = match collection {
            Value::List(list) if identifiers.len() == 1 => {
                list.snapshot().into_iter().map(|value| vec![value]).collect()
            }
            Value::List(list) => list
                .snapshot()
                .into_iter()
                .map(|value| match value {
                    Value::List(inner) if inner.len() == identifiers.len() => Ok(inner.snapshot()),
                    Value::List(_) => Err(error(RuntimeErrorKind::WrongNumberOfValues)),
                    _ => Err(error(RuntimeErrorKind::CannotUnpack)),
                })
                .collect::<EvalResult<_>>()?,
            Value::Dict(_) if identifiers.len() > 2 => {
                return Err(error(RuntimeErrorKind::ExpectedIdentifiersDict));
            }
            Value::Dict(dict) => dict
                .entries()
                .into_iter()
                .map(|(key, value)| {
                    if identifiers.len() == 1 {
                        vec![key]
                    } else {
                        vec![key, value]
                    }
                })
                .collect(),
            _ => return Err(error(RuntimeErrorKind::ExpectedCollection)),
        };

        let scope = environment.new_scope();
        self.in_loop(|this| {
            for row in rows {
                for (identifier, value) in identifiers.iter().zip(row) {
                    scope.declare(&identifier.lexeme, value);
                }
                match this.interpret_statement(body, &scope, context)? {
                    ProgramState::Return(value) => return Ok(ProgramState::Return(value)),
                    ProgramState::Break => break,
                    ProgramState::Continue | ProgramState::Run => {}
                }
            }
            Ok(ProgramState::Run)
        })
    }

    fn interpret_class_declaration(
        &mut self,
        declaration: &ClassDecl,
        environment: &SharedEnvironment,
    ) -> EvalResult<ProgramState> {
        let super_class = match &declaration.super_class {
            Some(token) => match environment.access(&token.lexeme) {
                Some(Value::Class(class)) => Some(class),
                Some(_) => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::ExpectedClass,
                        &declaration.name,
                    ))
                }
                None => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::UndefinedVariable,
                        token,
                    ))
                }
            },
            None => None,
        };

        let method_environment = match &super_class {
            Some(super_class) => {
                let scope = environment.new_scope();
                scope.declare("super", Value::Class(super_class.clone()));
                scope
            }
            None => environment.clone(),
        };

        let collect = |declarations: &[Arc<FunctionDecl>], methods: bool| {
            declarations
                .iter()
                .map(|declaration| {
                    let mut method = self.create_function(declaration, &method_environment);
                    method.is_initializer = methods && method.name() == "init";
                    (method.name().to_compact_string(), Arc::new(method))
                })
                .collect::<HashMap<CompactString, Arc<Function>>>()
        };

        let class = Class {
            name: declaration.name.lexeme.clone(),
            super_class,
            methods: collect(&declaration.methods, true),
            static_methods: collect(&declaration.static_methods, false),
        };
        environment.declare(&declaration.name.lexeme, Value::Class(Arc::new(class)));
        Ok(ProgramState::Run)
    }

    /// Tracks loop nesting around `body`, even when it fails.
    fn in_loop<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        self.call_stack.enter_loop();
        let result = body(self);
        self.call_stack.leave_loop();
        result
    }

    fn check_inside_loop(&self, keyword: &Token) -> EvalResult<()> {
        if self.call_stack.inside_loop() {
            Ok(())
        } else {
            Err(RuntimeError::new(
                RuntimeErrorKind::OnlyAllowedInsideLoop,
                keyword,
            ))
        }
    }

    fn create_function(
        &self,
        declaration: &Arc<FunctionDecl>,
        environment: &SharedEnvironment,
    ) -> Function {
        Function::new(declaration.clone(), environment.clone(), false)
    }
}

// Expression evaluator
impl TreeWalkInterpreter {
    fn evaluate_all(
        &mut self,
        expressions: &[Expression],
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(expressions.len());
        for expression in expressions {
            values.push(self.evaluate(expression, environment, context)?);
        }
        Ok(values)
    }

    fn evaluate_binary(
        &mut self,
        left: &Expression,
        operator: &Token,
        right: &Expression,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        let lhs = self.evaluate(left, environment, context)?;
        let rhs = self.evaluate(right, environment, context)?;
        let tag = Operator::from_binary(operator.kind)
            .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::UndefinedOperation, operator))?;
        let dispatch =
            operator::binary(tag, &lhs, &rhs).map_err(|kind| RuntimeError::new(kind, operator))?;
        self.resolve_dispatch(dispatch, operator, context)
    }

    fn evaluate_unary(
        &mut self,
        operator: &Token,
        operand: &Expression,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        let operand = self.evaluate(operand, environment, context)?;
        match operator.kind {
            TokenKind::KeywordNot => Ok(Value::Bool(!operand.is_truthy())),
            TokenKind::Minus => {
                let dispatch = operator::unary(Operator::Neg, &operand)
                    .map_err(|kind| RuntimeError::new(kind, operator))?;
                self.resolve_dispatch(dispatch, operator, context)
            }
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::UndefinedOperation,
                operator,
            )),
        }
    }

    fn resolve_dispatch(
        &mut self,
        dispatch: Dispatch,
        token: &Token,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        match dispatch {
            Dispatch::Resolved(value) => Ok(value),
            Dispatch::Call { callee, arguments } => {
                self.call_value(callee, arguments, token, context)
            }
        }
    }

    fn evaluate_logical(
        &mut self,
        left: &Expression,
        operator: &Token,
        right: &Expression,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        let lhs = self.evaluate(left, environment, context)?.is_truthy();
        let value = match operator.kind {
            TokenKind::KeywordOr if lhs => true,
            TokenKind::KeywordAnd if !lhs => false,
            TokenKind::KeywordOr | TokenKind::KeywordAnd => {
                self.evaluate(right, environment, context)?.is_truthy()
            }
            _ => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::UndefinedOperation,
                    operator,
                ))
            }
        };
        Ok(Value::Bool(value))
    }

    fn evaluate_assign(
        &mut self,
        name: &Token,
        value: &Expression,
        access: Option<&Access>,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        let value = self.evaluate(value, environment, context)?;
        match access {
            Some(access) => self.assign_access(access, value.clone(), environment, context)?,
            None => environment
                .assign(&name.lexeme, value.clone())
                .map_err(|kind| RuntimeError::new(kind, name))?,
        }
        Ok(value)
    }

    fn evaluate_set(
        &mut self,
        object: &Expression,
        name: &Token,
        value: &Expression,
        access: Option<&Access>,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        let object = self.evaluate(object, environment, context)?;
        if matches!(
            object,
            Value::Nil | Value::Function(_) | Value::NativeFunction(_)
        ) {
            return Err(RuntimeError::new(RuntimeErrorKind::ExpectedObject, name));
        }

        let value = self.evaluate(value, environment, context)?;
        if let Some(access) = access {
            self.assign_access(access, value.clone(), environment, context)?;
            return Ok(value);
        }

        match &object {
            Value::Instance(instance) => instance.set_field(&name.lexeme, value.clone()),
            Value::NativeObject(native) => native
                .set(&name.lexeme, value.clone())
                .map_err(|kind| RuntimeError::new(kind, name))?,
            _ => return Err(RuntimeError::new(RuntimeErrorKind::ReadOnly, name)),
        }
        Ok(value)
    }

    fn get_property(&self, object: &Value, name: &Token) -> EvalResult<Value> {
        let undefined = || RuntimeError::new(RuntimeErrorKind::UndefinedProperty, name);
        let length = |length: usize| {
            if name.lexeme == "length" {
                Ok(Value::Number(length as f64))
            } else {
                Err(undefined())
            }
        };

        match object {
            Value::Instance(instance) => {
                if let Some(field) = instance.get_field(&name.lexeme) {
                    return Ok(field);
                }
                instance
                    .class
                    .find_method(&name.lexeme)
                    .map(|method| Value::Function(Arc::new(method.bind(instance.clone()))))
                    .ok_or_else(undefined)
            }
            Value::Class(class) => class
                .static_methods
                .get(name.lexeme.as_str())
                .map(|method| Value::Function(method.clone()))
                .ok_or_else(undefined),
            Value::String(value) => length(value.chars().count()),
            Value::List(list) => length(list.len()),
            Value::Dict(dict) => length(dict.len()),
            Value::Number(_) | Value::Bool(_) => Err(undefined()),
            Value::NativeObject(native) => native.get(&name.lexeme).ok_or_else(undefined),
            Value::Nil | Value::Function(_) | Value::NativeFunction(_) => {
                Err(RuntimeError::new(RuntimeErrorKind::ExpectedObject, name))
            }
        }
    }

    fn evaluate_super(
        &self,
        keyword: &Token,
        method: &Token,
        environment: &SharedEnvironment,
    ) -> EvalResult<Value> {
        let (Some(Value::Class(super_class)), Some(Value::Instance(instance))) =
            (environment.access("super"), environment.access("this"))
        else {
            return Err(RuntimeError::new(
                RuntimeErrorKind::UndefinedVariable,
                keyword,
            ));
        };
        super_class
            .find_method(&method.lexeme)
            .map(|found| Value::Function(Arc::new(found.bind(instance))))
            .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::MethodNotFound, method))
    }

    fn evaluate_access(
        &mut self,
        access: &Access,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        let object = self.evaluate(&access.object, environment, context)?;
        let error = |kind| RuntimeError::new(kind, &access.bracket);
        match object {
            Value::Dict(dict) => {
                let key = self.evaluate_key(access, environment, context)?;
                Ok(dict.get(&key).map_err(error)?.unwrap_or(Value::Nil))
            }
            Value::List(list) => {
                let slice = self.evaluate_slice(access, environment, context)?;
                match slice.select(&list.snapshot()).map_err(error)? {
                    Selection::Element(value) => Ok(value),
                    Selection::Range(values) => Ok(Value::List(List::new(values))),
                }
            }
            Value::String(value) => {
                let slice = self.evaluate_slice(access, environment, context)?;
                let characters: Vec<char> = value.chars().collect();
                match slice.select(&characters).map_err(error)? {
                    Selection::Element(character) => {
                        Ok(Value::String(character.to_compact_string()))
                    }
                    Selection::Range(characters) => {
                        Ok(Value::String(characters.into_iter().collect()))
                    }
                }
            }
            _ => Err(error(RuntimeErrorKind::InvalidAccess)),
        }
    }

    /// Stores into the slot named by the outermost access of an assignment target.
    fn assign_access(
        &mut self,
        access: &Access,
        value: Value,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<()> {
        let container = self.evaluate(&access.object, environment, context)?;
        let error = |kind| RuntimeError::new(kind, &access.bracket);
        match container {
            Value::Dict(dict) => {
                let key = self.evaluate_key(access, environment, context)?;
                dict.insert(key, value).map_err(error)
            }
            Value::List(list) => match self.evaluate_slice(access, environment, context)? {
                Slice::Index(index) if index < 0 => Err(error(RuntimeErrorKind::IndexOutOfRange)),
                Slice::Index(index) => list.set(index as usize, value).map_err(error),
                Slice::Range { .. } => Err(error(RuntimeErrorKind::InvalidAccess)),
            },
            _ => Err(error(RuntimeErrorKind::InvalidAccess)),
        }
    }

    /// Dictionaries are only indexed by a single key.
    fn evaluate_key(
        &mut self,
        access: &Access,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        match &access.first {
            Some(key) if access.is_index() => self.evaluate(key, environment, context),
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::ExpectedKey,
                &access.bracket,
            )),
        }
    }

    fn evaluate_slice(
        &mut self,
        access: &Access,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Slice> {
        if let (Some(colon), None) = (&access.second_colon, &access.third) {
            return Err(RuntimeError::new(RuntimeErrorKind::ExpectedStep, colon));
        }

        let first = self.evaluate_component(access.first.as_deref(), access, environment, context)?;
        if access.is_index() {
            return first.map(Slice::Index).ok_or_else(|| {
                RuntimeError::new(RuntimeErrorKind::InvalidAccess, &access.bracket)
            });
        }
        let second =
            self.evaluate_component(access.second.as_deref(), access, environment, context)?;
        let third = self.evaluate_component(access.third.as_deref(), access, environment, context)?;
        Ok(Slice::Range {
            start: first,
            end: second,
            step: third,
        })
    }

    fn evaluate_component(
        &mut self,
        component: Option<&Expression>,
        access: &Access,
        environment: &SharedEnvironment,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Option<i64>> {
        let Some(component) = component else {
            return Ok(None);
        };
        match self.evaluate(component, environment, context)? {
            Value::Number(value) => Ok(Some(value as i64)),
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::OnlyNumbers,
                &access.bracket,
            )),
        }
    }
}

// Calls
impl TreeWalkInterpreter {
    fn call_value(
        &mut self,
        callee: Value,
        arguments: Vec<Value>,
        token: &Token,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        match callee {
            Value::Function(function) => self.call_function(&function, arguments, token, context),
            Value::Class(class) => self.instantiate(class, arguments, token, context),
            Value::NativeFunction(native) => native
                .call(context, &arguments)
                .map_err(|kind| RuntimeError::new(kind, token)),
            _ => Err(RuntimeError::new(RuntimeErrorKind::OnlyFunctions, token)),
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        arguments: Vec<Value>,
        token: &Token,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        if arguments.len() != function.arity() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidNumberOfArguments,
                token,
            ));
        }
        if self.call_stack.depth() >= self.max_call_depth {
            return Err(RuntimeError::new(RuntimeErrorKind::MaxRecursion, token));
        }

        let environment = function.closure.new_scope();
        for (parameter, argument) in function.declaration.parameters.iter().zip(arguments) {
            environment.declare(&parameter.lexeme, argument);
        }

        tracing::trace!(function = function.name(), depth = self.call_stack.depth(), "call");
        self.call_stack.enter_function(function.name());
        let result = ensure_sufficient_stack(|| match &function.declaration.body {
            FunctionBody::Block(statements) => self
                .interpret_statements(statements, &environment, context)
                .map(|state| match state {
                    ProgramState::Return(value) => value,
                    _ => Value::Nil,
                }),
            FunctionBody::Expression(expression) => {
                self.evaluate(expression, &environment, context)
            }
        });
        self.call_stack
            .leave_function(function.name())
            .map_err(|error| RuntimeError::new(error.into(), token))?;
        let value = result?;

        if function.is_initializer {
            return function
                .closure
                .access("this")
                .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::UndefinedVariable, token));
        }
        Ok(value)
    }

    fn instantiate(
        &mut self,
        class: Arc<Class>,
        arguments: Vec<Value>,
        token: &Token,
        context: &mut dyn SystemContext,
    ) -> EvalResult<Value> {
        let instance = Arc::new(Instance::new(class.clone()));
        match class.find_method("init") {
            Some(initializer) => {
                let initializer = initializer.bind(instance.clone());
                self.call_function(&initializer, arguments, token, context)?;
            }
            None if !arguments.is_empty() => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::InvalidNumberOfArguments,
                    token,
                ))
            }
            None => {}
        }
        Ok(Value::Instance(instance))
    }
}
