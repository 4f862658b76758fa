use crate::{
    config::{DiagnosticStyle, InterpreterConfig},
    diagnostic::{BasicFormatter, DiagnosticFormatter, PrettyFormatter},
    environment::SharedEnvironment,
    interpreter::{SystemContext, TreeWalkInterpreter},
    lexer::{LexicalError, Lexer},
    native,
    parser::{statement::Statement, Parser, ParserError},
    value::error::RuntimeError,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{} lexical error(s)", .0.len())]
    Lexical(Vec<LexicalError>),
    #[error("{} parse error(s)", .0.len())]
    Parser(Vec<ParserError>),
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("runtime error on line {line}: {0}", line = .0.line)]
    Runtime(#[from] RuntimeError),
}

/// Lexes and parses a source text. Lexical errors stop before parsing.
pub fn compile(source: &str) -> Result<Vec<Statement>, CompileError> {
    let (tokens, errors) = Lexer::new(source).tokenize();
    debug!(tokens = tokens.len(), errors = errors.len(), "lexed source");
    if !errors.is_empty() {
        return Err(CompileError::Lexical(errors));
    }

    let program = Parser::new(tokens).parse().map_err(CompileError::Parser)?;
    debug!(statements = program.len(), "parsed program");
    Ok(program)
}

/// The scope holding the native globals. Programs run in a child of it.
pub fn global_environment(config: &InterpreterConfig) -> SharedEnvironment {
    let globals = SharedEnvironment::new();
    native::define_globals(&globals, config);
    globals
}

/// Runs a program, writing its diagnostics to the context. Returns whether it succeeded.
#[tracing::instrument(level = "debug", skip_all)]
pub fn run_source(
    source: &str,
    config: &InterpreterConfig,
    context: &mut dyn SystemContext,
) -> bool {
    let path = config
        .path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<source>".into());
    let formatter: Box<dyn DiagnosticFormatter + '_> = match config.diagnostics {
        DiagnosticStyle::Basic => Box::new(BasicFormatter),
        DiagnosticStyle::Pretty => Box::new(PrettyFormatter::new(source, &path)),
    };

    let program = match compile(source) {
        Ok(program) => program,
        Err(CompileError::Lexical(errors)) => {
            for error in &errors {
                context.report(&formatter.format_lexical(error));
            }
            return false;
        }
        Err(CompileError::Parser(errors)) => {
            for error in &errors {
                context.report(&formatter.format_parser(error));
            }
            return false;
        }
    };

    let environment = global_environment(config).new_scope();
    match TreeWalkInterpreter::new(config).run(&program, &environment, context) {
        Ok(()) => {
            debug!("program finished");
            true
        }
        Err(error) => {
            debug!(code = error.code(), line = error.line, "program failed");
            context.report(&formatter.format_runtime(&error));
            false
        }
    }
}

/// Runs a module in its own global scope and returns the scope holding its top-level bindings.
pub fn load_module(
    path: &Path,
    config: &InterpreterConfig,
    context: &mut dyn SystemContext,
) -> Result<SharedEnvironment, ModuleError> {
    let source = std::fs::read_to_string(path).map_err(|source| ModuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = config.with_path(path);
    let program = compile(&source)?;

    let environment = global_environment(&config).new_scope();
    TreeWalkInterpreter::new(&config).run(&program, &environment, context)?;
    Ok(environment)
}
