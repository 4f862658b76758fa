use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use grotsky::config::{DiagnosticStyle, InterpreterConfig, DEFAULT_MAX_CALL_DEPTH};
use std::path::PathBuf;
use std::{fs::read_to_string, process::ExitCode};

#[derive(Debug, Parser)]
#[clap(name = "grotsky", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: GrotskyCommand,
}

#[derive(Debug, Subcommand)]
pub enum GrotskyCommand {
    /// Print the token stream of a script.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Print the syntax tree of a script.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "source")]
        format: ProgramFormat,
    },
    /// Run a script.
    Run {
        path: PathBuf,
        #[clap(long = "diagnostics", value_enum, default_value = "basic")]
        diagnostics: DiagnosticFormat,
        #[clap(long = "max-call-depth", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
        max_call_depth: usize,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    Source,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum DiagnosticFormat {
    Basic,
    Pretty,
}

fn main() -> ExitCode {
    grotsky_main().expect("Encountered an error!")
}

fn grotsky_main() -> Result<ExitCode> {
    color_eyre::install().expect("Can't fail at first call!");
    init_tracing();
    let args = CLArgs::parse();
    let succeeded = match args.routine {
        GrotskyCommand::Tokenize { path, format } => {
            let src = read_to_string(path)?;
            tokenize(&src, &format)
        }
        GrotskyCommand::Parse { path, format } => {
            let src = read_to_string(path)?;
            parse(&src, &format)
        }
        GrotskyCommand::Run {
            path,
            diagnostics,
            max_call_depth,
        } => {
            let src = read_to_string(&path)?;
            let config = InterpreterConfig {
                path: Some(path),
                max_call_depth,
                diagnostics: match diagnostics {
                    DiagnosticFormat::Basic => DiagnosticStyle::Basic,
                    DiagnosticFormat::Pretty => DiagnosticStyle::Pretty,
                },
            };
            run(&src, &config)
        }
    };
    if succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(65))
    }
}

/// Installs a subscriber only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn tokenize(src: &str, format: &TokenFormat) -> bool {
    use grotsky::lexer::formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter};
    use grotsky::lexer::{Lexer, TokenKind};

    let mut scanner = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&scanner)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&scanner)),
    };
    let mut succeeded = true;
    loop {
        match scanner.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    return succeeded;
                }
            }
            Err(error) => {
                eprintln!("{}", formatter.format_lexical_error(&error));
                succeeded = false;
            }
        };
    }
}

fn parse(src: &str, format: &ProgramFormat) -> bool {
    use grotsky::diagnostic::{BasicFormatter, DiagnosticFormatter};
    use grotsky::driver::{compile, CompileError};
    use grotsky::parser::formatter::{DebugFormatter, ProgramFormatter, SourceFormatter};

    let formatter: Box<dyn ProgramFormatter> = match format {
        ProgramFormat::Debug => Box::new(DebugFormatter),
        ProgramFormat::Source => Box::new(SourceFormatter),
    };
    match compile(src) {
        Ok(program) => {
            print!("{}", formatter.format(&program));
            true
        }
        Err(CompileError::Lexical(errors)) => {
            for error in &errors {
                eprintln!("{}", BasicFormatter.format_lexical(error));
            }
            false
        }
        Err(CompileError::Parser(errors)) => {
            for error in &errors {
                eprintln!("{}", BasicFormatter.format_parser(error));
            }
            false
        }
    }
}

fn run(src: &str, config: &InterpreterConfig) -> bool {
    use grotsky::driver::run_source;
    use grotsky::interpreter::context::StdioContext;

    run_source(src, config, &mut StdioContext)
}
