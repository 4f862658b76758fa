pub mod config;
pub mod diagnostic;
pub mod driver;
pub mod environment;
pub mod interpreter;
pub mod lexer;
mod native;
pub mod parser;
pub mod value;
