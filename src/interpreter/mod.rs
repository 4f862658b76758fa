pub mod context;
mod frame;
mod stack;
mod tree;

use crate::value::Value;
pub use frame::{CallStack, FrameError};
pub use tree::TreeWalkInterpreter;

/// Control-flow signal produced by a statement.
#[derive(Debug)]
pub enum ProgramState {
    Run,
    Return(Value),
    Break,
    Continue,
}

/// Where program output and diagnostics are written.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);

    fn report(&mut self, text: &str) {
        self.writeln(text);
    }
}
