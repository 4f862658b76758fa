use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FrameError {
    #[error("Leaving function {actual} but the active frame is {expected}")]
    Mismatch {
        expected: CompactString,
        actual: CompactString,
    },
    #[error("The call stack is empty")]
    Empty,
}

#[derive(Debug, Clone)]
struct CallFrame {
    function: CompactString,
    loop_count: usize,
}

/// Function and loop nesting, shared by the parser and the evaluator to validate `break`/`continue`.
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: Vec<CallFrame>,
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStack {
    /// A stack holding only the root frame.
    pub fn new() -> Self {
        Self {
            frames: vec![CallFrame {
                function: CompactString::default(),
                loop_count: 0,
            }],
        }
    }

    /// Number of frames above the root frame.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn enter_function(&mut self, name: &str) {
        self.frames.push(CallFrame {
            function: name.into(),
            loop_count: 0,
        });
    }

    pub fn leave_function(&mut self, name: &str) -> Result<(), FrameError> {
        match self.frames.last() {
            Some(frame) if frame.function == name => {
                self.frames.pop();
                Ok(())
            }
            Some(frame) => Err(FrameError::Mismatch {
                expected: frame.function.clone(),
                actual: name.into(),
            }),
            None => Err(FrameError::Empty),
        }
    }

    pub fn enter_loop(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.loop_count += 1;
        }
    }

    pub fn leave_loop(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.loop_count = frame.loop_count.saturating_sub(1);
        }
    }

    pub fn inside_loop(&self) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.loop_count != 0)
    }
}
