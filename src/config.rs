use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticStyle {
    /// `Error on line N` followed by the indented message.
    #[default]
    Basic,
    /// Rendered with ariadne against the source text.
    Pretty,
}

#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Location of the running script. Imports resolve relative to its directory.
    pub path: Option<PathBuf>,
    pub max_call_depth: usize,
    pub diagnostics: DiagnosticStyle,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            diagnostics: DiagnosticStyle::Basic,
        }
    }
}

impl InterpreterConfig {
    pub fn with_path(&self, path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            ..self.clone()
        }
    }

    /// Resolves a module path against the script directory, or the working directory.
    pub fn resolve(&self, module: &str) -> PathBuf {
        let module = Path::new(module);
        if module.is_absolute() {
            return module.to_path_buf();
        }
        match self.path.as_deref().and_then(Path::parent) {
            Some(base) => base.join(module),
            None => module.to_path_buf(),
        }
    }
}
