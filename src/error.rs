use std::fmt;

use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

/// What kind of symbol a failed lookup required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRequirement {
    VariableOrFunction,
    Function,
}

impl fmt::Display for NameRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameRequirement::VariableOrFunction => write!(f, "variable or function"),
            NameRequirement::Function => write!(f, "function"),
        }
    }
}

/// First error detected by any stage. Every variant aborts the compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("lex error: invalid character '{ch}' at offset {pos}")]
    Lex { ch: char, pos: usize },

    #[error("syntax error: expected {expected}, got {found} at offset {pos}")]
    Syntax {
        expected: &'static str,
        found: &'static str,
        pos: usize,
    },

    #[error("undefined name: {expected} '{name}' is not defined")]
    UndefinedName {
        name: String,
        expected: NameRequirement,
    },
}

impl CompileError {
    /// Short classification string used for logging.
    pub fn category(&self) -> &'static str {
        match self {
            CompileError::Lex { .. } => "lex",
            CompileError::Syntax { .. } => "syntax",
            CompileError::UndefinedName { .. } => "semantic",
        }
    }
}
