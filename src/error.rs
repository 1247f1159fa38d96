use std::fmt;

/// Host-contract violations. Language-level problems never show up here; they
/// evaluate to `Value::Undefined` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    EmptySource,
    Stopped,
}

impl std::error::Error for RuntimeError {}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::EmptySource => write!(f, "empty code string"),
            RuntimeError::Stopped => write!(f, "runtime is stopped"),
        }
    }
}
