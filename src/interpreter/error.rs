use std::{error::Error, fmt::Display};

/// Distinguishes plain runtime failures from gradual-typing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    Runtime,
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub message: String,
    pub kind: RuntimeErrorKind,
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> RuntimeError {
        RuntimeError {
            message: message.into(),
            kind: RuntimeErrorKind::Runtime,
        }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for RuntimeError {}

/// Raised by gradual-type enforcement: a declared base type did not
/// match the runtime type tag of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    /// Which declaration was violated: a variable, an assignment, a
    /// parameter, or a return site.
    pub location: String,
    pub expected: String,
    pub got: String,
}

impl Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TypeError: {}: Expected {}, got {}",
            self.location, self.expected, self.got
        )
    }
}

impl Error for TypeError {}

impl From<TypeError> for RuntimeError {
    fn from(error: TypeError) -> Self {
        RuntimeError {
            message: error.to_string(),
            kind: RuntimeErrorKind::Type,
        }
    }
}
