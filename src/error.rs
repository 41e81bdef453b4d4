//! The crate-level error union.
//!
//! Lex, parse, and runtime failures all unwind to the host driver,
//! which renders them as `Error: <message>` on standard error. Type
//! errors travel as [RuntimeError]s with
//! [RuntimeErrorKind::Type](crate::interpreter::RuntimeErrorKind).

use std::{error::Error, fmt::Display};

use crate::interpreter::RuntimeError;
use crate::lexer::LexError;
use crate::parser::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum GsError {
    Lex(LexError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl Display for GsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GsError::Lex(error) => error.fmt(f),
            GsError::Parse(error) => error.fmt(f),
            GsError::Runtime(error) => error.fmt(f),
        }
    }
}

impl Error for GsError {}

impl From<LexError> for GsError {
    fn from(error: LexError) -> Self {
        GsError::Lex(error)
    }
}

impl From<ParseError> for GsError {
    fn from(error: ParseError) -> Self {
        GsError::Parse(error)
    }
}

impl From<RuntimeError> for GsError {
    fn from(error: RuntimeError) -> Self {
        GsError::Runtime(error)
    }
}
