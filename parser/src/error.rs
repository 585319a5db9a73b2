//! FILENAME: parser/src/error.rs
//! PURPOSE: Error taxonomy shared by the parser and the engine.
//! CONTEXT: Syntax errors are raised while parsing. Circular references and
//! unevaluable literals are raised while evaluating or validating; the engine
//! decides per call site whether they surface or degrade to "no value".

use crate::path::Path;
use thiserror::Error;

/// Malformed formula text. `position` is the byte offset of the offending token.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Syntax error at position {position}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        SyntaxError {
            message: message.into(),
            position,
        }
    }
}

/// A characteristic depends on itself, directly or through other formulas.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", self.message())]
pub struct CircularReferenceError {
    /// The path whose dependencies were being validated.
    pub anchor: Path,
    /// The in-flight chain that closed the cycle, ending with the repeated path.
    pub cycle: Vec<Path>,
}

impl CircularReferenceError {
    pub fn new(anchor: Path, cycle: Vec<Path>) -> Self {
        CircularReferenceError { anchor, cycle }
    }

    pub fn message(&self) -> String {
        let chain = self
            .cycle
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        format!("Circular reference detected for '{}': {}", self.anchor, chain)
    }
}

/// Why a value could not be computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Circular(#[from] CircularReferenceError),

    #[error("Cannot evaluate literal '{0}'")]
    UnresolvedLiteral(String),
}

impl EvaluationError {
    pub fn is_circular(&self) -> bool {
        matches!(self, EvaluationError::Circular(_))
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, EvaluationError::Syntax(_))
    }
}

pub type ParseResult<T> = Result<T, SyntaxError>;
pub type EvalResult<T> = Result<T, EvaluationError>;
