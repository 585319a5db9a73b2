//! FILENAME: parser/src/operation.rs
//! PURPOSE: The contract between the formula tree and the functions it calls.
//! CONTEXT: Function nodes hold a shared, stateless Operation. The engine
//! supplies the contexts: an OperationContext while evaluating and a
//! DependencyContext while collecting referenced paths.

use crate::ast::{Expression, Span};
use crate::error::EvalResult;
use crate::path::Path;

/// How many arguments an operation accepts. Checked at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => count >= min && count <= max,
            Arity::AtLeast(min) => count >= min,
            Arity::Any => true,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{} to {}", min, max),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

/// What an operation can ask of the evaluator.
pub trait OperationContext {
    /// Evaluates an argument expression. `Ok(None)` means "no value".
    fn evaluate(&self, expr: &Expression) -> EvalResult<Option<f64>>;

    /// The value of the entity at `path`: its formula result if it is
    /// calculated, its measured value otherwise.
    fn value_of(&self, path: &Path) -> EvalResult<Option<f64>>;

    /// Direct children of the entity at `path`.
    fn child_paths(&self, path: &Path) -> Vec<Path>;
}

/// What a custom dependency extractor can ask of the engine.
pub trait DependencyContext {
    fn child_paths(&self, path: &Path) -> Vec<Path>;

    /// The formula text the tree was parsed from.
    fn source(&self) -> &str;
}

/// One textual reference to a path within a formula.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyOccurrence {
    pub path: Path,
    pub span: Span,
    pub raw: String,
    pub attribute: Option<u16>,
}

impl DependencyOccurrence {
    pub fn new(path: Path, span: Span, raw: impl Into<String>, attribute: Option<u16>) -> Self {
        DependencyOccurrence {
            path,
            span,
            raw: raw.into(),
            attribute,
        }
    }
}

/// A named, stateless function or operator usable in formulas.
pub trait Operation: Send + Sync {
    fn name(&self) -> &str;

    fn arity(&self) -> Arity {
        Arity::Any
    }

    /// Computes the result from unevaluated arguments.
    /// Operations decide themselves how missing argument values propagate.
    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>>;

    /// Custom dependency extraction. Returning `None` lets the engine
    /// recurse into the arguments with the default rule.
    fn extract_dependencies(
        &self,
        _args: &[Expression],
        _ctx: &dyn DependencyContext,
    ) -> Option<Vec<DependencyOccurrence>> {
        None
    }
}
