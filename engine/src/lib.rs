//! FILENAME: engine/src/lib.rs
//! PURPOSE: Main library entry point for the calculated-characteristic engine.
//! CONTEXT: Re-exports public types and modules for use by host applications.
//! The parser crate is re-exported as `parser` so hosts need one dependency.

pub mod builtins;
pub mod dependency_extractor;
pub mod dependency_graph;
pub mod evaluator;
pub mod formula;
pub mod interpreter;
pub mod lookup;

#[cfg(test)]
mod test_support;

pub use charformula_parser as parser;

// Re-export commonly used types at the crate root
pub use charformula_parser::{
    Arity, CircularReferenceError, DependencyOccurrence, EvalResult, EvaluationError, Expression,
    ExpressionKind, Operation, OperationCatalog, ParseResult, Path, PathSegment, SegmentKind,
    SyntaxError,
};
pub use dependency_extractor::{extract_dependencies, DependencyMap};
pub use dependency_graph::DependencyResolver;
pub use evaluator::Evaluator;
pub use formula::CompiledFormula;
pub use interpreter::{default_catalog, FormulaInterpreter};
pub use lookup::{AttributeValue, PlanLookup, ValueLookup};
