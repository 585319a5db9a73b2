//! FILENAME: parser/src/lib.rs
//! PURPOSE: Library root for the calculated-characteristic formula parser.
//! CONTEXT: This crate exposes the path model, lexer, parser, path resolver
//! and AST needed to convert formula strings into evaluatable expression
//! trees, plus the operation contract the engine implements.
//!
//! PIPELINE: Formula String --> Lexer --> Tokens --> Parser --> AST --> Evaluator
//!
//! SUPPORTED FEATURES:
//! - Arithmetic: +, -, *, / with the usual precedence
//! - Unary sign: -5, +5
//! - Constants and function calls from an OperationCatalog: max({a}; {b}), PI
//! - References: {Char}, {../Part/Char}, {/Part/"Char 1"}, {Char(17)} for attribute 17
//! - Parentheses for grouping

pub mod ast;
pub mod catalog;
pub mod error;
pub mod lexer;
pub mod operation;
pub mod parser;
pub mod path;
pub mod path_resolver;
pub mod token;


// Re-export commonly used types for convenience
pub use ast::{Expression, ExpressionKind, OperationRef, Span};
pub use catalog::{Constant, OperationCatalog};
pub use error::{CircularReferenceError, EvalResult, EvaluationError, ParseResult, SyntaxError};
pub use lexer::Lexer;
pub use operation::{Arity, DependencyContext, DependencyOccurrence, Operation, OperationContext};
pub use parser::{parse, Parser};
pub use path::{Path, PathSegment, SegmentKind};
pub use path_resolver::{
    DefaultPathResolver, DefaultPathResolverFactory, PathResolver, PathResolverFactory,
};
pub use token::{Token, TokenKind};
