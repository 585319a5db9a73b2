//! FILENAME: parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for formula expressions.
//! CONTEXT: After the Lexer tokenizes a formula string, the Parser converts
//! those tokens into this tree structure. The Evaluator then traverses
//! this tree to compute the final result, and the dependency extractor walks
//! it to find referenced characteristics.
//!
//! Nodes are immutable once parsed. Every node carries the span of source
//! text it was parsed from; Function and Negate nodes own their children.

use crate::operation::Operation;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A region of the formula text, as byte offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub length: usize,
}

impl Span {
    pub fn new(start: usize, length: usize) -> Self {
        Span { start, length }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Span covering `self` through `other`.
    pub fn to(&self, other: Span) -> Span {
        let end = self.end().max(other.end());
        Span::new(self.start, end - self.start)
    }

    /// The covered text, or an empty string if the span does not fit `source`.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end()).unwrap_or("")
    }
}

/// Shared handle to a catalog operation stored inside a Function node.
/// Two handles are equal if they name the same operation.
#[derive(Clone)]
pub struct OperationRef(pub Arc<dyn Operation>);

impl OperationRef {
    pub fn name(&self) -> &str {
        self.0.name()
    }
}

impl std::ops::Deref for OperationRef {
    type Target = dyn Operation;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for OperationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operation({})", self.0.name())
    }
}

impl PartialEq for OperationRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.name().eq_ignore_ascii_case(other.0.name())
    }
}

/// A parsed formula expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

/// The node variants of a formula tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// A numeric literal.
    Number(f64),

    /// A named catalog constant such as PI.
    Constant { name: String, value: f64 },

    /// Placeholder text that could not be given meaning. Evaluating it fails.
    /// Successful parses of well-formed input never produce it.
    Literal(String),

    /// A reference to another entity's value, or with `attribute` set,
    /// to one of its attributes. The path is always absolute.
    Characteristic {
        path: Path,
        attribute: Option<u16>,
    },

    /// Unary arithmetic negation.
    Negate(Box<Expression>),

    /// A named operation applied to an ordered argument list.
    /// Binary operators are Function nodes named `+ - * /`.
    Function {
        name: String,
        operation: OperationRef,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Expression { kind, span }
    }

    pub fn number(value: f64, span: Span) -> Self {
        Self::new(ExpressionKind::Number(value), span)
    }

    pub fn characteristic(path: Path, attribute: Option<u16>, span: Span) -> Self {
        Self::new(ExpressionKind::Characteristic { path, attribute }, span)
    }

    pub fn negate(operand: Expression, span: Span) -> Self {
        Self::new(ExpressionKind::Negate(Box::new(operand)), span)
    }

    pub fn function(operation: Arc<dyn Operation>, args: Vec<Expression>, span: Span) -> Self {
        Self::new(
            ExpressionKind::Function {
                name: operation.name().to_string(),
                operation: OperationRef(operation),
                args,
            },
            span,
        )
    }

    /// Direct children in source order.
    pub fn children(&self) -> &[Expression] {
        match &self.kind {
            ExpressionKind::Negate(operand) => std::slice::from_ref(operand.as_ref()),
            ExpressionKind::Function { args, .. } => args,
            _ => &[],
        }
    }

    /// The referenced path, if this node is a characteristic reference.
    pub fn as_characteristic(&self) -> Option<(&Path, Option<u16>)> {
        match &self.kind {
            ExpressionKind::Characteristic { path, attribute } => Some((path, *attribute)),
            _ => None,
        }
    }

    /// True if the rendered text of this node starts with `-`.
    fn renders_with_sign(&self) -> bool {
        match &self.kind {
            ExpressionKind::Negate(_) => true,
            ExpressionKind::Number(n) => n.is_sign_negative(),
            _ => false,
        }
    }
}

fn is_infix(name: &str) -> bool {
    matches!(name, "+" | "-" | "*" | "/")
}

/// Renders the tree back to formula text. References are written as absolute paths,
/// so the output parses to an equal tree regardless of the anchor.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Number(n) => write!(f, "{}", n),
            ExpressionKind::Constant { name, .. } => write!(f, "{}", name),
            ExpressionKind::Literal(text) => write!(f, "{}", text),
            ExpressionKind::Characteristic { path, attribute } => match attribute {
                Some(key) => write!(f, "{{{}({})}}", path, key),
                None => write!(f, "{{{}}}", path),
            },
            // A sign may not follow a sign.
            ExpressionKind::Negate(operand) if operand.renders_with_sign() => {
                write!(f, "-({})", operand)
            }
            ExpressionKind::Negate(operand) => write!(f, "-{}", operand),
            ExpressionKind::Function { name, args, .. } if is_infix(name) && args.len() == 2 => {
                write!(f, "({} {} {})", args[0], name, args[1])
            }
            ExpressionKind::Function { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
