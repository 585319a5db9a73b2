//! FILENAME: engine/src/builtins/arithmetic.rs
//! PURPOSE: Binary operators and two-argument math functions.
//! CONTEXT: Any missing operand makes the result missing.

use super::argument;
use charformula_parser::{Arity, EvalResult, Expression, Operation, OperationCatalog, OperationContext};

/// A two-argument function over plain numbers.
/// `apply` returns `None` where the result is undefined.
pub struct BinaryFunction {
    name: &'static str,
    apply: fn(f64, f64) -> Option<f64>,
}

impl BinaryFunction {
    pub const fn new(name: &'static str, apply: fn(f64, f64) -> Option<f64>) -> Self {
        BinaryFunction { name, apply }
    }
}

impl Operation for BinaryFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::Exact(2)
    }

    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>> {
        let left = argument(args, 0, ctx)?;
        let right = argument(args, 1, ctx)?;
        match (left, right) {
            (Some(l), Some(r)) => Ok((self.apply)(l, r)),
            _ => Ok(None),
        }
    }
}

fn divide(l: f64, r: f64) -> Option<f64> {
    if r == 0.0 {
        None
    } else {
        Some(l / r)
    }
}

/// Logarithm of `x` to `base`.
fn log_base(x: f64, base: f64) -> Option<f64> {
    if base <= 0.0 || base == 1.0 {
        return None;
    }
    Some(x.ln() / base.ln())
}

pub(super) fn register(catalog: &mut OperationCatalog) {
    let functions = [
        BinaryFunction::new("+", |l, r| Some(l + r)),
        BinaryFunction::new("-", |l, r| Some(l - r)),
        BinaryFunction::new("*", |l, r| Some(l * r)),
        BinaryFunction::new("/", divide),
        BinaryFunction::new("pow", |l, r| Some(l.powf(r))),
        BinaryFunction::new("atan2", |y, x| Some(y.atan2(x))),
        BinaryFunction::new("log", log_base),
    ];
    for function in functions {
        catalog.register(std::sync::Arc::new(function));
    }
}
