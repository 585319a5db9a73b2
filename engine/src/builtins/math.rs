//! FILENAME: engine/src/builtins/math.rs
//! PURPOSE: Single-value math functions, rounding and null coalescing.

use super::argument;
use charformula_parser::{Arity, EvalResult, Expression, Operation, OperationCatalog, OperationContext};
use std::sync::Arc;

/// A one-argument function. A missing argument gives a missing result.
pub struct UnaryFunction {
    name: &'static str,
    apply: fn(f64) -> f64,
}

impl UnaryFunction {
    pub const fn new(name: &'static str, apply: fn(f64) -> f64) -> Self {
        UnaryFunction { name, apply }
    }
}

impl Operation for UnaryFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>> {
        Ok(argument(args, 0, ctx)?.map(self.apply))
    }
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// `round(x)` or `round(x; digits)`. Halves round away from zero.
/// Negative digits round to tens, hundreds and so on.
pub struct Round;

const MAX_ROUND_DIGITS: f64 = 15.0;

impl Operation for Round {
    fn name(&self) -> &str {
        "round"
    }

    fn arity(&self) -> Arity {
        Arity::Range(1, 2)
    }

    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>> {
        let Some(value) = argument(args, 0, ctx)? else {
            return Ok(None);
        };
        let digits = argument(args, 1, ctx)?
            .unwrap_or(0.0)
            .trunc()
            .clamp(-MAX_ROUND_DIGITS, MAX_ROUND_DIGITS) as i32;

        let rounded = if digits >= 0 {
            let multiplier = 10_f64.powi(digits);
            (value * multiplier).round() / multiplier
        } else {
            let divisor = 10_f64.powi(-digits);
            (value / divisor).round() * divisor
        };
        Ok(Some(rounded))
    }
}

/// Returns the first argument that has a value. Later arguments are not evaluated.
pub struct IfNull;

impl Operation for IfNull {
    fn name(&self) -> &str {
        "ifnull"
    }

    fn arity(&self) -> Arity {
        Arity::AtLeast(1)
    }

    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>> {
        for arg in args {
            if let Some(value) = ctx.evaluate(arg)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

pub(super) fn register(catalog: &mut OperationCatalog) {
    let functions = [
        UnaryFunction::new("abs", f64::abs),
        UnaryFunction::new("sign", sign),
        UnaryFunction::new("sqr", |x| x * x),
        UnaryFunction::new("sqrt", f64::sqrt),
        UnaryFunction::new("exp", f64::exp),
        UnaryFunction::new("ln", f64::ln),
        UnaryFunction::new("log10", f64::log10),
        UnaryFunction::new("floor", f64::floor),
        UnaryFunction::new("ceiling", f64::ceil),
        UnaryFunction::new("truncate", f64::trunc),
        UnaryFunction::new("sin", f64::sin),
        UnaryFunction::new("cos", f64::cos),
        UnaryFunction::new("tan", f64::tan),
        UnaryFunction::new("asin", f64::asin),
        UnaryFunction::new("acos", f64::acos),
        UnaryFunction::new("atan", f64::atan),
    ];
    for function in functions {
        catalog.register(Arc::new(function));
    }
    catalog.register(Arc::new(Round));
    catalog.register(Arc::new(IfNull));
}
