//! FILENAME: engine/src/builtins/statistics.rs
//! PURPOSE: Aggregations over argument lists.
//! CONTEXT: Arguments without a value are skipped. An aggregation of
//! nothing has no value, except `count`, which is 0.

use super::present_values;
use charformula_parser::{Arity, EvalResult, Expression, Operation, OperationCatalog, OperationContext};
use std::sync::Arc;

/// Reduces the present argument values with `reduce`.
pub struct Aggregate {
    name: &'static str,
    reduce: fn(&[f64]) -> Option<f64>,
}

impl Aggregate {
    pub const fn new(name: &'static str, reduce: fn(&[f64]) -> Option<f64>) -> Self {
        Aggregate { name, reduce }
    }
}

impl Operation for Aggregate {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::AtLeast(1)
    }

    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>> {
        let values = present_values(args, ctx)?;
        if values.is_empty() {
            return Ok(None);
        }
        Ok((self.reduce)(&values))
    }
}

/// Number of arguments that have a value.
pub struct Count;

impl Operation for Count {
    fn name(&self) -> &str {
        "count"
    }

    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>> {
        Ok(Some(present_values(args, ctx)?.len() as f64))
    }
}

pub(crate) fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub(crate) fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub(crate) fn sum(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum())
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    sum(values).map(|total| total / values.len() as f64)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation. Needs at least two values.
pub(crate) fn stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((squares / (values.len() - 1) as f64).sqrt())
}

pub(super) fn register(catalog: &mut OperationCatalog) {
    let aggregates = [
        Aggregate::new("max", max),
        Aggregate::new("min", min),
        Aggregate::new("mean", mean),
        Aggregate::new("median", median),
        Aggregate::new("sum", sum),
        Aggregate::new("stddev", stddev),
    ];
    for aggregate in aggregates {
        catalog.register(Arc::new(aggregate));
    }
    catalog.register(Arc::new(Count));
}
