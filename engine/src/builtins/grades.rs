//! FILENAME: engine/src/builtins/grades.rs
//! PURPOSE: Aggregations over all direct children of an entity.
//! CONTEXT: `grade_max({Grade})` reads every child of Grade. The formula
//! therefore depends on those children, which the operation reports itself.

use super::referenced_path;
use super::statistics;
use charformula_parser::{
    Arity, DependencyContext, DependencyOccurrence, EvalResult, Expression, Operation,
    OperationCatalog, OperationContext,
};
use std::sync::Arc;

pub struct GradeAggregate {
    name: &'static str,
    reduce: fn(&[f64]) -> Option<f64>,
}

impl GradeAggregate {
    pub const fn new(name: &'static str, reduce: fn(&[f64]) -> Option<f64>) -> Self {
        GradeAggregate { name, reduce }
    }
}

impl Operation for GradeAggregate {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>> {
        let Some(group) = args.first().and_then(referenced_path) else {
            return Ok(None);
        };

        let mut values = Vec::new();
        for child in ctx.child_paths(group) {
            if let Some(v) = ctx.value_of(&child)? {
                values.push(v);
            }
        }
        Ok((self.reduce)(&values))
    }

    fn extract_dependencies(
        &self,
        args: &[Expression],
        ctx: &dyn DependencyContext,
    ) -> Option<Vec<DependencyOccurrence>> {
        let occurrences = args
            .iter()
            .filter_map(|arg| referenced_path(arg).map(|group| (arg, group)))
            .flat_map(|(arg, group)| {
                let raw = arg.span.slice(ctx.source()).to_string();
                ctx.child_paths(group)
                    .into_iter()
                    .map(move |child| DependencyOccurrence::new(child, arg.span, raw.clone(), None))
            })
            .collect();
        Some(occurrences)
    }
}

pub(super) fn register(catalog: &mut OperationCatalog) {
    let grades = [
        GradeAggregate::new("grade_max", statistics::max),
        GradeAggregate::new("grade_min", statistics::min),
        GradeAggregate::new("grade_mean", statistics::mean),
    ];
    for grade in grades {
        catalog.register(Arc::new(grade));
    }
}
