//! FILENAME: engine/src/builtins/mod.rs
//! PURPOSE: The built-in operation catalog.
//! CONTEXT: Every operation here is stateless and shared by all formulas
//! compiled against the default catalog. Null handling is per operation:
//! arithmetic propagates "no value", aggregations skip it.
//!
//! SUPPORTED FUNCTIONS:
//! - Operators: + - * /
//! - Math: abs, sign, sqr, sqrt, exp, ln, log10, log, pow, floor, ceiling,
//!         truncate, round, sin, cos, tan, asin, acos, atan, atan2
//! - Null handling: ifnull
//! - Statistics: max, min, mean, median, sum, stddev, count
//! - Geometry: pt_dist, pt_dist_xy, pt_dist_xz, pt_dist_yz, position, position3d
//! - Grades: grade_max, grade_min, grade_mean

mod arithmetic;
mod geometry;
mod grades;
mod math;
mod statistics;

pub use arithmetic::BinaryFunction;
pub use geometry::{Axis, PointDistance, TruePosition};
pub use grades::GradeAggregate;
pub use math::{IfNull, Round, UnaryFunction};
pub use statistics::{Aggregate, Count};

use charformula_parser::{EvalResult, Expression, OperationCatalog, OperationContext, Path};

/// Builds a fresh catalog with every built-in constant and operation.
pub fn default_catalog() -> OperationCatalog {
    let mut catalog = OperationCatalog::new()
        .with_constant("PI", std::f64::consts::PI)
        .with_constant("E", std::f64::consts::E);

    arithmetic::register(&mut catalog);
    math::register(&mut catalog);
    statistics::register(&mut catalog);
    geometry::register(&mut catalog);
    grades::register(&mut catalog);

    log::debug!(
        target: "FORMULA",
        "built default catalog with {} operations",
        catalog.operation_names().len()
    );
    catalog
}

/// Evaluates the argument at `index`; a missing argument has no value.
pub(crate) fn argument(
    args: &[Expression],
    index: usize,
    ctx: &dyn OperationContext,
) -> EvalResult<Option<f64>> {
    match args.get(index) {
        Some(arg) => ctx.evaluate(arg),
        None => Ok(None),
    }
}

/// Evaluates all arguments in order and keeps those with a value.
pub(crate) fn present_values(
    args: &[Expression],
    ctx: &dyn OperationContext,
) -> EvalResult<Vec<f64>> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        if let Some(v) = ctx.evaluate(arg)? {
            values.push(v);
        }
    }
    Ok(values)
}

/// The path of a plain value reference. Attribute references and other
/// expressions do not name an entity.
pub(crate) fn referenced_path(expr: &Expression) -> Option<&Path> {
    match expr.as_characteristic() {
        Some((path, None)) => Some(path),
        _ => None,
    }
}
