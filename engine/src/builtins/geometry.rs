//! FILENAME: engine/src/builtins/geometry.rs
//! PURPOSE: Point distance and true position functions.
//! CONTEXT: A point argument is a `{path}` reference to an entity whose
//! children named X, Y and Z (case-insensitive) hold the coordinates.
//! The formula depends on those coordinate children, not on the point itself,
//! so these operations report their own dependency occurrences.

use super::referenced_path;
use charformula_parser::{
    Arity, DependencyContext, DependencyOccurrence, EvalResult, Expression, Operation,
    OperationCatalog, OperationContext, Path,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

const XYZ: &[Axis] = &[Axis::X, Axis::Y, Axis::Z];
const XY: &[Axis] = &[Axis::X, Axis::Y];
const XZ: &[Axis] = &[Axis::X, Axis::Z];
const YZ: &[Axis] = &[Axis::Y, Axis::Z];

/// Child path holding the `axis` coordinate of `point`.
fn coordinate_path(point: &Path, axis: Axis, children: &[Path]) -> Option<Path> {
    children
        .iter()
        .find(|child| {
            child.len() == point.len() + 1
                && child.starts_with(point)
                && child.name().eq_ignore_ascii_case(axis.name())
        })
        .cloned()
}

/// Coordinates of the point referenced by `arg` along `axes`.
/// `None` if the argument is not a reference or any coordinate has no value.
fn coordinates(
    arg: &Expression,
    axes: &[Axis],
    ctx: &dyn OperationContext,
) -> EvalResult<Option<Vec<f64>>> {
    let Some(point) = referenced_path(arg) else {
        return Ok(None);
    };
    let children = ctx.child_paths(point);

    let mut values = Vec::with_capacity(axes.len());
    for &axis in axes {
        let Some(path) = coordinate_path(point, axis, &children) else {
            return Ok(None);
        };
        match ctx.value_of(&path)? {
            Some(v) => values.push(v),
            None => return Ok(None),
        }
    }
    Ok(Some(values))
}

/// One occurrence per coordinate child of every point argument.
fn coordinate_occurrences(
    args: &[Expression],
    axes: &[Axis],
    ctx: &dyn DependencyContext,
) -> Vec<DependencyOccurrence> {
    let mut occurrences = Vec::new();
    for arg in args {
        let Some(point) = referenced_path(arg) else {
            continue;
        };
        let children = ctx.child_paths(point);
        for &axis in axes {
            if let Some(path) = coordinate_path(point, axis, &children) {
                occurrences.push(DependencyOccurrence::new(
                    path,
                    arg.span,
                    arg.span.slice(ctx.source()),
                    None,
                ));
            }
        }
    }
    occurrences
}

/// Euclidean distance between two points over the given axes.
pub struct PointDistance {
    name: &'static str,
    axes: &'static [Axis],
}

impl PointDistance {
    pub const fn new(name: &'static str, axes: &'static [Axis]) -> Self {
        PointDistance { name, axes }
    }
}

impl Operation for PointDistance {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::Exact(2)
    }

    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>> {
        let (Some(a), Some(b)) = (args.first(), args.get(1)) else {
            return Ok(None);
        };
        let (Some(a), Some(b)) = (coordinates(a, self.axes, ctx)?, coordinates(b, self.axes, ctx)?) else {
            return Ok(None);
        };
        let squares: f64 = a.iter().zip(&b).map(|(p, q)| (p - q).powi(2)).sum();
        Ok(Some(squares.sqrt()))
    }

    fn extract_dependencies(
        &self,
        args: &[Expression],
        ctx: &dyn DependencyContext,
    ) -> Option<Vec<DependencyOccurrence>> {
        Some(coordinate_occurrences(args, self.axes, ctx))
    }
}

/// Diameter of the tolerance zone around the nominal origin: 2·√(Σ coordinate²).
pub struct TruePosition {
    name: &'static str,
    axes: &'static [Axis],
}

impl TruePosition {
    pub const fn new(name: &'static str, axes: &'static [Axis]) -> Self {
        TruePosition { name, axes }
    }
}

impl Operation for TruePosition {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn evaluate(&self, args: &[Expression], ctx: &dyn OperationContext) -> EvalResult<Option<f64>> {
        let Some(point) = args.first() else {
            return Ok(None);
        };
        let Some(deviation) = coordinates(point, self.axes, ctx)? else {
            return Ok(None);
        };
        let squares: f64 = deviation.iter().map(|d| d * d).sum();
        Ok(Some(2.0 * squares.sqrt()))
    }

    fn extract_dependencies(
        &self,
        args: &[Expression],
        ctx: &dyn DependencyContext,
    ) -> Option<Vec<DependencyOccurrence>> {
        Some(coordinate_occurrences(args, self.axes, ctx))
    }
}

pub(super) fn register(catalog: &mut OperationCatalog) {
    let distances = [
        PointDistance::new("pt_dist", XYZ),
        PointDistance::new("pt_dist_xy", XY),
        PointDistance::new("pt_dist_xz", XZ),
        PointDistance::new("pt_dist_yz", YZ),
    ];
    for distance in distances {
        catalog.register(Arc::new(distance));
    }
    catalog.register(Arc::new(TruePosition::new("position", XY)));
    catalog.register(Arc::new(TruePosition::new("position3d", XYZ)));
}
