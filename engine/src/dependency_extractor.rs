//! FILENAME: engine/src/dependency_extractor.rs
//! PURPOSE: Extracts characteristic references from parsed AST expressions.
//! CONTEXT: After a formula is parsed into an AST, this module walks the tree
//! to find all referenced paths. These references feed the transitive
//! dependency resolver and its cycle detection. Operations whose arguments
//! stand for a group of entities (points, grades) supply their own occurrences
//! instead of the default one-per-reference rule.

use crate::lookup::PlanLookup;
use charformula_parser::{DependencyContext, DependencyOccurrence, Expression, ExpressionKind, Path};
use std::collections::BTreeMap;

/// Referenced paths of one formula, each with all of its occurrences.
/// Iteration is ordered by path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyMap {
    entries: BTreeMap<Path, Vec<DependencyOccurrence>>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, occurrence: DependencyOccurrence) {
        self.entries
            .entry(occurrence.path.clone())
            .or_default()
            .push(occurrence);
    }

    /// Distinct referenced paths.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys()
    }

    /// All occurrences of `path`, in source order. Empty if not referenced.
    pub fn occurrences(&self, path: &Path) -> &[DependencyOccurrence] {
        self.entries.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// True if every occurrence of `path` reads an attribute.
    /// Such a reference never pulls a value, so it cannot close a cycle.
    /// A path that is not referenced at all is not attribute-only.
    pub fn is_attribute_only(&self, path: &Path) -> bool {
        match self.entries.get(path) {
            Some(occurrences) => occurrences.iter().all(|o| o.attribute.is_some()),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[DependencyOccurrence])> {
        self.entries.iter().map(|(path, occ)| (path, occ.as_slice()))
    }
}

impl Extend<DependencyOccurrence> for DependencyMap {
    fn extend<T: IntoIterator<Item = DependencyOccurrence>>(&mut self, iter: T) {
        for occurrence in iter {
            self.insert(occurrence);
        }
    }
}

/// DependencyContext backed by the host's plan lookup.
pub(crate) struct PlanDependencyContext<'a> {
    plan: &'a dyn PlanLookup,
    source: &'a str,
}

impl<'a> PlanDependencyContext<'a> {
    pub(crate) fn new(plan: &'a dyn PlanLookup, source: &'a str) -> Self {
        PlanDependencyContext { plan, source }
    }
}

impl DependencyContext for PlanDependencyContext<'_> {
    fn child_paths(&self, path: &Path) -> Vec<Path> {
        self.plan.child_paths(path)
    }

    fn source(&self) -> &str {
        self.source
    }
}

/// Extracts all referenced paths from an expression.
pub fn extract_dependencies(expr: &Expression, ctx: &dyn DependencyContext) -> DependencyMap {
    let mut map = DependencyMap::new();
    extract_recursive(expr, ctx, &mut map);
    map
}

fn extract_recursive(expr: &Expression, ctx: &dyn DependencyContext, map: &mut DependencyMap) {
    match &expr.kind {
        ExpressionKind::Number(_) | ExpressionKind::Constant { .. } | ExpressionKind::Literal(_) => {}

        ExpressionKind::Characteristic { path, attribute } => {
            map.insert(DependencyOccurrence::new(
                path.clone(),
                expr.span,
                expr.span.slice(ctx.source()),
                *attribute,
            ));
        }

        ExpressionKind::Negate(operand) => extract_recursive(operand, ctx, map),

        ExpressionKind::Function { operation, args, .. } => {
            match operation.extract_dependencies(args, ctx) {
                Some(occurrences) => map.extend(occurrences),
                None => {
                    for arg in args {
                        extract_recursive(arg, ctx, map);
                    }
                }
            }
        }
    }
}
