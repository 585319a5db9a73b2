//! FILENAME: engine/src/dependency_graph.rs
//! PURPOSE: Transitive dependency discovery and circular reference detection.
//! CONTEXT: A calculated characteristic may reference other calculated
//! characteristics, whose formulas are fetched from the host plan and parsed
//! on demand. This module follows those references depth-first and detects
//! cycles before the evaluator recurses into a nested formula.
//!
//! TERMINOLOGY:
//! - Anchor: the characteristic whose dependencies are being computed.
//! - Value reference: `{Char}`, pulls the value and therefore its formula.
//! - Attribute-only reference: every occurrence reads an attribute, `{Char(17)}`.
//!   It is reported as a dependency but never followed.
//!
//! USAGE:
//! 1. `dependent_characteristics()` for an informational, best-effort closure.
//! 2. `validate_dependencies()` / `validate_compiled()` before evaluating a
//!    nested characteristic, to surface any cycle as CircularReferenceError.
//! 3. `validate_formula()` before evaluating a top-level formula; only a cycle
//!    back to its own anchor fails.

use crate::dependency_extractor::DependencyMap;
use crate::formula::CompiledFormula;
use crate::interpreter::FormulaInterpreter;
use crate::lookup::PlanLookup;
use charformula_parser::{CircularReferenceError, EvalResult, ParseResult, Path};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Follows formula references through the host plan.
pub struct DependencyResolver<'a> {
    interpreter: &'a FormulaInterpreter,
    plan: &'a dyn PlanLookup,
}

/// What a traversal treats as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Every fault fails, including nested formulas that do not parse.
    Discover,
    /// Any cycle fails. Unparsable nested formulas are leaves.
    Validate,
    /// Only a cycle back to the anchor fails. Unparsable nested formulas are leaves.
    SelfReference,
}

/// State of one depth-first traversal.
struct Walk {
    anchor: Path,
    mode: Mode,
    /// In-flight chain, anchor first.
    stack: Vec<Path>,
    on_stack: FxHashSet<Path>,
    /// Fully expanded paths; their subgraphs are known to be acyclic.
    finished: FxHashSet<Path>,
    found: BTreeSet<Path>,
}

impl Walk {
    fn new(anchor: &Path, mode: Mode) -> Self {
        Walk {
            anchor: anchor.clone(),
            mode,
            stack: Vec::new(),
            on_stack: FxHashSet::default(),
            finished: FxHashSet::default(),
            found: BTreeSet::new(),
        }
    }
}

impl<'a> DependencyResolver<'a> {
    pub fn new(interpreter: &'a FormulaInterpreter, plan: &'a dyn PlanLookup) -> Self {
        DependencyResolver { interpreter, plan }
    }

    /// Direct dependencies of the characteristic at `path`.
    /// Returns `Ok(None)` if `path` carries no formula.
    pub fn dependencies_of(&self, path: &Path) -> ParseResult<Option<DependencyMap>> {
        match self.plan.formula(path) {
            Some(text) => {
                let compiled = self.interpreter.parse(&text, path)?;
                Ok(Some(compiled.dependencies(self.plan)))
            }
            None => Ok(None),
        }
    }

    /// All paths reachable from `anchor` through formula references.
    ///
    /// Best effort: any fault (a formula that does not parse, a cycle) is
    /// logged and yields an empty set.
    pub fn dependent_characteristics(&self, anchor: &Path) -> BTreeSet<Path> {
        self.try_dependent_characteristics(anchor)
            .unwrap_or_else(|e| {
                log::warn!(target: "DEPS", "dependency discovery for {} failed: {}", anchor, e);
                BTreeSet::new()
            })
    }

    /// Like `dependent_characteristics`, but surfaces the failure.
    pub fn try_dependent_characteristics(&self, anchor: &Path) -> EvalResult<BTreeSet<Path>> {
        let mut walk = Walk::new(anchor, Mode::Discover);
        self.expand_path(anchor, &mut walk)?;
        Ok(walk.found)
    }

    /// Checks that the formula of `path` does not reach itself through value
    /// references. Nested formulas that do not parse are treated as leaves;
    /// they degrade to null when evaluated.
    pub fn validate_dependencies(&self, path: &Path) -> EvalResult<()> {
        let mut walk = Walk::new(path, Mode::Validate);
        self.expand_path(path, &mut walk)
    }

    /// `validate_dependencies` for a formula of the plan that is already compiled.
    pub fn validate_compiled(&self, formula: &CompiledFormula) -> EvalResult<()> {
        let mut walk = Walk::new(formula.anchor(), Mode::Validate);
        let dependencies = formula.dependencies(self.plan);
        self.expand(formula.anchor(), &dependencies, &mut walk)
    }

    /// Checks that an already compiled formula, which need not be stored in
    /// the plan, cannot reach its own anchor. Cycles further down are left to
    /// the evaluation of the nested characteristics involved.
    pub fn validate_formula(&self, formula: &CompiledFormula) -> EvalResult<()> {
        let mut walk = Walk::new(formula.anchor(), Mode::SelfReference);
        let dependencies = formula.dependencies(self.plan);
        self.expand(formula.anchor(), &dependencies, &mut walk)
    }

    fn expand_path(&self, path: &Path, walk: &mut Walk) -> EvalResult<()> {
        let dependencies = match self.dependencies_of(path) {
            Ok(Some(dependencies)) => dependencies,
            Ok(None) => return Ok(()),
            Err(e) if walk.mode == Mode::Discover => return Err(e.into()),
            Err(e) => {
                log::debug!(target: "DEPS", "skipping unparsable formula of {}: {}", path, e);
                return Ok(());
            }
        };
        self.expand(path, &dependencies, walk)
    }

    fn expand(&self, path: &Path, dependencies: &DependencyMap, walk: &mut Walk) -> EvalResult<()> {
        walk.stack.push(path.clone());
        walk.on_stack.insert(path.clone());

        for dependency in dependencies.paths() {
            walk.found.insert(dependency.clone());

            if dependencies.is_attribute_only(dependency) {
                continue;
            }

            if walk.on_stack.contains(dependency) {
                if walk.mode == Mode::SelfReference && *dependency != walk.anchor {
                    continue;
                }
                let mut cycle = walk.stack.clone();
                cycle.push(dependency.clone());
                let error = CircularReferenceError::new(walk.anchor.clone(), cycle);
                log::debug!(target: "DEPS", "{}", error);
                return Err(error.into());
            }

            if walk.finished.contains(dependency) {
                continue;
            }

            self.expand_path(dependency, walk)?;
        }

        walk.stack.pop();
        walk.on_stack.remove(path);
        walk.finished.insert(path.clone());
        Ok(())
    }
}
