//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for engine integration tests.

#![allow(dead_code)]

use charformula_engine::{
    AttributeValue, CompiledFormula, DependencyResolver, EvalResult, Evaluator, FormulaInterpreter,
    Path, PathSegment, PlanLookup, ValueLookup,
};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// In-memory inspection plan. Entities are registered with their parent
/// so child lookups work for points and grade groups.
#[derive(Debug, Default)]
pub struct TestPlan {
    formulas: FxHashMap<Path, String>,
    values: FxHashMap<Path, f64>,
    attributes: FxHashMap<(Path, u16), AttributeValue>,
    children: FxHashMap<Path, Vec<Path>>,
}

/// Characteristic `name` directly below the part `Part`.
pub fn ch(name: &str) -> Path {
    Path::characteristic(&["Part"], name)
}

impl TestPlan {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_child(&mut self, path: &Path) {
        let siblings = self.children.entry(path.parent()).or_default();
        if !siblings.contains(path) {
            siblings.push(path.clone());
        }
    }

    pub fn with_formula(mut self, path: Path, formula: &str) -> Self {
        self.add_child(&path);
        self.formulas.insert(path, formula.to_string());
        self
    }

    pub fn with_value(mut self, path: Path, value: f64) -> Self {
        self.add_child(&path);
        self.values.insert(path, value);
        self
    }

    /// Registers an entity without a value, such as a point or grade group.
    pub fn with_entity(mut self, path: Path) -> Self {
        self.add_child(&path);
        self
    }

    pub fn with_attribute(mut self, path: Path, key: u16, value: AttributeValue) -> Self {
        self.add_child(&path);
        self.attributes.insert((path, key), value);
        self
    }

    /// A point entity with measured X, Y and Z children.
    pub fn with_point(self, point: Path, x: f64, y: f64, z: f64) -> Self {
        let plan = self.with_entity(point.clone());
        plan.with_value(point.child(PathSegment::characteristic("X")), x)
            .with_value(point.child(PathSegment::characteristic("Y")), y)
            .with_value(point.child(PathSegment::characteristic("Z")), z)
    }

    /// Compiles `formula` as if owned by `owner`.
    pub fn compile(&self, formula: &str, owner: &Path) -> CompiledFormula {
        FormulaInterpreter::new()
            .parse(formula, owner)
            .unwrap_or_else(|e| panic!("'{}' should parse: {}", formula, e))
    }

    /// Evaluates the characteristic at `path` with the default interpreter.
    pub fn evaluate(&self, path: &Path) -> EvalResult<Option<f64>> {
        let interpreter = FormulaInterpreter::new();
        Evaluator::new(&interpreter, self, self).evaluate_characteristic(path)
    }

    /// Evaluates a free-standing formula owned by `/Part/Owner`.
    pub fn evaluate_formula(&self, formula: &str) -> EvalResult<Option<f64>> {
        let interpreter = FormulaInterpreter::new();
        let compiled = interpreter.parse(formula, &ch("Owner"))?;
        Evaluator::new(&interpreter, self, self).evaluate(&compiled)
    }

    pub fn dependents(&self, path: &Path) -> BTreeSet<Path> {
        let interpreter = FormulaInterpreter::new();
        DependencyResolver::new(&interpreter, self).dependent_characteristics(path)
    }
}

impl PlanLookup for TestPlan {
    fn child_paths(&self, path: &Path) -> Vec<Path> {
        self.children.get(path).cloned().unwrap_or_default()
    }

    fn formula(&self, path: &Path) -> Option<String> {
        self.formulas.get(path).cloned()
    }
}

impl ValueLookup for TestPlan {
    fn measurement_value(&self, path: &Path) -> Option<f64> {
        self.values.get(path).copied()
    }

    fn attribute_value(
        &self,
        path: &Path,
        key: u16,
        _timestamp: Option<DateTime<Utc>>,
    ) -> Option<AttributeValue> {
        self.attributes.get(&(path.clone(), key)).cloned()
    }
}

/// Asserts `actual` is a value within 1e-9 of `expected`.
pub fn assert_close(actual: EvalResult<Option<f64>>, expected: f64) {
    match actual {
        Ok(Some(v)) => assert!(
            (v - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            v
        ),
        other => panic!("expected {}, got {:?}", expected, other),
    }
}
