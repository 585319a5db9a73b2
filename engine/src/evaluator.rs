//! FILENAME: engine/src/evaluator.rs
//! PURPOSE: Evaluates AST expressions to compute characteristic values.
//! CONTEXT: After a formula is parsed into an AST, this module traverses
//! the tree and computes the final result. Values of referenced
//! characteristics come from the host: measured values directly, calculated
//! ones by recursively evaluating their own formulas.
//!
//! NULL HANDLING:
//! - `Ok(None)` means "no value" and flows through operations per their own policy.
//! - A nested calculated characteristic that cannot be evaluated (syntax
//!   error, cycle, literal node) degrades to `Ok(None)` for that reference only.
//! - Results that are not finite numbers become `Ok(None)`.

use crate::dependency_graph::DependencyResolver;
use crate::formula::CompiledFormula;
use crate::interpreter::FormulaInterpreter;
use crate::lookup::{PlanLookup, ValueLookup};
use charformula_parser::{
    EvalResult, EvaluationError, Expression, ExpressionKind, OperationContext, Path,
};
use chrono::{DateTime, Utc};

/// Evaluates compiled formulas against one host plan.
/// Cheap to construct; holds only borrowed capabilities.
pub struct Evaluator<'a> {
    interpreter: &'a FormulaInterpreter,
    plan: &'a dyn PlanLookup,
    values: &'a dyn ValueLookup,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        interpreter: &'a FormulaInterpreter,
        plan: &'a dyn PlanLookup,
        values: &'a dyn ValueLookup,
    ) -> Self {
        Evaluator {
            interpreter,
            plan,
            values,
            timestamp: None,
        }
    }

    /// Reads attributes as of `timestamp`.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn resolver(&self) -> DependencyResolver<'a> {
        DependencyResolver::new(self.interpreter, self.plan)
    }

    /// Validates the formula's dependencies, then evaluates it.
    /// A cycle through the formula's own anchor is an error here, not a null.
    pub fn evaluate(&self, formula: &CompiledFormula) -> EvalResult<Option<f64>> {
        self.resolver().validate_formula(formula)?;
        self.evaluate_expression(formula.root())
    }

    /// Boundary form of `evaluate`: any failure becomes "no value".
    pub fn get_result(&self, formula: &CompiledFormula) -> Option<f64> {
        self.evaluate(formula).unwrap_or_else(|e| {
            log::debug!(target: "EVAL", "formula of {} failed: {}", formula.anchor(), e);
            None
        })
    }

    /// The value of the entity at `path`: its formula result if it is
    /// calculated, its measured value otherwise.
    pub fn evaluate_characteristic(&self, path: &Path) -> EvalResult<Option<f64>> {
        match self.plan.formula(path) {
            Some(text) => {
                let compiled = self.interpreter.parse(&text, path)?;
                self.evaluate(&compiled)
            }
            None => Ok(self.values.measurement_value(path)),
        }
    }

    /// Evaluates a single expression node.
    pub fn evaluate_expression(&self, expr: &Expression) -> EvalResult<Option<f64>> {
        match &expr.kind {
            ExpressionKind::Number(n) => Ok(Some(*n)),

            ExpressionKind::Constant { value, .. } => Ok(Some(*value)),

            ExpressionKind::Literal(text) => Err(EvaluationError::UnresolvedLiteral(text.clone())),

            ExpressionKind::Characteristic { path, attribute } => {
                Ok(self.characteristic_value(path, *attribute))
            }

            ExpressionKind::Negate(operand) => Ok(self.evaluate_expression(operand)?.map(|v| -v)),

            ExpressionKind::Function { operation, args, .. } => {
                let result = operation.evaluate(args, self)?;
                Ok(result.filter(|v| v.is_finite()))
            }
        }
    }

    /// Structured outcome of a reference: the value, "no value", or why it
    /// could not be computed.
    pub fn resolve_characteristic(
        &self,
        path: &Path,
        attribute: Option<u16>,
    ) -> EvalResult<Option<f64>> {
        if let Some(key) = attribute {
            let value = self.values.attribute_value(path, key, self.timestamp);
            return Ok(value.and_then(|v| v.as_f64()));
        }

        match self.plan.formula(path) {
            Some(text) => {
                let nested = self.interpreter.parse(&text, path)?;
                self.resolver().validate_compiled(&nested)?;
                self.evaluate_expression(nested.root())
            }
            None => Ok(self.values.measurement_value(path)),
        }
    }

    /// Value of a reference; failures of nested formulas degrade to null.
    fn characteristic_value(&self, path: &Path, attribute: Option<u16>) -> Option<f64> {
        self.resolve_characteristic(path, attribute)
            .unwrap_or_else(|e| {
                log::debug!(target: "EVAL", "value of {} unavailable: {}", path, e);
                None
            })
    }
}

impl OperationContext for Evaluator<'_> {
    fn evaluate(&self, expr: &Expression) -> EvalResult<Option<f64>> {
        self.evaluate_expression(expr)
    }

    fn value_of(&self, path: &Path) -> EvalResult<Option<f64>> {
        Ok(self.characteristic_value(path, None))
    }

    fn child_paths(&self, path: &Path) -> Vec<Path> {
        self.plan.child_paths(path)
    }
}
