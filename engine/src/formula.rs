//! FILENAME: engine/src/formula.rs
//! PURPOSE: A parsed formula bound to the characteristic that owns it.

use crate::dependency_extractor::{extract_dependencies, DependencyMap, PlanDependencyContext};
use crate::lookup::PlanLookup;
use charformula_parser::{Expression, Path};

/// The result of one successful parse. Immutable; callers may cache it
/// keyed by (anchor, text).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    root: Expression,
    text: String,
    anchor: Path,
}

impl CompiledFormula {
    pub fn new(root: Expression, text: impl Into<String>, anchor: Path) -> Self {
        CompiledFormula {
            root,
            text: text.into(),
            anchor,
        }
    }

    pub fn root(&self) -> &Expression {
        &self.root
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Path of the characteristic that owns this formula.
    pub fn anchor(&self) -> &Path {
        &self.anchor
    }

    /// Paths referenced directly by this formula, with every occurrence.
    pub fn dependencies(&self, plan: &dyn PlanLookup) -> DependencyMap {
        let ctx = PlanDependencyContext::new(plan, &self.text);
        extract_dependencies(&self.root, &ctx)
    }
}

impl std::fmt::Display for CompiledFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
